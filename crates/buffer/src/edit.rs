//! Edit operations

use std::ops::Range;

/// An edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub kind: EditKind,
}

impl Edit {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert {
                offset,
                text: text.into(),
            },
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            kind: EditKind::Delete { range },
        }
    }

    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace {
                range,
                text: text.into(),
            },
        }
    }

    /// Get the inverse of this edit against the text it is about to modify
    pub fn inverse(&self, text: &str) -> Edit {
        match &self.kind {
            EditKind::Insert { offset, text: inserted } => {
                Edit::delete(*offset..*offset + inserted.len())
            }
            EditKind::Delete { range } => Edit::insert(range.start, &text[range.clone()]),
            EditKind::Replace { range, text: replacement } => Edit::replace(
                range.start..range.start + replacement.len(),
                &text[range.clone()],
            ),
        }
    }

    /// Range of the original text this edit removes
    pub fn old_range(&self) -> Range<usize> {
        match &self.kind {
            EditKind::Insert { offset, .. } => *offset..*offset,
            EditKind::Delete { range } | EditKind::Replace { range, .. } => range.clone(),
        }
    }

    /// Text this edit puts in place of `old_range`
    pub fn new_text(&self) -> &str {
        match &self.kind {
            EditKind::Insert { text, .. } | EditKind::Replace { text, .. } => text,
            EditKind::Delete { .. } => "",
        }
    }

    /// Get the range affected by this edit, in post-edit coordinates
    pub fn range(&self) -> Range<usize> {
        let start = self.old_range().start;
        start..start + self.new_text().len()
    }

    /// Length change caused by this edit
    pub fn delta(&self) -> isize {
        self.new_text().len() as isize - self.old_range().len() as isize
    }
}

/// Edit kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    Insert { offset: usize, text: String },
    Delete { range: Range<usize> },
    Replace { range: Range<usize>, text: String },
}
