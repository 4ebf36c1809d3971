//! Text edits

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use buffer::{Buffer, BufferError, Edit};
use serde::{Deserialize, Serialize};

/// A text edit against the original text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Byte range to replace
    pub range: Range<usize>,
    /// New text
    pub new_text: String,
}

impl TextEdit {
    /// Create an insertion
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            range: offset..offset,
            new_text: text.into(),
        }
    }

    /// Create a replacement
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: text.into(),
        }
    }

    fn to_edit(&self) -> Edit {
        Edit::replace(self.range.clone(), self.new_text.as_str())
    }
}

impl From<&Edit> for TextEdit {
    fn from(edit: &Edit) -> Self {
        Self::replace(edit.old_range(), edit.new_text())
    }
}

/// Edits for a single file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdit {
    /// File path
    pub path: PathBuf,
    /// Non-overlapping edits, all against the same text
    pub edits: Vec<TextEdit>,
}

impl FileEdit {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            edits: Vec::new(),
        }
    }

    pub fn add(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Apply to `source`, all or nothing
    pub fn apply(&self, source: &str) -> Result<String, BufferError> {
        let mut buffer = Buffer::from_text(source);
        buffer.apply_batch(self.edits.iter().map(TextEdit::to_edit).collect())?;
        Ok(buffer.text().to_string())
    }
}

/// Workspace-wide edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEdit {
    /// File edits
    pub changes: HashMap<PathBuf, Vec<TextEdit>>,
}

impl WorkspaceEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add edit for file
    pub fn add_edit(&mut self, file: PathBuf, edit: TextEdit) {
        self.changes.entry(file).or_default().push(edit);
    }

    /// Add every edit of a file edit
    pub fn add_file_edit(&mut self, edit: FileEdit) {
        self.changes.entry(edit.path).or_default().extend(edit.edits);
    }

    /// Edits for one file
    pub fn file_edit(&self, file: &Path) -> Option<FileEdit> {
        self.changes.get(file).map(|edits| FileEdit {
            path: file.to_path_buf(),
            edits: edits.clone(),
        })
    }

    /// Count of affected files
    pub fn file_count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_out_of_order_edits() {
        let mut edit = FileEdit::new(PathBuf::from("a.jsx"));
        edit.add(TextEdit::replace(6..9, "baz"));
        edit.add(TextEdit::insert(0, "// "));
        assert_eq!(edit.apply("const foo = 1;").unwrap(), "// const baz = 1;");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let mut edit = FileEdit::new(PathBuf::from("a.jsx"));
        edit.add(TextEdit::replace(0..5, "let"));
        edit.add(TextEdit::replace(3..8, "x"));
        assert!(matches!(edit.apply("const foo = 1;"), Err(BufferError::OverlappingEdits(_))));
    }

    #[test]
    fn test_workspace_edit_groups_by_file() {
        let mut workspace = WorkspaceEdit::new();
        let path = PathBuf::from("a.jsx");
        workspace.add_edit(path.clone(), TextEdit::insert(0, "a"));
        workspace.add_edit(path.clone(), TextEdit::insert(1, "b"));
        assert_eq!(workspace.file_count(), 1);
        assert_eq!(workspace.file_edit(&path).unwrap().edits.len(), 2);
    }
}
