//! Selection and cursor

use smallvec::SmallVec;

/// A selection (anchor to head)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Anchor point (where selection started)
    pub anchor: usize,
    /// Head point (where cursor is)
    pub head: usize,
}

impl Selection {
    /// Create a cursor (zero-width selection)
    pub fn cursor(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Create a selection from anchor to head
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Select a range, caret at its end
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Get the start offset
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end offset
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if this is a cursor (zero width)
    pub fn is_cursor(&self) -> bool {
        self.anchor == self.head
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get range
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start()..self.end()
    }

    /// Collapse to cursor at head
    pub fn collapse(&self) -> Self {
        Self::cursor(self.head)
    }
}

/// Set of selections (multi-cursor support)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    /// All selections, sorted by start
    selections: SmallVec<[Selection; 4]>,
    /// Index of primary selection
    primary_idx: usize,
}

impl SelectionSet {
    /// Create with single cursor at start
    pub fn new() -> Self {
        Self::single(Selection::cursor(0))
    }

    /// Create with single selection
    pub fn single(selection: Selection) -> Self {
        Self {
            selections: smallvec::smallvec![selection],
            primary_idx: 0,
        }
    }

    /// Create with several selections; `primary` indexes into `selections`
    pub fn with_primary(selections: impl IntoIterator<Item = Selection>, primary: usize) -> Self {
        let mut indexed: SmallVec<[(usize, Selection); 4]> =
            selections.into_iter().enumerate().collect();
        if indexed.is_empty() {
            return Self::new();
        }

        indexed.sort_by_key(|(_, s)| s.start());
        let primary_idx = indexed
            .iter()
            .position(|(i, _)| *i == primary)
            .unwrap_or(0);

        Self {
            selections: indexed.into_iter().map(|(_, s)| s).collect(),
            primary_idx,
        }
    }

    /// Get primary selection
    pub fn primary(&self) -> Selection {
        self.selections.get(self.primary_idx).copied().unwrap_or_default()
    }

    /// Get all selections
    pub fn all(&self) -> &[Selection] {
        &self.selections
    }

    /// Get number of selections
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Check if empty (shouldn't happen normally)
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Clear to single cursor
    pub fn clear(&mut self) {
        let primary = self.primary();
        self.selections.clear();
        self.selections.push(primary.collapse());
        self.primary_idx = 0;
    }

    /// Transform selections after edit
    pub fn transform(&mut self, edit_start: usize, old_len: usize, new_len: usize) {
        let delta = new_len as isize - old_len as isize;
        let shift = |offset: usize| -> usize {
            if offset >= edit_start + old_len {
                (offset as isize + delta) as usize
            } else if offset > edit_start {
                edit_start + new_len
            } else {
                offset
            }
        };

        for selection in &mut self.selections {
            selection.anchor = shift(selection.anchor);
            selection.head = shift(selection.head);
        }
    }
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Selection;
    type IntoIter = std::slice::Iter<'a, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.selections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_primary_sorts_and_tracks_primary() {
        let set = SelectionSet::with_primary(
            [Selection::new(40, 49), Selection::new(1, 10), Selection::new(20, 29)],
            1,
        );

        assert_eq!(set.len(), 3);
        assert_eq!(set.all()[0], Selection::new(1, 10));
        assert_eq!(set.primary(), Selection::new(1, 10));
    }

    #[test]
    fn test_transform_after_insert_before() {
        let mut set = SelectionSet::single(Selection::new(10, 15));
        set.transform(0, 0, 4);
        assert_eq!(set.primary(), Selection::new(14, 19));
    }

    #[test]
    fn test_transform_inside_replaced_range_snaps_to_end() {
        let mut set = SelectionSet::single(Selection::cursor(3));
        set.transform(1, 3, 9);
        assert_eq!(set.primary(), Selection::cursor(10));
    }

    #[test]
    fn test_clear_keeps_primary_head() {
        let mut set = SelectionSet::with_primary(
            [Selection::new(1, 4), Selection::new(8, 12)],
            1,
        );
        set.clear();
        assert_eq!(set.all(), &[Selection::cursor(12)]);
    }
}
