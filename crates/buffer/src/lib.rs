//! # Foxkit Buffer
//!
//! Text buffer with atomic transactions, grouped undo/redo and multi-cursor
//! selections.
//!
//! Edits are validated before they touch the text: an out-of-bounds range, a
//! range that splits a UTF-8 character or a batch with overlapping edits is
//! rejected with a [`BufferError`] and leaves the buffer unchanged.

pub mod edit;
pub mod history;
pub mod selection;
pub mod snapshot;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub use edit::{Edit, EditKind};
pub use history::{History, TransactionId};
pub use selection::{Selection, SelectionSet};
pub use snapshot::Snapshot;

/// Buffer ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

impl BufferId {
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-based row and byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Buffer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Range {start}..{end} is out of bounds (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
    #[error("Edits overlap at offset {0}")]
    OverlappingEdits(usize),
    #[error("No transaction is open")]
    NoTransaction,
    #[error("Transaction already open: {0}")]
    TransactionOpen(String),
    #[error("Buffer changed: expected version {expected}, found {actual}")]
    StaleVersion { expected: u64, actual: u64 },
}

/// An open transaction
#[derive(Debug)]
struct OpenTransaction {
    id: TransactionId,
    description: String,
    selections_before: SelectionSet,
}

/// Text buffer
pub struct Buffer {
    /// Unique ID
    pub id: BufferId,
    /// File path (if any)
    pub path: Option<PathBuf>,
    /// Text content
    text: String,
    /// Edit history
    history: History,
    /// Selections
    selections: SelectionSet,
    /// Language ID
    pub language_id: Option<String>,
    /// Version (increments on each edit)
    version: u64,
    /// Saved version
    saved_version: u64,
    /// Open transaction
    transaction: Option<OpenTransaction>,
}

impl Buffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            id: BufferId::new(),
            path: None,
            text: String::new(),
            history: History::new(),
            selections: SelectionSet::new(),
            language_id: None,
            version: 0,
            saved_version: 0,
            transaction: None,
        }
    }

    /// Create a buffer from text
    pub fn from_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.text = text.to_string();
        buffer
    }

    /// Create a buffer from file path
    pub fn from_file(path: impl Into<PathBuf>, content: &str) -> Self {
        let path = path.into();
        let mut buffer = Self::from_text(content);
        buffer.language_id = detect_language(&path);
        buffer.path = Some(path);
        buffer
    }

    /// Get full text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get text length
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get line count
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Get a line by index
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.text.split('\n').nth(idx)
    }

    /// Get text slice
    pub fn slice(&self, range: Range<usize>) -> Result<&str, BufferError> {
        self.check_range(&range)?;
        Ok(&self.text[range])
    }

    /// Get current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Fail if the buffer moved past `expected`
    pub fn ensure_version(&self, expected: u64) -> Result<(), BufferError> {
        if self.version == expected {
            Ok(())
        } else {
            Err(BufferError::StaleVersion {
                expected,
                actual: self.version,
            })
        }
    }

    /// Check if modified
    pub fn is_modified(&self) -> bool {
        self.version != self.saved_version
    }

    /// Take an immutable snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.id,
            self.version,
            self.path.clone(),
            self.language_id.clone(),
            &self.text,
        )
    }

    /// Apply an edit
    pub fn apply_edit(&mut self, edit: Edit) -> Result<Range<usize>, BufferError> {
        self.check_range(&edit.old_range())?;
        let range = edit.range();
        self.record_and_apply(edit);
        self.version += 1;
        Ok(range)
    }

    /// Apply a batch of edits expressed against the current text.
    ///
    /// The batch is applied as a whole or not at all. Returns the range each
    /// edit's new text occupies afterwards, in input order.
    pub fn apply_batch(&mut self, edits: Vec<Edit>) -> Result<Vec<Range<usize>>, BufferError> {
        for edit in &edits {
            self.check_range(&edit.old_range())?;
        }

        let mut order: Vec<usize> = (0..edits.len()).collect();
        order.sort_by_key(|&i| {
            let range = edits[i].old_range();
            (range.start, range.end)
        });

        for pair in order.windows(2) {
            let a = edits[pair[0]].old_range();
            let b = edits[pair[1]].old_range();
            let both_inserts = a.is_empty() && b.is_empty() && a.start == b.start;
            if a.end > b.start || both_inserts {
                return Err(BufferError::OverlappingEdits(b.start));
            }
        }

        let mut ranges = vec![0..0; edits.len()];
        let mut shift: isize = 0;
        for &i in &order {
            let start = (edits[i].old_range().start as isize + shift) as usize;
            ranges[i] = start..start + edits[i].new_text().len();
            shift += edits[i].delta();
        }

        let own_group = self.transaction.is_none();
        if own_group {
            self.history.begin_group();
        }
        let mut edits: Vec<Option<Edit>> = edits.into_iter().map(Some).collect();
        for &i in order.iter().rev() {
            if let Some(edit) = edits[i].take() {
                self.record_and_apply(edit);
            }
        }
        if own_group {
            self.history.end_group();
        }

        self.version += 1;
        tracing::trace!("Applied batch of {} edits to buffer {:?}", ranges.len(), self.id);
        Ok(ranges)
    }

    /// Insert text at offset
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<Range<usize>, BufferError> {
        self.apply_edit(Edit::insert(offset, text))
    }

    /// Delete a range
    pub fn delete(&mut self, range: Range<usize>) -> Result<Range<usize>, BufferError> {
        self.apply_edit(Edit::delete(range))
    }

    /// Replace a range with text
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<Range<usize>, BufferError> {
        self.apply_edit(Edit::replace(range, text))
    }

    /// Open a transaction; every edit until commit or rollback is one undo unit
    pub fn begin_transaction(&mut self, description: impl Into<String>) -> Result<TransactionId, BufferError> {
        if let Some(open) = &self.transaction {
            return Err(BufferError::TransactionOpen(open.description.clone()));
        }

        let description = description.into();
        let id = self.history.begin_group();
        tracing::debug!("Begin transaction {:?}: {}", id, description);
        self.transaction = Some(OpenTransaction {
            id,
            description,
            selections_before: self.selections.clone(),
        });
        Ok(id)
    }

    /// Commit the open transaction
    pub fn commit_transaction(&mut self) -> Result<TransactionId, BufferError> {
        let open = self.transaction.take().ok_or(BufferError::NoTransaction)?;
        self.history.end_group();
        tracing::debug!("Commit transaction {:?}: {}", open.id, open.description);
        Ok(open.id)
    }

    /// Revert every edit of the open transaction and restore the selections
    /// it started with
    pub fn rollback_transaction(&mut self) -> Result<TransactionId, BufferError> {
        let open = self.transaction.take().ok_or(BufferError::NoTransaction)?;
        let inverses = self.history.discard_group();
        let reverted = !inverses.is_empty();
        for inverse in &inverses {
            self.apply_edit_raw(inverse);
        }
        self.selections = open.selections_before;
        if reverted {
            self.version += 1;
        }
        tracing::debug!("Rolled back transaction {:?}: {}", open.id, open.description);
        Ok(open.id)
    }

    /// Is a transaction open?
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Description of the open transaction
    pub fn open_transaction(&self) -> Option<&str> {
        self.transaction.as_ref().map(|open| open.description.as_str())
    }

    /// Undo last edit group (not available while a transaction is open)
    pub fn undo(&mut self) -> bool {
        if self.in_transaction() {
            return false;
        }
        let edits = self.history.undo();
        self.apply_history_edits(&edits)
    }

    /// Redo last undone edit group (not available while a transaction is open)
    pub fn redo(&mut self) -> bool {
        if self.in_transaction() {
            return false;
        }
        let edits = self.history.redo();
        self.apply_history_edits(&edits)
    }

    fn apply_history_edits(&mut self, edits: &[Edit]) -> bool {
        if edits.is_empty() {
            return false;
        }
        for edit in edits {
            self.apply_edit_raw(edit);
        }
        self.version += 1;
        true
    }

    fn record_and_apply(&mut self, edit: Edit) {
        let inverse = edit.inverse(&self.text);
        self.apply_edit_raw(&edit);
        self.history.push(edit, inverse);
    }

    /// Apply edit without recording to history
    fn apply_edit_raw(&mut self, edit: &Edit) {
        let old = edit.old_range();
        let new_len = edit.new_text().len();
        self.text.replace_range(old.clone(), edit.new_text());
        self.selections.transform(old.start, old.len(), new_len);
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), BufferError> {
        if range.start > range.end || range.end > self.text.len() {
            return Err(BufferError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.text.len(),
            });
        }
        for offset in [range.start, range.end] {
            if !self.text.is_char_boundary(offset) {
                return Err(BufferError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Mark as saved
    pub fn mark_saved(&mut self) {
        self.saved_version = self.version;
    }

    /// Get selections
    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    /// Set selections
    pub fn set_selections(&mut self, selections: SelectionSet) {
        self.selections = selections;
    }

    /// Get primary selection
    pub fn primary_selection(&self) -> Selection {
        self.selections.primary()
    }

    /// Put a single caret at offset
    pub fn set_cursor(&mut self, offset: usize) {
        self.selections = SelectionSet::single(Selection::cursor(offset));
    }

    /// Convert offset to point
    pub fn offset_to_point(&self, offset: usize) -> Point {
        offset_to_point(&self.text, offset)
    }

    /// Convert point to offset
    pub fn point_to_offset(&self, point: Point) -> Option<usize> {
        point_to_offset(&self.text, point)
    }

    /// Can undo?
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo?
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn offset_to_point(text: &str, offset: usize) -> Point {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let row = before.iter().filter(|b| **b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    Point::new(row, offset - line_start)
}

pub(crate) fn point_to_offset(text: &str, point: Point) -> Option<usize> {
    let mut line_start = 0;
    for (row, line) in text.split('\n').enumerate() {
        if row == point.row {
            if point.column > line.len() || !line.is_char_boundary(point.column) {
                return None;
            }
            return Some(line_start + point.column);
        }
        line_start += line.len() + 1;
    }
    None
}

/// Detect language from file path
fn detect_language(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    let lang = match ext {
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        _ => return None,
    };
    Some(lang.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        let buffer = Buffer::from_file("src/App.jsx", "");
        assert_eq!(buffer.language_id.as_deref(), Some("javascript"));

        let buffer = Buffer::from_file("src/App.tsx", "");
        assert_eq!(buffer.language_id.as_deref(), Some("typescriptreact"));

        let buffer = Buffer::from_file("README.md", "");
        assert_eq!(buffer.language_id, None);
    }

    #[test]
    fn test_apply_edit_rejects_bad_ranges() {
        let mut buffer = Buffer::from_text("é!");

        assert_eq!(
            buffer.delete(0..9),
            Err(BufferError::OutOfBounds { start: 0, end: 9, len: 3 })
        );
        assert_eq!(buffer.insert(1, "x"), Err(BufferError::NotCharBoundary(1)));
        assert_eq!(buffer.text(), "é!");
        assert_eq!(buffer.version(), 0);
    }

    #[test]
    fn test_apply_batch_reports_ranges_in_input_order() {
        let mut buffer = Buffer::from_text("<div></div>");
        let ranges = buffer
            .apply_batch(vec![
                Edit::replace(1..4, "Box"),
                Edit::insert(0, "import x;\n"),
                Edit::replace(7..10, "Box"),
            ])
            .unwrap();

        assert_eq!(buffer.text(), "import x;\n<Box></Box>");
        assert_eq!(ranges, vec![11..14, 0..10, 17..20]);
        assert_eq!(&buffer.text()[ranges[2].clone()], "Box");
        assert_eq!(buffer.version(), 1);
    }

    #[test]
    fn test_apply_batch_is_all_or_nothing() {
        let mut buffer = Buffer::from_text("abcdef");

        let err = buffer
            .apply_batch(vec![Edit::replace(0..3, "x"), Edit::replace(2..4, "y")])
            .unwrap_err();
        assert_eq!(err, BufferError::OverlappingEdits(2));

        let err = buffer
            .apply_batch(vec![Edit::insert(1, "x"), Edit::delete(4..99)])
            .unwrap_err();
        assert!(matches!(err, BufferError::OutOfBounds { .. }));

        assert_eq!(buffer.text(), "abcdef");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_batch_undoes_as_one_unit() {
        let mut buffer = Buffer::from_text("<a></a>");
        buffer
            .apply_batch(vec![Edit::replace(1..2, "Link"), Edit::replace(5..6, "Link")])
            .unwrap();
        assert_eq!(buffer.text(), "<Link></Link>");

        assert!(buffer.undo());
        assert_eq!(buffer.text(), "<a></a>");
        assert!(buffer.redo());
        assert_eq!(buffer.text(), "<Link></Link>");
    }

    #[test]
    fn test_transaction_commit_is_single_undo_unit() {
        let mut buffer = Buffer::from_text("div");
        buffer.begin_transaction("rename").unwrap();
        buffer.replace(0..3, "StyledDiv").unwrap();
        buffer.replace(0..9, "Title").unwrap();
        assert!(!buffer.undo());
        buffer.commit_transaction().unwrap();

        assert_eq!(buffer.text(), "Title");
        assert!(buffer.undo());
        assert_eq!(buffer.text(), "div");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_rollback_restores_text_and_selections() {
        let mut buffer = Buffer::from_text("const a = <div />;\n");
        buffer.set_selections(SelectionSet::single(Selection::new(11, 14)));
        let before = buffer.selections().clone();

        buffer.begin_transaction("extract").unwrap();
        buffer
            .apply_batch(vec![
                Edit::insert(0, "import styled from \"styled-components\";\n\n"),
                Edit::replace(11..14, "StyledDiv"),
            ])
            .unwrap();
        buffer.set_cursor(3);
        buffer.insert(buffer.len(), "\nconst StyledDiv = 1;\n").unwrap();
        buffer.rollback_transaction().unwrap();

        assert_eq!(buffer.text(), "const a = <div />;\n");
        assert_eq!(buffer.selections(), &before);
        assert!(!buffer.can_undo());
        assert!(!buffer.in_transaction());
    }

    #[test]
    fn test_transaction_misuse() {
        let mut buffer = Buffer::new();
        assert_eq!(buffer.commit_transaction(), Err(BufferError::NoTransaction));
        assert_eq!(buffer.rollback_transaction(), Err(BufferError::NoTransaction));

        assert_eq!(buffer.open_transaction(), None);
        buffer.begin_transaction("first").unwrap();
        assert_eq!(buffer.open_transaction(), Some("first"));
        assert_eq!(
            buffer.begin_transaction("second"),
            Err(BufferError::TransactionOpen("first".to_string()))
        );
    }

    #[test]
    fn test_selections_follow_edits() {
        let mut buffer = Buffer::from_text("<div></div>");
        buffer.set_cursor(7);
        buffer.insert(0, "xx").unwrap();
        assert_eq!(buffer.primary_selection(), Selection::cursor(9));
    }

    #[test]
    fn test_point_conversions() {
        let buffer = Buffer::from_text("ab\ncd\n");
        assert_eq!(buffer.offset_to_point(4), Point::new(1, 1));
        assert_eq!(buffer.point_to_offset(Point::new(1, 1)), Some(4));
        assert_eq!(buffer.point_to_offset(Point::new(2, 0)), Some(6));
        assert_eq!(buffer.point_to_offset(Point::new(1, 5)), None);
    }

    #[test]
    fn test_ensure_version() {
        let mut buffer = Buffer::from_text("x");
        let version = buffer.version();
        buffer.insert(1, "y").unwrap();
        assert_eq!(
            buffer.ensure_version(version),
            Err(BufferError::StaleVersion { expected: 0, actual: 1 })
        );
    }
}
