//! Buffer snapshots

use std::path::PathBuf;
use std::sync::Arc;

use crate::{BufferId, Point};

/// An immutable snapshot of a buffer
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Buffer ID
    pub id: BufferId,
    /// Version at snapshot time
    pub version: u64,
    /// File path (if any)
    pub path: Option<PathBuf>,
    /// Language ID
    pub language_id: Option<String>,
    /// Text at snapshot time
    text: Arc<str>,
}

impl Snapshot {
    pub(crate) fn new(
        id: BufferId,
        version: u64,
        path: Option<PathBuf>,
        language_id: Option<String>,
        text: &str,
    ) -> Self {
        Self {
            id,
            version,
            path,
            language_id,
            text: Arc::from(text),
        }
    }

    /// Get text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get slice, `None` if out of bounds or not on char boundaries
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }

    /// Get line (without its terminator)
    pub fn line(&self, line_idx: usize) -> Option<&str> {
        self.text.split('\n').nth(line_idx)
    }

    /// Get line count
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Is empty?
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get char at offset
    pub fn char(&self, offset: usize) -> Option<char> {
        self.text.get(offset..)?.chars().next()
    }

    /// Convert offset to line/column (byte column)
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let point = crate::offset_to_point(&self.text, offset);
        (point.row, point.column)
    }

    /// Convert line/column (byte column) to offset
    pub fn line_col_to_offset(&self, line: usize, col: usize) -> Option<usize> {
        crate::point_to_offset(&self.text, Point::new(line, col))
    }

    /// Convert line/column, counting the column in characters, to offset
    pub fn line_char_to_offset(&self, line: usize, char_col: usize) -> Option<usize> {
        let line_start = crate::point_to_offset(&self.text, Point::new(line, 0))?;
        let line_text = self.line(line)?;
        if char_col == line_text.chars().count() {
            return Some(line_start + line_text.len());
        }
        line_text
            .char_indices()
            .nth(char_col)
            .map(|(byte, _)| line_start + byte)
    }

    /// Iterate over lines
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.text.split('\n')
    }
}

#[cfg(test)]
mod tests {
    use crate::Buffer;

    #[test]
    fn test_snapshot_line_col() {
        let buffer = Buffer::from_text("const a = 1;\n<div>é</div>\n");
        let snapshot = buffer.snapshot();

        assert_eq!(snapshot.line_count(), 3);
        assert_eq!(snapshot.line(1), Some("<div>é</div>"));
        assert_eq!(snapshot.offset_to_line_col(14), (1, 1));
        assert_eq!(snapshot.line_col_to_offset(1, 1), Some(14));
        assert_eq!(snapshot.line_col_to_offset(7, 0), None);
    }

    #[test]
    fn test_line_char_to_offset_counts_chars() {
        let buffer = Buffer::from_text("é<div/>");
        let snapshot = buffer.snapshot();

        // 'é' is two bytes wide
        assert_eq!(snapshot.line_char_to_offset(0, 1), Some(2));
        assert_eq!(snapshot.char(2), Some('<'));
        assert_eq!(snapshot.line_char_to_offset(0, 7), Some(8));
        assert_eq!(snapshot.line_char_to_offset(0, 8), None);
    }

    #[test]
    fn test_snapshot_is_detached_from_buffer() {
        let mut buffer = Buffer::from_text("abc");
        let snapshot = buffer.snapshot();
        buffer.insert(0, "x").unwrap();

        assert_eq!(snapshot.text(), "abc");
        assert_eq!(snapshot.version + 1, buffer.version());
    }
}
