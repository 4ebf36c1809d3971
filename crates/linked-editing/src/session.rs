//! A live linked-editing session

use std::ops::Range;

use buffer::{Buffer, BufferId, Edit, Selection, SelectionSet};
use tokio::sync::broadcast;

use crate::{LinkedEditError, LinkedEditingEvent};

/// Session ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Tracked marker handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub usize);

/// Regions of one buffer that always hold the same text.
///
/// Every edit made through the session is applied to all regions in one
/// batch. Markers are ranges that move with those edits but are never
/// edited themselves.
#[derive(Debug)]
pub struct LinkedEditingSession {
    id: SessionId,
    buffer_id: BufferId,
    /// Region ranges, sorted by start
    regions: Vec<Range<usize>>,
    /// Index of the primary region
    primary: usize,
    markers: Vec<Range<usize>>,
    events: broadcast::Sender<LinkedEditingEvent>,
}

impl LinkedEditingSession {
    pub(crate) fn new(
        id: SessionId,
        buffer_id: BufferId,
        regions: Vec<Range<usize>>,
        primary: usize,
        events: broadcast::Sender<LinkedEditingEvent>,
    ) -> Self {
        Self {
            id,
            buffer_id,
            regions,
            primary,
            markers: Vec::new(),
            events,
        }
    }

    /// Session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Buffer this session edits
    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    /// All regions, sorted by start
    pub fn regions(&self) -> &[Range<usize>] {
        &self.regions
    }

    /// Index of the primary region in `regions()`
    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// The primary region
    pub fn primary_region(&self) -> Range<usize> {
        self.regions[self.primary].clone()
    }

    /// Current text of the regions
    pub fn value<'b>(&self, buffer: &'b Buffer) -> &'b str {
        buffer.text().get(self.primary_region()).unwrap_or_default()
    }

    /// Region containing `offset` (ends inclusive), preferring the primary
    pub fn region_at(&self, offset: usize) -> Option<usize> {
        let contains = |r: &Range<usize>| r.start <= offset && offset <= r.end;
        if contains(&self.regions[self.primary]) {
            return Some(self.primary);
        }
        self.regions.iter().position(contains)
    }

    /// Start tracking a range that follows the session's edits
    pub fn track_marker(&mut self, buffer: &Buffer, range: Range<usize>) -> Result<MarkerId, LinkedEditError> {
        self.check_buffer(buffer)?;
        buffer.slice(range.clone())?;
        self.markers.push(range);
        Ok(MarkerId(self.markers.len() - 1))
    }

    /// Current range of a tracked marker
    pub fn marker(&self, id: MarkerId) -> Option<Range<usize>> {
        self.markers.get(id.0).cloned()
    }

    /// Select every region, primary selection on the primary region
    pub fn select_regions(&self, buffer: &mut Buffer) {
        let selections = self.regions.iter().cloned().map(Selection::from_range);
        buffer.set_selections(SelectionSet::with_primary(selections, self.primary));
    }

    /// Replace the whole value of every region
    pub fn set_value(&mut self, buffer: &mut Buffer, text: &str) -> Result<(), LinkedEditError> {
        let len = self.primary_region().len();
        self.edit(buffer, 0..len, text)
    }

    /// Replace `relative` (an offset range inside a region) in every region
    pub fn edit(&mut self, buffer: &mut Buffer, relative: Range<usize>, text: &str) -> Result<(), LinkedEditError> {
        self.check_buffer(buffer)?;
        let len = self.primary_region().len();
        if relative.start > relative.end || relative.end > len {
            return Err(LinkedEditError::OutsideRegion(self.primary_region().start + relative.end));
        }

        let edits: Vec<Edit> = self
            .regions
            .iter()
            .map(|region| {
                Edit::replace(region.start + relative.start..region.start + relative.end, text)
            })
            .collect();
        let changes: Vec<(Range<usize>, usize)> = edits
            .iter()
            .map(|edit| (edit.old_range(), text.len()))
            .collect();

        let ranges = buffer.apply_batch(edits)?;

        for (region, new_range) in self.regions.iter_mut().zip(&ranges) {
            let tail = region.end - (region.start + relative.end);
            *region = new_range.start - relative.start..new_range.end + tail;
        }
        for marker in &mut self.markers {
            *marker = shift_offset(marker.start, &changes)..shift_offset(marker.end, &changes);
        }

        let caret = relative.start + text.len();
        let carets = self.regions.iter().map(|r| Selection::cursor(r.start + caret));
        buffer.set_selections(SelectionSet::with_primary(carets, self.primary));

        let value = self.value(buffer).to_string();
        tracing::trace!("Linked session {:?} value now {:?}", self.id, value);
        let _ = self.events.send(LinkedEditingEvent::Updated {
            session: self.id,
            value,
            regions: self.regions.clone(),
        });
        Ok(())
    }

    /// Type at the primary selection, replacing it
    pub fn type_text(&mut self, buffer: &mut Buffer, text: &str) -> Result<(), LinkedEditError> {
        let relative = self.selection_in_region(buffer)?;
        self.edit(buffer, relative, text)
    }

    /// Delete the primary selection, or the character before the caret
    pub fn backspace(&mut self, buffer: &mut Buffer) -> Result<(), LinkedEditError> {
        let relative = self.selection_in_region(buffer)?;
        if !relative.is_empty() {
            return self.edit(buffer, relative, "");
        }
        if relative.start == 0 {
            return Ok(());
        }

        let before = &self.value(buffer)[..relative.start];
        let width = before.chars().next_back().map_or(0, char::len_utf8);
        self.edit(buffer, relative.start - width..relative.start, "")
    }

    fn selection_in_region(&self, buffer: &Buffer) -> Result<Range<usize>, LinkedEditError> {
        self.check_buffer(buffer)?;
        let selection = buffer.primary_selection();
        let idx = self
            .region_at(selection.start())
            .filter(|&i| selection.end() <= self.regions[i].end)
            .ok_or(LinkedEditError::OutsideRegion(selection.head))?;
        let start = self.regions[idx].start;
        Ok(selection.start() - start..selection.end() - start)
    }

    fn check_buffer(&self, buffer: &Buffer) -> Result<(), LinkedEditError> {
        if buffer.id == self.buffer_id {
            Ok(())
        } else {
            Err(LinkedEditError::WrongBuffer(buffer.id))
        }
    }
}

/// Move an offset past the length changes of edits that end at or before it
fn shift_offset(offset: usize, changes: &[(Range<usize>, usize)]) -> usize {
    let mut shifted = offset as isize;
    for (old, new_len) in changes {
        if old.end <= offset {
            shifted += *new_len as isize - old.len() as isize;
        }
    }
    shifted.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_offset() {
        let changes = vec![(1..4, 9), (7..10, 9)];
        assert_eq!(shift_offset(0, &changes), 0);
        assert_eq!(shift_offset(5, &changes), 11);
        assert_eq!(shift_offset(20, &changes), 32);
    }
}
