//! # Foxkit Linked Editing
//!
//! Synchronized editing of related ranges (e.g., a tag name in the opening
//! and closing tag plus the declaration it refers to).

pub mod session;

use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use buffer::{Buffer, BufferError, BufferId};
pub use session::{LinkedEditingSession, MarkerId, SessionId};

/// Linked editing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkedEditError {
    #[error("Linked editing is disabled")]
    Disabled,
    #[error("A linked editing session is already active in buffer {0:?}")]
    AlreadyActive(BufferId),
    #[error("No regions to link")]
    NoRegions,
    #[error("Primary region {0} does not exist")]
    NoPrimary(usize),
    #[error("Linked regions overlap at offset {0}")]
    Overlapping(usize),
    #[error("Linked regions hold different text")]
    Mismatched,
    #[error("Offset {0} is outside every linked region")]
    OutsideRegion(usize),
    #[error("Session belongs to another buffer than {0:?}")]
    WrongBuffer(BufferId),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Linked editing service
pub struct LinkedEditingService {
    /// Active session by buffer
    active: RwLock<HashMap<BufferId, SessionId>>,
    /// Events
    events: broadcast::Sender<LinkedEditingEvent>,
    /// Configuration
    config: RwLock<LinkedEditingConfig>,
    next_session: AtomicU64,
}

impl LinkedEditingService {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);

        Self {
            active: RwLock::new(HashMap::new()),
            events,
            config: RwLock::new(LinkedEditingConfig::default()),
            next_session: AtomicU64::new(1),
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<LinkedEditingEvent> {
        self.events.subscribe()
    }

    /// Configure linked editing
    pub fn configure(&self, config: LinkedEditingConfig) {
        *self.config.write() = config;
    }

    /// Current configuration
    pub fn config(&self) -> LinkedEditingConfig {
        self.config.read().clone()
    }

    /// Is linked editing enabled?
    pub fn is_enabled(&self) -> bool {
        self.config.read().enabled
    }

    /// Decoration to draw on linked regions, if any
    pub fn decoration(&self) -> Option<LinkedDecorationStyle> {
        let config = self.config.read();
        match config.decoration_style {
            _ if !config.show_decorations => None,
            LinkedDecorationStyle::None => None,
            style => Some(style),
        }
    }

    /// Link `regions` of `buffer` and select them all.
    ///
    /// Regions must be in bounds, disjoint and hold identical text.
    /// `primary` indexes into `regions` as given.
    pub fn start_session(
        &self,
        buffer: &mut Buffer,
        regions: Vec<Range<usize>>,
        primary: usize,
    ) -> Result<LinkedEditingSession, LinkedEditError> {
        if !self.is_enabled() {
            return Err(LinkedEditError::Disabled);
        }
        if self.active.read().contains_key(&buffer.id) {
            return Err(LinkedEditError::AlreadyActive(buffer.id));
        }
        if regions.is_empty() {
            return Err(LinkedEditError::NoRegions);
        }
        let primary_range = regions
            .get(primary)
            .cloned()
            .ok_or(LinkedEditError::NoPrimary(primary))?;

        let value = buffer.slice(primary_range.clone())?;
        for region in &regions {
            if buffer.slice(region.clone())? != value {
                return Err(LinkedEditError::Mismatched);
            }
        }

        let mut sorted = regions;
        sorted.sort_by_key(|r| r.start);
        for pair in sorted.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(LinkedEditError::Overlapping(pair[1].start));
            }
        }
        let primary = sorted
            .iter()
            .position(|r| *r == primary_range)
            .ok_or(LinkedEditError::NoPrimary(primary))?;

        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst));
        self.active.write().insert(buffer.id, id);

        let session = LinkedEditingSession::new(id, buffer.id, sorted, primary, self.events.clone());
        session.select_regions(buffer);

        tracing::debug!("Started linked session {:?} with {} regions", id, session.regions().len());
        let _ = self.events.send(LinkedEditingEvent::Started {
            session: id,
            buffer: buffer.id,
            regions: session.regions().to_vec(),
            decoration: self.decoration(),
        });
        Ok(session)
    }

    /// End a session, returning its final value
    pub fn finish_session(&self, session: LinkedEditingSession, buffer: &Buffer) -> String {
        let value = session.value(buffer).to_string();
        self.active.write().remove(&session.buffer_id());
        tracing::debug!("Finished linked session {:?} with {:?}", session.id(), value);
        let _ = self.events.send(LinkedEditingEvent::Finished {
            session: session.id(),
            value: value.clone(),
        });
        value
    }

    /// Abandon a session; reverting its edits is up to the caller
    pub fn cancel_session(&self, session: LinkedEditingSession) {
        self.active.write().remove(&session.buffer_id());
        tracing::debug!("Cancelled linked session {:?}", session.id());
        let _ = self.events.send(LinkedEditingEvent::Cancelled { session: session.id() });
    }

    /// Active session of a buffer
    pub fn active_session(&self, buffer: BufferId) -> Option<SessionId> {
        self.active.read().get(&buffer).copied()
    }
}

impl Default for LinkedEditingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Linked editing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedEditingConfig {
    /// Enable linked editing
    pub enabled: bool,
    /// Show decorations for linked ranges
    pub show_decorations: bool,
    /// Decoration style
    pub decoration_style: LinkedDecorationStyle,
}

impl Default for LinkedEditingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_decorations: true,
            decoration_style: LinkedDecorationStyle::Underline,
        }
    }
}

/// Linked decoration style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkedDecorationStyle {
    /// Underline linked ranges
    Underline,
    /// Box around linked ranges
    Box,
    /// Background highlight
    Background,
    /// No decoration
    None,
}

/// Linked editing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedEditingEvent {
    Started {
        session: SessionId,
        buffer: BufferId,
        regions: Vec<Range<usize>>,
        /// How to decorate the regions, `None` when decorations are off
        decoration: Option<LinkedDecorationStyle>,
    },
    Updated { session: SessionId, value: String, regions: Vec<Range<usize>> },
    Finished { session: SessionId, value: String },
    Cancelled { session: SessionId },
}
