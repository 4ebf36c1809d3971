//! Interactive naming session
//!
//! ```text
//! Idle -> GraftedWithPlaceholder -> EditingLinkedFields -> Finished(name)
//!                    \                     |
//!                     `-------------> Cancelled
//! ```
//!
//! The graft and every linked edit run in one buffer transaction. Finishing
//! commits it as a single undo unit; cancelling rolls it back.

use std::ops::Range;
use std::sync::Arc;

use buffer::{Buffer, Selection, SelectionSet, TransactionId};
use linked_editing::{LinkedEditingService, LinkedEditingSession, MarkerId};

use super::classify::JsxTag;
use super::naming;
use super::Extraction;
use crate::{ExtractError, SessionError};

/// Description of the buffer transaction an extraction runs in
pub(crate) const TRANSACTION: &str = "Extract to styled component";

/// Session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    GraftedWithPlaceholder,
    EditingLinkedFields,
    Finished(String),
    Cancelled,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::GraftedWithPlaceholder => "grafted",
            SessionState::EditingLinkedFields => "editing",
            SessionState::Finished(_) => "finished",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Result of a completed extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// Final component name
    pub name: String,
    /// The extracted tag, as found before the edit
    pub tag: JsxTag,
    /// Whether an import line was added
    pub import_inserted: bool,
    /// Declaration identifier range
    pub declaration_name: Range<usize>,
    /// Placeholder range, now selected
    pub placeholder: Range<usize>,
    /// Undo unit holding the whole extraction
    pub transaction: TransactionId,
}

/// Inline naming of an extracted component.
///
/// Dropping a session without finishing or cancelling it releases its linked
/// regions; the buffer transaction stays open until the next extraction on
/// that buffer rolls it back.
#[must_use = "finish or cancel the session to close its buffer transaction"]
pub struct NamingSession {
    state: SessionState,
    extraction: Extraction,
    service: Arc<LinkedEditingService>,
    linked: Option<LinkedEditingSession>,
    placeholder: Option<MarkerId>,
    transaction: Option<TransactionId>,
    import_inserted: bool,
}

impl NamingSession {
    pub(crate) fn new(extraction: Extraction, service: Arc<LinkedEditingService>) -> Self {
        Self {
            state: SessionState::Idle,
            extraction,
            service,
            linked: None,
            placeholder: None,
            transaction: None,
            import_inserted: false,
        }
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name used when the user leaves the field blank
    pub fn default_name(&self) -> &str {
        &self.extraction.default_name
    }

    /// The tag being extracted
    pub fn tag(&self) -> &JsxTag {
        &self.extraction.tag
    }

    /// Current name in the linked fields
    pub fn value<'b>(&self, buffer: &'b Buffer) -> &'b str {
        self.linked.as_ref().map_or("", |linked| linked.value(buffer))
    }

    /// Linked regions: tag-name occurrences and the declaration identifier
    pub fn regions(&self) -> &[Range<usize>] {
        match &self.linked {
            Some(linked) => linked.regions(),
            None => &[],
        }
    }

    /// Current placeholder range
    pub fn placeholder(&self) -> Option<Range<usize>> {
        let linked = self.linked.as_ref()?;
        linked.marker(self.placeholder?)
    }

    /// Graft the declaration under the default name and link its occurrences
    pub fn graft(&mut self, buffer: &mut Buffer) -> Result<(), ExtractError> {
        self.expect_state("graft", |s| matches!(s, SessionState::Idle))?;
        buffer.ensure_version(self.extraction.version)?;

        let transaction = buffer.begin_transaction(TRANSACTION)?;
        match self.link(buffer) {
            Ok(()) => {
                self.transaction = Some(transaction);
                self.state = SessionState::GraftedWithPlaceholder;
                Ok(())
            }
            Err(err) => {
                buffer.rollback_transaction()?;
                self.state = SessionState::Cancelled;
                Err(err)
            }
        }
    }

    fn link(&mut self, buffer: &mut Buffer) -> Result<(), ExtractError> {
        let grafted = self.extraction.splice.apply(buffer)?;
        self.import_inserted = grafted.import.is_some();

        // Opening tag name first, it is the primary region
        let mut regions = grafted.tag_names.clone();
        regions.push(grafted.declaration_name.clone());

        let mut linked = self.service.start_session(buffer, regions, 0)?;
        self.placeholder = Some(linked.track_marker(buffer, grafted.placeholder)?);
        self.linked = Some(linked);
        Ok(())
    }

    /// Type at the primary caret
    pub fn type_text(&mut self, buffer: &mut Buffer, text: &str) -> Result<(), SessionError> {
        self.linked_edit("type", |linked| linked.type_text(buffer, text))
    }

    /// Delete before the primary caret
    pub fn backspace(&mut self, buffer: &mut Buffer) -> Result<(), SessionError> {
        self.linked_edit("delete", |linked| linked.backspace(buffer))
    }

    /// Replace the whole name
    pub fn set_value(&mut self, buffer: &mut Buffer, name: &str) -> Result<(), SessionError> {
        self.linked_edit("rename", |linked| linked.set_value(buffer, name))
    }

    fn linked_edit(
        &mut self,
        action: &'static str,
        edit: impl FnOnce(&mut LinkedEditingSession) -> Result<(), linked_editing::LinkedEditError>,
    ) -> Result<(), SessionError> {
        self.expect_state(action, |s| {
            matches!(s, SessionState::GraftedWithPlaceholder | SessionState::EditingLinkedFields)
        })?;
        let linked = self.linked.as_mut().ok_or(SessionError::InvalidState {
            action,
            state: self.state.name(),
        })?;
        edit(linked)?;
        self.state = SessionState::EditingLinkedFields;
        Ok(())
    }

    /// Normalize the name, commit the transaction and select the placeholder
    pub fn finish(&mut self, buffer: &mut Buffer) -> Result<ExtractOutcome, ExtractError> {
        self.expect_state("finish", |s| {
            matches!(s, SessionState::GraftedWithPlaceholder | SessionState::EditingLinkedFields)
        })?;
        let linked = self.linked.as_mut().ok_or(SessionError::InvalidState {
            action: "finish",
            state: self.state.name(),
        })?;

        let typed = linked.value(buffer).to_string();
        let name = naming::normalize_name(Some(&typed), &self.extraction.default_name);
        if name != typed {
            tracing::debug!("Normalizing component name {:?} to {:?}", typed, name);
            linked.set_value(buffer, &name)?;
        }

        let placeholder = self
            .placeholder
            .and_then(|marker| linked.marker(marker))
            .ok_or(ExtractError::MissingAnchor("placeholder"))?;
        let declaration_name = linked.regions().last().cloned().unwrap_or_default();
        if let Some(linked) = self.linked.take() {
            self.service.finish_session(linked, buffer);
        }

        buffer.set_selections(SelectionSet::single(Selection::from_range(placeholder.clone())));
        let transaction = buffer.commit_transaction()?;

        tracing::info!("Extracted <{}> to styled component {}", self.extraction.tag.name, name);
        self.state = SessionState::Finished(name.clone());
        Ok(ExtractOutcome {
            name,
            tag: self.extraction.tag.clone(),
            import_inserted: self.import_inserted,
            declaration_name,
            placeholder,
            transaction,
        })
    }

    /// Revert the buffer to how it was before the session
    pub fn cancel(&mut self, buffer: &mut Buffer) -> Result<(), ExtractError> {
        self.expect_state("cancel", |s| {
            !matches!(s, SessionState::Finished(_) | SessionState::Cancelled)
        })?;

        if let Some(linked) = self.linked.take() {
            self.service.cancel_session(linked);
        }
        if self.transaction.take().is_some() {
            buffer.rollback_transaction()?;
        }

        tracing::debug!("Cancelled extraction of <{}>", self.extraction.tag.name);
        self.state = SessionState::Cancelled;
        Ok(())
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl Fn(&SessionState) -> bool,
    ) -> Result<(), SessionError> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                action,
                state: self.state.name(),
            })
        }
    }
}

impl Drop for NamingSession {
    fn drop(&mut self) {
        if let Some(linked) = self.linked.take() {
            tracing::warn!(
                "Naming session for <{}> dropped without finishing",
                self.extraction.tag.name
            );
            self.service.cancel_session(linked);
        }
    }
}

impl std::fmt::Debug for NamingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamingSession")
            .field("state", &self.state)
            .field("tag", &self.extraction.tag.name)
            .field("default_name", &self.extraction.default_name)
            .finish()
    }
}
