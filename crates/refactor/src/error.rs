//! Refactoring errors

use buffer::BufferError;
use linked_editing::LinkedEditError;
use treesitter::TreeError;

/// Why an extraction did not happen
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The caret is not on an extractable tag, or the file cannot hold JSX
    #[error("Extraction is not applicable here")]
    NotApplicable,
    /// A node the extraction relies on could not be found
    #[error("Missing {0}")]
    MissingAnchor(&'static str),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Parse(#[from] TreeError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Naming session misuse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {action} while the session is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Linked(#[from] LinkedEditError),
}

impl From<LinkedEditError> for ExtractError {
    fn from(err: LinkedEditError) -> Self {
        ExtractError::Session(SessionError::Linked(err))
    }
}
