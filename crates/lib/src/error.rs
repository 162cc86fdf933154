//! Failure kinds surfaced while handling one inbound event.

use crate::analytics::AnalyticsError;
use crate::channels::MessagingError;
use crate::llm::LlmError;

/// One of the external services failed or answered with a payload we could not use.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Messaging(#[from] MessagingError),
    #[error(transparent)]
    Generative(#[from] LlmError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Digit-only input that is not on the menu.
    #[error("unrecognized selection: {0}")]
    UnrecognizedSelection(String),
    /// Link-based action selected before any link was submitted.
    #[error("no link on file")]
    NoLinkOnFile,
    #[error("backend unavailable: {0}")]
    Backend(#[from] BackendError),
}

impl RelayError {
    /// Text to send back to the user for errors they can act on. Backend failures have none.
    pub fn user_reply(&self) -> Option<String> {
        match self {
            RelayError::UnrecognizedSelection(_) => Some(format!(
                "I don't recognize that option. Please reply with one of:\n\n{}",
                crate::action::Action::menu_text()
            )),
            RelayError::NoLinkOnFile => {
                Some("Please send a link first, then choose an option.".to_string())
            }
            RelayError::Backend(_) => None,
        }
    }
}

impl From<MessagingError> for RelayError {
    fn from(e: MessagingError) -> Self {
        RelayError::Backend(e.into())
    }
}

impl From<LlmError> for RelayError {
    fn from(e: LlmError) -> Self {
        RelayError::Backend(e.into())
    }
}

impl From<AnalyticsError> for RelayError {
    fn from(e: AnalyticsError) -> Self {
        RelayError::Backend(e.into())
    }
}
