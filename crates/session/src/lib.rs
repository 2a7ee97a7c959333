//! Conversation session management
//!
//! The session controller state machine (offer tracking, acceptance
//! interception, speaking debounce, the voice farewell window), the
//! cancel-on-drop timer it relies on, and the presentation-facing event
//! type emitted toward the server layer.

pub mod controller;
pub mod state;
pub mod timer;
pub mod ui;

pub use controller::{ControllerConfig, ConversationController, Timings};
pub use state::SessionState;
pub use timer::ScopedTimer;
pub use ui::UiEvent;

use thiserror::Error;

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no active session")]
    NotConnected,

    #[error("channel error: {0}")]
    Channel(String),
}

impl From<SessionError> for lexai_core::Error {
    fn from(err: SessionError) -> Self {
        lexai_core::Error::Session(err.to_string())
    }
}
