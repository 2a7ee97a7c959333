//! External conversational agent channel
//!
//! Adapter between the hosted agent's WebSocket protocol and the narrow
//! internal [`ChannelEvent`] type. All payload shapes are parsed at this
//! boundary; frames that do not match a known shape are dropped here and
//! never reach the session controller.

pub mod elevenlabs;
pub mod protocol;

pub use elevenlabs::{ElevenLabsChannel, DEFAULT_ENDPOINT};

use thiserror::Error;

/// Channel errors
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session already closed")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for ChannelError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        ChannelError::Transport(err.to_string())
    }
}

impl From<ChannelError> for lexai_core::Error {
    fn from(err: ChannelError) -> Self {
        lexai_core::Error::Channel(err.to_string())
    }
}
