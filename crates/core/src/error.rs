//! Error taxonomy
//!
//! These are the user-facing failure classes. Each crate carries its own
//! error enum; anything that must be surfaced to the presentation layer is
//! converted into one of these variants first.

use thiserror::Error;

/// Intake agent errors
#[derive(Error, Debug)]
pub enum Error {
    /// Audio capture refused. Non-retryable; the message explains remediation.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// External agent transport failure. Session is forced back to idle.
    #[error("agent channel error: {0}")]
    Channel(String),

    /// Text-generation call failed or returned empty. Recovered locally,
    /// never surfaced to the user.
    #[error("description generation error: {0}")]
    Generation(String),

    /// Booking URL construction failed.
    #[error("booking link error: {0}")]
    LinkBuild(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, Error>;
