//! Session status and mode enums

use serde::{Deserialize, Serialize};

/// Connection status of the external agent session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No session open
    #[default]
    Disconnected,
    /// Permission granted, waiting for the channel to report connected
    Connecting,
    /// Live session
    Connected,
    /// Teardown in flight
    Ending,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Ending => "ending",
        };
        write!(f, "{s}")
    }
}

/// Channel mode selected when opening a session
///
/// Switching mode while connected forces a disconnect and transcript clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Bidirectional audio with live transcription
    #[default]
    Voice,
    /// Text-only chat
    Text,
}

impl SessionMode {
    /// Whether the external channel should be opened text-only
    pub fn text_only(&self) -> bool {
        matches!(self, SessionMode::Text)
    }
}

/// Voice-mode sub-state of a connected session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// The agent is producing audio
    Speaking,
    /// The agent is waiting for user speech
    Listening,
}
