//! Events emitted toward the presentation layer

use serde::Serialize;

use lexai_core::{ConnectionStatus, Role};

/// One presentation-facing event
///
/// Serialized as-is onto the presentation WebSocket, so the wire shape is
/// part of the protocol: `{"type": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// Connection status change
    Status { status: ConnectionStatus },
    /// Voice-mode speaking indicator (debounced)
    Speaking { speaking: bool },
    /// Transcript message to display
    Message { role: Role, text: String },
    /// Open the booking link in a new browsing context
    OpenLink { url: String },
    /// Non-fatal error to surface to the user
    Error { message: String },
}
