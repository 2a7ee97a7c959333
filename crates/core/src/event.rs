//! Internal channel event type
//!
//! External agent SDK payloads are untyped and vary by transport. All of
//! them are adapted into this narrow variant type at the channel boundary;
//! anything that does not fit is dropped there.

use crate::message::Role;
use crate::session::AgentMode;

/// Event delivered by the external agent channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel reports the session is live
    Connected,
    /// The channel closed (remote or local teardown)
    Disconnected,
    /// An utterance, either the user transcript or the agent reply
    Message { text: String, source: Role },
    /// Voice-mode speaking/listening change
    ModeChanged { mode: AgentMode },
    /// Transport failure
    Error { detail: String },
}
