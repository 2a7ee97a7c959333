//! Collaborator traits
//!
//! The session controller treats everything outside its own state machine
//! as a pluggable collaborator behind one of these traits:
//!
//! ```text
//! External agent:
//!   - AgentChannel: opens a live session with the hosted agent
//!   - ChannelHandle: one open session (send text, tear down, event stream)
//!
//! Support services:
//!   - TextGenerator: credentialed text generation for case summaries
//!   - DescriptionStore: write-only key/value store for full descriptions
//!   - AudioCapturePermission: platform microphone permission prompt
//! ```

mod channel;
mod generation;
mod permission;
mod storage;

pub use channel::{AgentChannel, ChannelConfig, ChannelHandle};
pub use generation::TextGenerator;
pub use permission::{AudioCapturePermission, DeniedPermission, GrantedPermission};
pub use storage::DescriptionStore;
