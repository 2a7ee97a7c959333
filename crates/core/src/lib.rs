//! Core traits and types for the intake agent
//!
//! This crate provides foundational types used across all other crates:
//! - Transcript message types
//! - Session status and mode enums
//! - The internal channel event type (boundary adaptation target)
//! - Collaborator traits (agent channel, text generation, storage, permission)
//! - Error taxonomy

pub mod error;
pub mod event;
pub mod message;
pub mod session;
pub mod traits;

pub use error::{Error, Result};
pub use event::ChannelEvent;
pub use message::{Message, Role};
pub use session::{AgentMode, ConnectionStatus, SessionMode};

pub use traits::{
    AgentChannel, AudioCapturePermission, ChannelConfig, ChannelHandle, DeniedPermission,
    DescriptionStore, GrantedPermission, TextGenerator,
};
