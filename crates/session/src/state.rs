//! Observable per-session state

use lexai_core::{ConnectionStatus, Message, SessionMode};

/// Snapshot of a conversation session
///
/// `offered_scheduling` goes true when an agent utterance classifies as a
/// scheduling offer and back to false only while an acceptance is being
/// processed. `last_extracted_issue` tracks the most recent substantive
/// user utterance so synthesis has material even when the transcript scan
/// comes up empty.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub connection_status: ConnectionStatus,
    pub mode: SessionMode,
    pub offered_scheduling: bool,
    pub last_extracted_issue: Option<String>,
    pub transcript: Vec<Message>,
    pub speaking: bool,
}
