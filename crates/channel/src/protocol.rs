//! Wire protocol types
//!
//! The hosted agent speaks JSON frames tagged by `type`. Only the frames
//! the interception layer cares about are modeled; everything else lands
//! in `Unknown` and is ignored.

use serde::{Deserialize, Serialize};

use lexai_core::{AgentMode, ChannelEvent, Role};

/// Inbound frame from the agent service
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Session accepted; the conversation is live
    ConversationInitiationMetadata {
        #[serde(default)]
        conversation_initiation_metadata_event: Option<serde_json::Value>,
    },
    /// Finalized user speech transcript
    UserTranscript {
        user_transcription_event: UserTranscriptionEvent,
    },
    /// Agent reply text
    AgentResponse {
        agent_response_event: AgentResponseEvent,
    },
    /// Agent audio chunk (payload discarded; playback happens client-side)
    Audio {
        #[serde(default)]
        audio_event: Option<serde_json::Value>,
    },
    /// The agent was interrupted by user speech
    Interruption {
        #[serde(default)]
        interruption_event: Option<serde_json::Value>,
    },
    /// Keepalive; must be answered with a pong carrying the same id
    Ping { ping_event: PingEvent },
    /// Anything this layer does not understand
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct UserTranscriptionEvent {
    pub user_transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct AgentResponseEvent {
    pub agent_response: String,
}

#[derive(Debug, Deserialize)]
pub struct PingEvent {
    pub event_id: u64,
}

/// Outbound frame to the agent service
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Session configuration sent immediately after connecting
    ConversationInitiationClientData {
        conversation_config_override: ConversationConfigOverride,
    },
    /// User-typed message
    UserMessage { text: String },
    /// Keepalive reply
    Pong { event_id: u64 },
}

#[derive(Debug, Serialize)]
pub struct ConversationConfigOverride {
    pub conversation: ConversationOverride,
}

#[derive(Debug, Serialize)]
pub struct ConversationOverride {
    pub text_only: bool,
}

impl ClientFrame {
    pub fn initiation(text_only: bool) -> Self {
        ClientFrame::ConversationInitiationClientData {
            conversation_config_override: ConversationConfigOverride {
                conversation: ConversationOverride { text_only },
            },
        }
    }
}

/// Adapt an inbound frame into internal channel events
///
/// Speaking/listening changes are inferred from the audio stream: agent
/// audio means speaking, a finalized user transcript or an interruption
/// means the agent yielded the floor. Unknown frames produce nothing.
pub fn adapt_frame(frame: ServerFrame) -> Vec<ChannelEvent> {
    match frame {
        ServerFrame::ConversationInitiationMetadata { .. } => vec![ChannelEvent::Connected],
        ServerFrame::UserTranscript {
            user_transcription_event,
        } => vec![
            ChannelEvent::ModeChanged {
                mode: AgentMode::Listening,
            },
            ChannelEvent::Message {
                text: user_transcription_event.user_transcript,
                source: Role::User,
            },
        ],
        ServerFrame::AgentResponse {
            agent_response_event,
        } => vec![ChannelEvent::Message {
            text: agent_response_event.agent_response,
            source: Role::Agent,
        }],
        ServerFrame::Audio { .. } => vec![ChannelEvent::ModeChanged {
            mode: AgentMode::Speaking,
        }],
        ServerFrame::Interruption { .. } => vec![ChannelEvent::ModeChanged {
            mode: AgentMode::Listening,
        }],
        // Pings are answered in the transport loop, not surfaced
        ServerFrame::Ping { .. } => vec![],
        ServerFrame::Unknown => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_agent_response() {
        let frame: ServerFrame = serde_json::from_str(
            r#"{"type":"agent_response","agent_response_event":{"agent_response":"Olá!"}}"#,
        )
        .unwrap();

        let events = adapt_frame(frame);
        assert_eq!(
            events,
            vec![ChannelEvent::Message {
                text: "Olá!".to_string(),
                source: Role::Agent
            }]
        );
    }

    #[test]
    fn test_parses_user_transcript() {
        let frame: ServerFrame = serde_json::from_str(
            r#"{"type":"user_transcript","user_transcription_event":{"user_transcript":"sim"}}"#,
        )
        .unwrap();

        let events = adapt_frame(frame);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            ChannelEvent::Message { text, source: Role::User } if text == "sim"
        ));
    }

    #[test]
    fn test_unknown_frames_are_dropped() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"type":"internal_tentative_agent_response"}"#).unwrap();
        assert!(adapt_frame(frame).is_empty());
    }

    #[test]
    fn test_initiation_frame_shape() {
        let json = serde_json::to_value(ClientFrame::initiation(true)).unwrap();
        assert_eq!(json["type"], "conversation_initiation_client_data");
        assert_eq!(
            json["conversation_config_override"]["conversation"]["text_only"],
            true
        );
    }
}
