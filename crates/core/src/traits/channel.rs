//! External agent channel traits

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::event::ChannelEvent;

/// Configuration for opening an agent session
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Hosted agent identifier
    pub agent_id: String,
    /// API key for private agents
    pub api_key: Option<String>,
    /// Open the session without audio
    pub text_only: bool,
}

impl ChannelConfig {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            api_key: None,
            text_only: false,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn text_only(mut self, text_only: bool) -> Self {
        self.text_only = text_only;
        self
    }
}

/// Factory for live agent sessions
#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// Open a session with the external agent
    async fn connect(&self, config: ChannelConfig) -> Result<Box<dyn ChannelHandle>>;
}

/// One open session with the external agent
///
/// Dropping the handle must close the underlying transport; `end_session`
/// does the same explicitly and is safe to call more than once.
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Forward a user-typed message to the agent
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Tear the session down immediately
    ///
    /// Must not yield to any handler that would still forward user input to
    /// the agent; callers rely on this to suppress the agent's in-flight
    /// reply during acceptance interception.
    async fn end_session(&mut self) -> Result<()>;

    /// Take the inbound event stream
    ///
    /// Returns `Some` exactly once; the stream ends when the session closes.
    fn take_events(&mut self) -> Option<mpsc::Receiver<ChannelEvent>>;
}
