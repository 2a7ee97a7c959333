//! ElevenLabs conversational agent transport
//!
//! Opens the agent WebSocket, sends the initiation frame and pumps inbound
//! frames through [`crate::protocol::adapt_frame`] into the session
//! controller's event stream. Keepalive pings are answered here.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use lexai_core::{AgentChannel, ChannelConfig, ChannelEvent, ChannelHandle};

use crate::protocol::{adapt_frame, ClientFrame, ServerFrame};
use crate::ChannelError;

/// Production agent endpoint
pub const DEFAULT_ENDPOINT: &str = "wss://api.elevenlabs.io";

const EVENT_BUFFER: usize = 64;
const OUTBOUND_BUFFER: usize = 16;

/// ElevenLabs conversational agent channel
#[derive(Debug, Clone)]
pub struct ElevenLabsChannel {
    endpoint: String,
}

impl ElevenLabsChannel {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Point the channel at a different endpoint (tests, proxies)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    fn session_url(&self, agent_id: &str) -> String {
        format!(
            "{}/v1/convai/conversation?agent_id={}",
            self.endpoint, agent_id
        )
    }
}

impl Default for ElevenLabsChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentChannel for ElevenLabsChannel {
    async fn connect(&self, config: ChannelConfig) -> lexai_core::Result<Box<dyn ChannelHandle>> {
        let mut request = self
            .session_url(&config.agent_id)
            .into_client_request()
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        if let Some(ref api_key) = config.api_key {
            let value = api_key
                .parse()
                .map_err(|_| ChannelError::Connect("invalid API key header".to_string()))?;
            request.headers_mut().insert("xi-api-key", value);
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let initiation = serde_json::to_string(&ClientFrame::initiation(config.text_only))
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        sink.send(WsMessage::Text(initiation))
            .await
            .map_err(ChannelError::from)?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);
        let pong_tx = outbound_tx.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = outbound_rx.recv() => match outbound {
                        Some(Outbound::Frame(text)) => {
                            if let Err(e) = sink.send(WsMessage::Text(text)).await {
                                tracing::warn!(error = %e, "outbound send failed");
                                let _ = event_tx.send(ChannelEvent::Error { detail: e.to_string() }).await;
                                break;
                            }
                        }
                        Some(Outbound::Close) | None => {
                            let _ = sink.send(WsMessage::Close(None)).await;
                            break;
                        }
                    },
                    inbound = source.next() => match inbound {
                        Some(Ok(WsMessage::Text(text))) => {
                            match serde_json::from_str::<ServerFrame>(&text) {
                                Ok(ServerFrame::Ping { ping_event }) => {
                                    let pong = serde_json::to_string(&ClientFrame::Pong {
                                        event_id: ping_event.event_id,
                                    })
                                    .unwrap_or_default();
                                    let _ = pong_tx.send(Outbound::Frame(pong)).await;
                                }
                                Ok(frame) => {
                                    for event in adapt_frame(frame) {
                                        if event_tx.send(event).await.is_err() {
                                            return;
                                        }
                                    }
                                }
                                Err(e) => {
                                    // Unknown payload shape: drop at the boundary
                                    tracing::trace!(error = %e, "unparseable frame ignored");
                                }
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            let _ = event_tx.send(ChannelEvent::Disconnected).await;
                            break;
                        }
                        Some(Ok(_)) => {
                            // Binary/ping/pong frames carry no conversation data
                        }
                        Some(Err(e)) => {
                            let _ = event_tx.send(ChannelEvent::Error { detail: e.to_string() }).await;
                            break;
                        }
                    },
                }
            }
        });

        Ok(Box::new(ElevenLabsHandle {
            outbound_tx,
            events: Some(event_rx),
            task,
        }))
    }
}

enum Outbound {
    Frame(String),
    Close,
}

struct ElevenLabsHandle {
    outbound_tx: mpsc::Sender<Outbound>,
    events: Option<mpsc::Receiver<ChannelEvent>>,
    task: JoinHandle<()>,
}

#[async_trait]
impl ChannelHandle for ElevenLabsHandle {
    async fn send_text(&self, text: &str) -> lexai_core::Result<()> {
        let frame = serde_json::to_string(&ClientFrame::UserMessage {
            text: text.to_string(),
        })
        .map_err(|e| ChannelError::Transport(e.to_string()))?;

        self.outbound_tx
            .send(Outbound::Frame(frame))
            .await
            .map_err(|_| ChannelError::Closed)?;
        Ok(())
    }

    async fn end_session(&mut self) -> lexai_core::Result<()> {
        // Ask the pump to flush a close frame, then make sure it is gone.
        let _ = self.outbound_tx.send(Outbound::Close).await;
        if self.task.is_finished() {
            return Ok(());
        }
        if tokio::time::timeout(std::time::Duration::from_secs(2), &mut self.task)
            .await
            .is_err()
        {
            self.task.abort();
        }
        Ok(())
    }

    fn take_events(&mut self) -> Option<mpsc::Receiver<ChannelEvent>> {
        self.events.take()
    }
}

impl Drop for ElevenLabsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
