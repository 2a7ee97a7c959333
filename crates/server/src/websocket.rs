//! Presentation WebSocket
//!
//! One socket per widget session. Inbound frames are JSON commands
//! (`connect`, `send_text`, `disconnect`, `reset`); outbound frames are the
//! controller's [`UiEvent`]s serialized as-is. Closing the socket tears the
//! agent channel down but keeps the session entry until it expires.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};

use lexai_core::SessionMode;
use lexai_session::{ConversationController, UiEvent};

use crate::session::Session;
use crate::state::AppState;

const OUTBOUND_BUFFER: usize = 16;

/// Inbound presentation command
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Open a session with the external agent
    Connect {
        #[serde(default)]
        mode: SessionMode,
    },
    /// Forward a user-typed message
    SendText { text: String },
    /// Tear the agent session down
    Disconnect,
    /// Disconnect and clear all conversation state
    Reset,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(session_id = %session_id, "websocket attached");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, session)))
}

async fn handle_socket(socket: WebSocket, session: Arc<Session>) {
    let (mut sink, mut stream) = socket.split();
    let controller = session.controller.clone();
    let mut events = controller.subscribe();

    // Local error frames share the outbound pipe with controller events
    let (out_tx, mut out_rx) = mpsc::channel::<UiEvent>(OUTBOUND_BUFFER);

    let forward = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "presentation event stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                event = out_rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            let Ok(json) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(WsMessage::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        session.touch();
        match serde_json::from_str::<ClientCommand>(&text) {
            Ok(command) => {
                if let Err(e) = dispatch(&controller, command).await {
                    let _ = out_tx
                        .send(UiEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "unparseable command ignored");
            }
        }
    }

    forward.abort();
    // Widget gone: release the external agent session
    controller.disconnect().await;
    tracing::info!(session_id = %session.id, "websocket detached");
}

async fn dispatch(
    controller: &ConversationController,
    command: ClientCommand,
) -> lexai_core::Result<()> {
    match command {
        ClientCommand::Connect { mode } => controller.connect(mode).await,
        ClientCommand::SendText { text } => controller.send_text(&text).await,
        ClientCommand::Disconnect => {
            controller.disconnect().await;
            Ok(())
        }
        ClientCommand::Reset => {
            controller.reset().await;
            Ok(())
        }
    }
}
