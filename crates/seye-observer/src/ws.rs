//! `WebSocket` handler for the live track feed.
//!
//! Clients connect to `GET /ws` (or the `/socket` alias), are registered
//! as subscribers, and receive a `flightData` frame with the current
//! picture immediately, then one per tick and one per applied command.
//!
//! Text frames from the client are parsed as [`ClientMessage`] commands.
//! The reply is a `commandResult` frame sent to that client only; the
//! picture change itself reaches everyone through the normal feed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use seye_types::{ClientMessage, CommandAck, ServerMessage};
use tracing::{debug, info, warn};

use crate::broadcast;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` feed connection.
///
/// # Route
///
/// `GET /ws`, `GET /socket`
pub async fn ws_feed(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection: forward queued frames, apply incoming commands,
/// and deregister on the way out.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = match state.subscribe().await {
        Ok(sub) => sub,
        Err(e) => {
            warn!(error = %e, "Failed to register subscriber");
            return;
        }
    };
    let id = subscription.id;
    info!(subscriber = %id, total = state.registry.len(), "Client connected");

    loop {
        tokio::select! {
            frame = subscription.frames.recv() => {
                let Some(frame) = frame else {
                    // Pruned by the broadcast engine.
                    break;
                };
                if socket.send(Message::Text(frame)).await.is_err() {
                    debug!(subscriber = %id, "Send failed");
                    break;
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_command(&state, text.as_str()).await;
                        match broadcast::encode(&reply) {
                            Ok(frame) => {
                                if socket.send(Message::Text(frame)).await.is_err() {
                                    debug!(subscriber = %id, "Send failed");
                                    break;
                                }
                            }
                            Err(e) => warn!(error = %e, "Failed to encode command result"),
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %id, "Pong failed");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(subscriber = %id, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.unsubscribe(id);
    info!(subscriber = %id, total = state.registry.len(), "Client disconnected");
}

/// Parse and apply one client command, producing the reply frame.
///
/// Malformed input never closes the connection; it is answered with an
/// error acknowledgment instead.
pub async fn handle_command(state: &AppState, text: &str) -> ServerMessage {
    let ack = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::DeployAircraft(request)) => match state.commands.deploy(request).await {
            Ok(ack) => ack,
            Err(e) => CommandAck::error(e.to_string()),
        },
        Ok(ClientMessage::RemoveAircraft(id)) => state.commands.retract(&id).await,
        Err(e) => {
            debug!(error = %e, "Unparseable client frame");
            CommandAck::error(format!("malformed command: {e}"))
        }
    };
    ServerMessage::CommandResult(ack)
}
