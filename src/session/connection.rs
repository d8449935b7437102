//! Chat channel lifecycle: authenticate, bind to history, relay messages.

use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::history::Transcript;

use super::protocol::{InboundMessage, OutboundMessage};

/// Close reason sent when a connection fails the token check.
const REJECTION_REASON: &str = "Token is invalid or expired";

/// Assistant text recorded and sent when the completion backend fails.
const COMPLETION_FAILURE_REPLY: &str = "Internal AI processing error (API call failed).";

/// Query parameters for the chat channel.
///
/// The token travels out-of-band of the message protocol; a missing token is
/// rejected the same way an invalid one is.
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub token: Option<String>,
}

/// WebSocket upgrade handler for `GET /api/v1/ai/chat`.
///
/// The upgrade itself always succeeds; authentication happens on the fresh
/// socket, so an unauthenticated client sees a policy-violation close frame
/// rather than a failed handshake.
pub async fn chat_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ChatQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, token: Option<String>) {
    // Empty and missing tokens fail verification exactly like forged ones.
    let presented = token.unwrap_or_default();
    let identity = match state.tokens.verify(&presented) {
        Ok(identity) => identity,
        Err(reason) => {
            info!(
                name: "session.rejected",
                %reason,
                "Closing unauthenticated chat connection"
            );
            reject(&mut socket).await;
            return;
        }
    };

    let connection = Uuid::new_v4();
    let transcript = state.history.get_or_create(&identity);

    info!(
        name: "session.connected",
        identity = %identity,
        connection = %connection,
        prior_turns = transcript.len(),
        "Chat session established"
    );

    run_session(&mut socket, &state, &identity, &transcript, connection).await;

    info!(
        name: "session.closed",
        identity = %identity,
        connection = %connection,
        turns = transcript.len(),
        "Chat session closed, context retained"
    );
}

/// Refuse the connection with a policy-violation close before any
/// application message flows.
async fn reject(socket: &mut WebSocket) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: Utf8Bytes::from_static(REJECTION_REASON),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

/// Message loop for one authenticated session.
///
/// Messages are processed strictly one at a time: the next inbound frame is
/// not read until the previous round trip, including both transcript appends
/// and the reply send, has finished.
async fn run_session(
    socket: &mut WebSocket,
    state: &AppState,
    identity: &str,
    transcript: &Transcript,
    connection: Uuid,
) {
    while let Some(received) = socket.recv().await {
        let message = match received {
            Ok(message) => message,
            Err(err) => {
                debug!(
                    name: "session.transport_error",
                    identity = %identity,
                    connection = %connection,
                    error = %err,
                    "Chat transport error"
                );
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let inbound: InboundMessage = match serde_json::from_str(text.as_str()) {
                    Ok(inbound) => inbound,
                    Err(err) => {
                        warn!(
                            name: "session.malformed",
                            identity = %identity,
                            error = %err,
                            "Ignoring malformed inbound message"
                        );
                        continue;
                    }
                };

                // Empty text still makes the full round trip.
                let envelope = round_trip(state, identity, transcript, inbound.data.trim()).await;

                match serde_json::to_string(&envelope) {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            debug!(
                                name: "session.send_failed",
                                identity = %identity,
                                connection = %connection,
                                "Client went away mid-reply"
                            );
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(
                            name: "session.encode_failed",
                            identity = %identity,
                            error = %err,
                            "Failed to encode reply envelope"
                        );
                    }
                }
            }
            Message::Close(_) => {
                debug!(
                    name: "session.close_frame",
                    identity = %identity,
                    connection = %connection,
                    "Client closed the chat channel"
                );
                break;
            }
            _ => {
                // Binary, ping and pong frames carry no chat payload.
            }
        }
    }
}

/// One full message round trip: append the user turn, run the completion
/// call over the whole transcript, append the assistant turn.
///
/// Always produces an envelope. A failed or timed-out completion call is
/// recorded and answered with [`COMPLETION_FAILURE_REPLY`], so the session
/// survives and the client still hears back.
async fn round_trip(
    state: &AppState,
    identity: &str,
    transcript: &Transcript,
    query: &str,
) -> OutboundMessage {
    transcript.append_user(query);
    let turns = transcript.snapshot();

    let ceiling = Duration::from_secs(state.config.completion.request_timeout_secs);
    let outcome = tokio::time::timeout(ceiling, state.completions.generate(identity, &turns)).await;

    let reply = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            error!(
                name: "completion.failed",
                identity = %identity,
                error = %err,
                "Completion call failed"
            );
            COMPLETION_FAILURE_REPLY.to_string()
        }
        Err(_) => {
            error!(
                name: "completion.timeout",
                identity = %identity,
                timeout_secs = ceiling.as_secs(),
                "Completion call timed out"
            );
            COMPLETION_FAILURE_REPLY.to_string()
        }
    };

    transcript.append_assistant(reply.clone());
    OutboundMessage::complete(query, reply)
}
