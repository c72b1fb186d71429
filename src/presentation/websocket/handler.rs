//! WebSocket Connection Handler
//!
//! Upgrades an authenticated request and runs the two per-connection loops:
//! the dispatcher drains the send queue into the socket on its own task, the
//! reader watches the socket for inbound frames and disconnects. Either side
//! may end the connection; teardown runs once.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};

use super::connection::Connection;
use super::gateway::Gateway;
use super::messages::InboundFrame;
use crate::domain::AuthenticatedSession;
use crate::infrastructure::metrics;
use crate::presentation::http::extractors::SessionUser;
use crate::startup::AppState;

/// Upper bound on flushing and closing the socket once a connection ends
const SINK_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket upgrade handler
pub async fn ws_handler(
    SessionUser(session): SessionUser,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    let limits = &state.settings.websocket;
    let gateway = state.gateway.clone();

    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, gateway, session))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>, session: AuthenticatedSession) {
    let connection = gateway.open_connection(session.user_id, session.session_id);
    gateway.connect(&connection).await;

    // Split socket for concurrent read/write
    let (sink, stream) = socket.split();
    serve_connection(gateway, connection, sink, stream).await;
}

/// Run a registered connection until either side ends it.
///
/// The dispatcher is spawned; the reader runs on the calling task. Returns
/// once both loops have stopped.
pub async fn serve_connection<Si, St, E>(
    gateway: Arc<Gateway>,
    connection: Arc<Connection>,
    sink: Si,
    stream: St,
) where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display + Send,
    St: Stream<Item = Result<Message, E>> + Unpin + Send,
    E: Display + Send,
{
    let dispatcher = tokio::spawn(run_dispatcher(gateway.clone(), connection.clone(), sink));

    run_reader(&gateway, &connection, stream).await;

    if let Err(e) = dispatcher.await {
        tracing::error!(
            connection_id = %connection.id(),
            error = %e,
            "Dispatcher task failed"
        );
        gateway.disconnect(&connection).await;
    }
    connection.mark_closed();

    tracing::info!(
        user_id = %connection.user_id(),
        session_id = %connection.session_id(),
        connection_id = %connection.id(),
        "User disconnected"
    );
}

/// Write queued envelopes to the socket in FIFO order.
///
/// A write that never completes (peer stopped reading) is abandoned as soon as
/// the connection is closed. The sink is closed exactly once, bounded by
/// `SINK_CLOSE_TIMEOUT`.
async fn run_dispatcher<Si>(gateway: Arc<Gateway>, connection: Arc<Connection>, mut sink: Si)
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
{
    while let Some(envelope) = connection.next_outbound().await {
        let text = match serde_json::to_string(envelope.as_ref()) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    connection_id = %connection.id(),
                    channel = envelope.channel(),
                    error = %e,
                    "Failed to serialize envelope"
                );
                continue;
            }
        };

        tokio::select! {
            sent = sink.send(Message::Text(text.into())) => {
                if let Err(e) = sent {
                    metrics::record_write_failure();
                    tracing::debug!(
                        connection_id = %connection.id(),
                        error = %e,
                        "Write failed, closing connection"
                    );
                    break;
                }
            }
            _ = connection.closed() => {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "Connection closed during a pending write"
                );
                break;
            }
        }
    }

    gateway.disconnect(&connection).await;
    if tokio::time::timeout(SINK_CLOSE_TIMEOUT, sink.close())
        .await
        .is_err()
    {
        tracing::debug!(connection_id = %connection.id(), "Timed out closing socket");
    }
}

/// Read inbound frames until the socket ends or the connection is closed
async fn run_reader<St, E>(gateway: &Gateway, connection: &Arc<Connection>, mut stream: St)
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        tokio::select! {
            _ = connection.closed() => break,

            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_text(gateway, connection, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!(connection_id = %connection.id(), "Connection closed");
                    break;
                }
                Some(Ok(_)) => {
                    // Ping/pong is answered by axum; binary frames are not used
                }
                Some(Err(e)) => {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    break;
                }
            },
        }
    }

    gateway.disconnect(connection).await;
}

/// Route a text frame to the inbound handler
async fn handle_text(gateway: &Gateway, connection: &Arc<Connection>, text: &str) {
    match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => gateway.inbound().handle(gateway, connection, frame).await,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Ignoring malformed inbound frame"
            );
        }
    }
}
