//! WebSocket handler
//!
//! Handles WebSocket connections and frame processing.

use crate::connection::Connection;
use crate::protocol::{ClientFrame, CloseCode, HelloPayload, ProtocolError, RelayFrame};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use routelink_core::{ConnectionId, RelayCommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;

/// How long the writer gets to flush a close frame after cleanup
const WRITER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// WebSocket upgrade handler
pub async fn socket_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let connection_id = ConnectionId::generate();
    let relay_config = state.config().relay.clone();

    // Create message channel for outgoing frames
    let (tx, rx) = mpsc::channel::<RelayFrame>(relay_config.outbound_buffer);

    let connection = state.connection_manager().add_connection(connection_id, tx);

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    let (mut ws_sink, ws_stream) = socket.split();

    // Send Hello before anything else can be queued
    let hello = HelloPayload::new(connection_id, relay_config.heartbeat_interval_ms);
    let json = match RelayFrame::hello(&hello).and_then(|frame| frame.to_json()) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to encode hello");
            cleanup_connection(&state, connection_id);
            return;
        }
    };
    if ws_sink.send(Message::Text(json)).await.is_err() {
        tracing::warn!(connection_id = %connection_id, "Failed to send hello");
        cleanup_connection(&state, connection_id);
        return;
    }

    let (close_tx, close_rx) = oneshot::channel::<CloseCode>();

    let mut send_task = tokio::spawn(write_frames(connection_id, ws_sink, rx, close_rx));
    let mut recv_task = tokio::spawn(read_frames(state.clone(), connection.clone(), ws_stream));
    let mut liveness_task = tokio::spawn(watch_liveness(
        connection.clone(),
        relay_config.heartbeat_timeout(),
    ));

    // Wait for any task to complete
    let (close_code, writer_done) = tokio::select! {
        result = &mut recv_task => (result.ok().flatten(), false),
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            (None, true)
        }
        result = &mut liveness_task => (result.ok(), false),
    };

    recv_task.abort();
    liveness_task.abort();
    drop(connection);

    cleanup_connection(&state, connection_id);

    if writer_done {
        return;
    }

    // No close code means the client went away on its own; dropping the sender ends the writer
    if let Some(code) = close_code {
        tracing::debug!(connection_id = %connection_id, close_code = %code, "Closing connection");
        let _ = close_tx.send(code);
    } else {
        drop(close_tx);
    }

    if tokio::time::timeout(WRITER_SHUTDOWN_GRACE, &mut send_task)
        .await
        .is_err()
    {
        tracing::debug!(connection_id = %connection_id, "Writer did not finish in time, aborting");
        send_task.abort();
    }
}

/// Read frames from the client until it closes or the socket fails
async fn read_frames(
    state: GatewayState,
    connection: Arc<Connection>,
    mut ws_stream: SplitStream<WebSocket>,
) -> Option<CloseCode> {
    let connection_id = connection.id();

    while let Some(msg) = ws_stream.next().await {
        connection.touch();

        match msg {
            Ok(Message::Text(text)) => handle_text_frame(&state, &connection, &text),
            Ok(Message::Binary(_)) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Binary frames not supported, ignoring"
                );
            }
            Ok(Message::Ping(_)) => {
                tracing::trace!(connection_id = %connection_id, "Ping received");
                // Pong is handled automatically by axum
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!(connection_id = %connection_id, "Pong received");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "Client closed connection");
                return None;
            }
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                return Some(CloseCode::UnknownError);
            }
        }
    }
    None
}

/// Drain the outbound queue into the socket
///
/// Ends when the queue closes, the socket fails, or a close code arrives.
async fn write_frames(
    connection_id: ConnectionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<RelayFrame>,
    mut close_rx: oneshot::Receiver<CloseCode>,
) {
    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                match frame.to_json() {
                    Ok(json) => {
                        if ws_sink.send(Message::Text(json.into())).await.is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send frame to WebSocket"
                            );
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            connection_id = %connection_id,
                            error = %e,
                            "Failed to encode frame"
                        );
                    }
                }
            }
            code = &mut close_rx => {
                if let Ok(code) = code {
                    let close = CloseFrame {
                        code: code.as_u16(),
                        reason: code.description().into(),
                    };
                    let _ = ws_sink.send(Message::Close(Some(close))).await;
                    return;
                }
                break;
            }
        }
    }

    let _ = ws_sink.close().await;
}

/// Close connections that stay silent for longer than `timeout`
async fn watch_liveness(connection: Arc<Connection>, timeout: Duration) -> CloseCode {
    let mut check_interval = interval((timeout / 4).max(Duration::from_millis(10)));

    loop {
        check_interval.tick().await;

        let idle = connection.idle_for();
        if idle > timeout {
            tracing::warn!(
                connection_id = %connection.id(),
                idle_ms = idle.as_millis(),
                "Connection timed out (nothing received)"
            );
            return CloseCode::SessionTimeout;
        }
    }
}

/// Handle a text frame from the client
///
/// Malformed frames are logged and dropped; the connection stays open.
fn handle_text_frame(state: &GatewayState, connection: &Connection, text: &str) {
    let connection_id = connection.id();

    let frame = match decode_text(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection_id,
                code = e.code(),
                error = %e,
                "Ignoring malformed frame"
            );
            return;
        }
    };

    match frame {
        ClientFrame::Heartbeat => {
            if connection.try_send(RelayFrame::heartbeat_ack()).is_err() {
                tracing::debug!(connection_id = %connection_id, "Could not queue heartbeat ack");
            }
        }
        ClientFrame::Command(command) => {
            tracing::trace!(
                connection_id = %connection_id,
                event = command.name(),
                "Received frame"
            );

            let outcome = state.dispatcher().dispatch(connection_id, command);
            tracing::trace!(connection_id = %connection_id, outcome = ?outcome, "Frame dispatched");
        }
    }
}

fn decode_text(text: &str) -> Result<ClientFrame, ProtocolError> {
    RelayFrame::from_json(text)?.decode()
}

/// Clean up a connection on disconnect
///
/// The relay forgets the connection first so nothing new is routed to a queue about to go away.
fn cleanup_connection(state: &GatewayState, connection_id: ConnectionId) {
    tracing::info!(connection_id = %connection_id, "Cleaning up connection");

    state
        .dispatcher()
        .dispatch(connection_id, RelayCommand::Disconnect);

    state.connection_manager().remove_connection(connection_id);
}
