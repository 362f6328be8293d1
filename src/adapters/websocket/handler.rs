//! WebSocket upgrade handler for live workout sessions.
//!
//! Connection lifecycle:
//! 1. Check the session exists
//! 2. Upgrade to WebSocket
//! 3. Join the session room and send `connected`
//! 4. Forward room updates and answer client messages until disconnect
//! 5. Leave the room

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::application::session_actor::{ActorError, SessionActorRegistry};
use crate::domain::foundation::{CommandMetadata, SessionId, Timestamp};
use crate::domain::workout_session::FeedCursor;
use crate::ports::SessionUpdate;

use super::{
    messages::{
        ClientCommand, ClientMessage, CommandResultMessage, ConnectedMessage,
        ResyncRequiredMessage, ServerMessage, SyncMessage,
    },
    rooms::{ClientId, RoomManager},
};

/// Direct replies queued per connection before the reader waits.
const DIRECT_QUEUE_CAPACITY: usize = 32;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub room_manager: Arc<RoomManager>,
    pub registry: Arc<SessionActorRegistry>,
}

impl WebSocketState {
    pub fn new(room_manager: Arc<RoomManager>, registry: Arc<SessionActorRegistry>) -> Self {
        Self {
            room_manager,
            registry,
        }
    }
}

/// Handle WebSocket upgrade requests for a live session.
///
/// Route: `GET /api/workout-sessions/:session_id/live`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<WebSocketState>,
) -> Response {
    let session_id: SessionId = match session_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return reject(StatusCode::BAD_REQUEST, "ValidationError", "Invalid session ID");
        }
    };

    let session = match state.registry.snapshot(session_id).await {
        Ok(session) => session,
        Err(e @ ActorError::NotFound(_)) => {
            return reject(StatusCode::NOT_FOUND, e.error_kind(), &e.to_string());
        }
        Err(e) => {
            return reject(StatusCode::SERVICE_UNAVAILABLE, e.error_kind(), &e.to_string());
        }
    };

    let connected = ConnectedMessage {
        session_id: session_id.to_string(),
        client_id: String::new(),
        state: session.state(),
        last_sequence: session.last_sequence(),
        timestamp: Timestamp::now().to_rfc3339(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, session_id, connected, state))
}

fn reject(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "errorKind": kind, "message": message })),
    )
        .into_response()
}

/// Runs for the lifetime of one connection.
async fn handle_socket(
    socket: WebSocket,
    session_id: SessionId,
    mut connected: ConnectedMessage,
    state: WebSocketState,
) {
    let (mut sender, mut receiver) = socket.split();
    let client_id = ClientId::new();

    let mut room_rx: broadcast::Receiver<SessionUpdate> = state
        .room_manager
        .join(&session_id, client_id.clone())
        .await;

    connected.client_id = client_id.to_string();
    if let Err(e) = send_message(&mut sender, &ServerMessage::Connected(connected)).await {
        tracing::debug!(client_id = %client_id, "Failed to send connected message: {}", e);
        drop(room_rx);
        state.room_manager.leave(&client_id).await;
        return;
    }

    // Replies to this client only (pong, command results, sync batches).
    let (direct_tx, mut direct_rx) = mpsc::channel::<ServerMessage>(DIRECT_QUEUE_CAPACITY);

    let mut send_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    update = room_rx.recv() => match update {
                        Ok(update) => ServerMessage::from(update),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                client_id = %client_id,
                                missed,
                                "Client lagged behind room"
                            );
                            ServerMessage::ResyncRequired(ResyncRequiredMessage { missed })
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    direct = direct_rx.recv() => match direct {
                        Some(msg) => msg,
                        None => break,
                    },
                };
                if let Err(e) = send_message(&mut sender, &msg).await {
                    tracing::debug!(
                        client_id = %client_id,
                        "Send error, closing connection: {}",
                        e
                    );
                    break;
                }
            }
        })
    };

    let mut recv_task = {
        let client_id = client_id.clone();
        let registry = state.registry.clone();
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => handle_client_message(&registry, session_id, msg).await,
                            Err(e) => ServerMessage::error("ValidationError", e.to_string(), None),
                        };
                        if direct_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(
                            client_id = %client_id,
                            "Received unsupported binary message"
                        );
                    }
                    // Protocol-level ping/pong is answered by axum.
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        tracing::debug!(client_id = %client_id, "Client sent close frame");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                        break;
                    }
                }
            }
        })
    };

    // Wait for the aborted task too, so the room receiver is dropped before
    // leaving the room.
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = &mut recv_task => {
            send_task.abort();
            let _ = send_task.await;
        }
    }

    state.room_manager.leave(&client_id).await;
}

async fn handle_client_message(
    registry: &SessionActorRegistry,
    session_id: SessionId,
    msg: ClientMessage,
) -> ServerMessage {
    match msg {
        ClientMessage::Ping => ServerMessage::pong(),
        ClientMessage::Command(ClientCommand {
            request_id,
            command,
        }) => {
            let name = command.name().to_string();
            let metadata = CommandMetadata::new().with_source("websocket");
            let metadata = match &request_id {
                Some(id) => metadata.with_correlation_id(id.clone()),
                None => metadata,
            };
            match registry.execute(session_id, command, metadata).await {
                Ok(reply) => ServerMessage::CommandResult(CommandResultMessage {
                    command: name,
                    request_id,
                    state: reply.session.state(),
                    last_sequence: reply.session.last_sequence(),
                    appended: reply.outcome.appended.len(),
                }),
                Err(e) => ServerMessage::error(e.error_kind(), e.to_string(), request_id),
            }
        }
        ClientMessage::Sync(request) => {
            let cursor = request
                .after
                .map(FeedCursor::Sequence)
                .unwrap_or(FeedCursor::Start);
            match registry.feed_since(session_id, cursor).await {
                Ok(items) => {
                    let last_sequence = items
                        .last()
                        .map(|i| i.sequence())
                        .or(request.after)
                        .unwrap_or(0);
                    ServerMessage::Sync(SyncMessage {
                        items,
                        last_sequence,
                    })
                }
                Err(e) => ServerMessage::error(e.error_kind(), e.to_string(), None),
            }
        }
    }
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}
