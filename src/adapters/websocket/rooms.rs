//! WebSocket rooms, one per workout session.
//!
//! ```text
//! Room: session-123    Room: session-456
//! ├── client-a         ├── client-d
//! ├── client-b         └── client-e
//! └── client-c
//! ```
//!
//! An update for session-123 reaches only clients a, b and c.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::foundation::SessionId;
use crate::ports::{SessionBroadcaster, SessionUpdate};

/// Unique identifier for a WebSocket client connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Manages WebSocket connection rooms organized by session.
///
/// Uses `RwLock` for the room registry since broadcasts (reads) vastly
/// outnumber joins/leaves (writes).
pub struct RoomManager {
    /// session_id → broadcast sender for that room.
    rooms: RwLock<HashMap<SessionId, broadcast::Sender<SessionUpdate>>>,

    /// client_id → session_id for cleanup on disconnect.
    client_sessions: RwLock<HashMap<ClientId, SessionId>>,

    /// Buffer size of each room's broadcast channel. Receivers that fall
    /// further behind than this miss updates and must resync.
    channel_capacity: usize,
}

impl RoomManager {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            client_sessions: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(128)
    }

    /// Join a client to a session room, creating the room if needed.
    pub async fn join(
        &self,
        session_id: &SessionId,
        client_id: ClientId,
    ) -> broadcast::Receiver<SessionUpdate> {
        let mut rooms = self.rooms.write().await;

        let sender = rooms.entry(*session_id).or_insert_with(|| {
            let (tx, _) = broadcast::channel(self.channel_capacity);
            tx
        });

        self.client_sessions
            .write()
            .await
            .insert(client_id, *session_id);

        sender.subscribe()
    }

    /// Remove a client from its room. Empty rooms are dropped.
    ///
    /// The client's receiver must already be dropped for the room to count
    /// as empty.
    pub async fn leave(&self, client_id: &ClientId) {
        let session_id = self.client_sessions.write().await.remove(client_id);

        if let Some(session_id) = session_id {
            let mut rooms = self.rooms.write().await;
            if rooms
                .get(&session_id)
                .is_some_and(|sender| sender.receiver_count() == 0)
            {
                rooms.remove(&session_id);
            }
        }
    }

    /// Send an update to every client in a session room.
    ///
    /// No room or no receivers is a no-op.
    pub async fn broadcast_to_session(&self, session_id: &SessionId, update: SessionUpdate) {
        let rooms = self.rooms.read().await;

        if let Some(sender) = rooms.get(session_id) {
            let _ = sender.send(update);
        }
    }

    /// Number of connected clients in a room (0 if it doesn't exist).
    pub async fn client_count(&self, session_id: &SessionId) -> usize {
        self.rooms
            .read()
            .await
            .get(session_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_rooms(&self) -> Vec<SessionId> {
        self.rooms.read().await.keys().cloned().collect()
    }

    pub async fn total_client_count(&self) -> usize {
        self.client_sessions.read().await.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl SessionBroadcaster for RoomManager {
    async fn broadcast(&self, session_id: SessionId, update: SessionUpdate) {
        self.broadcast_to_session(&session_id, update).await;
    }
}
