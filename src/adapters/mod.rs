//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to the outside world:
//! - `storage` - Session stores (in-memory, file)
//! - `websocket` - Live session rooms; the `SessionBroadcaster` implementation
//! - `http` - REST endpoints and router assembly

pub mod http;
pub mod storage;
pub mod websocket;

pub use http::{router, AppState};
pub use storage::{FileSessionStore, InMemorySessionStore};
pub use websocket::RoomManager;
