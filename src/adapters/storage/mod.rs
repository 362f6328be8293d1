//! Storage Adapters
//!
//! Implementations of the `SessionStore` port.
//!
//! ## Available Adapters
//!
//! - **FileSessionStore** - YAML snapshot + JSON-lines feed log on disk
//! - **InMemorySessionStore** - Stores sessions in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStore, InMemorySessionStore};
//!
//! // Production: file-based storage
//! let store = FileSessionStore::new("./data/sessions");
//!
//! // Testing: in-memory storage
//! let store = InMemorySessionStore::new();
//! ```

mod file_session_store;
mod in_memory_session_store;

pub use file_session_store::FileSessionStore;
pub use in_memory_session_store::InMemorySessionStore;
