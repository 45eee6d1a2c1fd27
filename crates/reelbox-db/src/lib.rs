//! On-device key-value storage for reelbox.
//!
//! String values keyed by string, with a bundled `SQLite` backend for
//! durable storage and an in-memory backend for tests and throwaway
//! sessions. Callers JSON-encode values through [`read_json`] and
//! [`write_json`].

mod connection;
mod error;
/// In-memory backend.
pub mod memory;
mod migrations;
/// `SQLite` backend.
pub mod sqlite;
mod store;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, resolve_db_path};
pub use error::StorageError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
#[allow(clippy::module_name_repetitions)]
pub use store::{KeyValueStore, LocalKeyValueStore, read_json, update_json, write_json};
