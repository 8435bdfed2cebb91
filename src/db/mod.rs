//! Persistence module split across logical submodules.

mod connection;
mod kv;
mod memory;

pub use connection::{ensure_schema, SqliteStore};
pub use kv::{KeyValueStore, StorageError};
pub use memory::MemoryStore;
