//! Core library surface for the Camille Mignon children's art archive.
//!
//! The binary only wires configuration, logging and storage together; every
//! piece it uses is exposed here so tests can drive the same code.
pub mod auth;
pub mod config;
pub mod db;
pub mod images;
pub mod logging;
pub mod models;
pub mod router;
pub mod seed;
pub mod store;
pub mod ui;

/// Persistence backends behind the archive.
pub use db::{ensure_schema, KeyValueStore, MemoryStore, SqliteStore, StorageError};

pub use auth::AdminGate;
pub use config::AppConfig;
pub use logging::init_logging;
pub use models::{Artwork, Child, NewArtwork, NewChild, Visibility};
pub use router::{Page, Router};
pub use store::{Snapshot, Store};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
