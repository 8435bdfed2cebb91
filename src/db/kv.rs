use thiserror::Error;

/// Failures a key-value backend can report. The store never surfaces these to
/// the UI; they are logged and the caller falls back to seed data or keeps the
/// in-memory snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Durable string-to-string map keyed by fixed names. Production uses
/// [`SqliteStore`](super::SqliteStore); tests and the "storage disabled"
/// fallback use [`MemoryStore`](super::MemoryStore).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite any existing value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write several keys. Backends that can do so atomically override this;
    /// the default writes one key at a time and stops at the first failure.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}
