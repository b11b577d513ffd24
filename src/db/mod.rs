//! Persisted key-value storage for session state.
//!
//! The session survives restarts through three string keys. Two backends
//! exist: [`MemoryStore`] for tests and embedding, [`FileStore`] for the CLI.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

/// Persisted key names.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    /// JSON-serialized `UserProfile`
    pub const USER: &str = "user";
    pub const USER_ROLE: &str = "user_role";

    pub const ALL: [&str; 3] = [ACCESS_TOKEN, USER, USER_ROLE];
}

/// Read/write contract for persisted client state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
