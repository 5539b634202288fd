//! Durable credential storage for the Quill client.
//!
//! - [`SecureStorage`]: key/value backend trait
//! - [`FileStorage`]: JSON file backend with atomic replace, used in production
//! - [`MemoryStorage`]: process-local backend for tests and ephemeral sessions
//! - [`SessionStore`]: the access/refresh credential pair on top of a backend

mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session::{Session, SessionStore};
pub use traits::SecureStorage;

use std::path::Path;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Open the file-backed session store at `path`.
pub fn open_session_store(path: &Path) -> StorageResult<SessionStore> {
    let storage = FileStorage::open(path)?;
    Ok(SessionStore::new(Box::new(storage)))
}
