//! The persisted access/refresh credential pair.

use crate::{SecureStorage, StorageError, StorageKeys, StorageResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access and refresh credentials.
///
/// A missing access credential means the client is anonymous. A present one
/// is not known to be valid; only the server can say.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.access_token.is_none()
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

// Credentials never appear in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |t: &Option<String>| t.as_ref().map(|_| "<redacted>");
        f.debug_struct("Session")
            .field("access_token", &mask(&self.access_token))
            .field("refresh_token", &mask(&self.refresh_token))
            .finish()
    }
}

/// Reads and writes the [`Session`] as a single record, so `set` and `clear`
/// are each one backend operation.
pub struct SessionStore {
    storage: Box<dyn SecureStorage>,
    // Guards compound read-then-write operations.
    lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// Current session; anonymous when nothing is stored.
    pub fn get(&self) -> StorageResult<Session> {
        match self.storage.get(StorageKeys::SESSION)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Encoding(e.to_string()))
            }
            None => Ok(Session::default()),
        }
    }

    /// Replace the stored session. Storing an empty session clears it.
    pub fn set(&self, session: &Session) -> StorageResult<()> {
        let _guard = self.lock.lock();
        self.write(session)
    }

    /// Remove both credentials.
    pub fn clear(&self) -> StorageResult<()> {
        let _guard = self.lock.lock();
        self.storage.delete(StorageKeys::SESSION)?;
        Ok(())
    }

    pub fn access_token(&self) -> StorageResult<Option<String>> {
        Ok(self.get()?.access_token)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        Ok(self.get()?.refresh_token)
    }

    /// Store a renewed access credential, but only if the session still holds
    /// the refresh credential the renewal was made with.
    ///
    /// Returns `false` without writing when the session was cleared or
    /// replaced while the renewal was in flight.
    pub fn replace_access_token(&self, renewed_with: &str, access_token: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let mut session = self.get()?;
        if session.refresh_token.as_deref() != Some(renewed_with) {
            return Ok(false);
        }
        session.access_token = Some(access_token.to_string());
        self.write(&session)?;
        Ok(true)
    }

    fn write(&self, session: &Session) -> StorageResult<()> {
        if session.is_empty() {
            self.storage.delete(StorageKeys::SESSION)?;
            return Ok(());
        }
        let json =
            serde_json::to_string(session).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION, &json)
    }
}
