//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Access/refresh credential pair (JSON record)
    pub const SESSION: &'static str = "session";

    /// Every key the client writes.
    pub fn all() -> &'static [&'static str] {
        &[Self::SESSION]
    }
}
