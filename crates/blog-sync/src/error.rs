//! Controller error types.

use auth_engine::{first_blank, ApiError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Required input was blank; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SyncError {
    /// Validation error for the first blank field, if any.
    pub(crate) fn check_required(fields: &[(&str, &str)]) -> SyncResult<()> {
        match first_blank(fields) {
            Some(field) => Err(SyncError::Validation(format!("{} is required", field))),
            None => Ok(()),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, SyncError::Api(e) if e.is_session_expired())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SyncError::Validation(_))
    }

    /// Message shown after `action` failed.
    pub fn user_message(&self, action: &str) -> String {
        match self {
            SyncError::Validation(message) => message.clone(),
            SyncError::Api(e) => e.user_message(action),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
