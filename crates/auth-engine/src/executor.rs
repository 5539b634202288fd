//! Authenticated request execution with one renewal-and-retry on 401.

use crate::{
    ApiError, ApiRequest, ApiResponse, ApiResult, HttpTransport, RefreshCoordinator,
    SessionMachineInput, SessionStateTracker,
};
use client_storage::SessionStore;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

/// Renewals a single logical call may trigger.
pub const MAX_AUTH_RETRIES: u32 = 1;

/// Performs logical API operations on behalf of the current session.
///
/// Each call sends at most `MAX_AUTH_RETRIES + 1` times and triggers at most
/// `MAX_AUTH_RETRIES` renewals. The retry carries the credential returned by
/// the renewal that unblocked it.
pub struct AuthenticatedExecutor {
    store: Arc<SessionStore>,
    transport: Arc<dyn HttpTransport>,
    coordinator: RefreshCoordinator,
    state: Arc<SessionStateTracker>,
}

impl AuthenticatedExecutor {
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn HttpTransport>,
        coordinator: RefreshCoordinator,
        state: Arc<SessionStateTracker>,
    ) -> Self {
        Self {
            store,
            transport,
            coordinator,
            state,
        }
    }

    /// Send `request`, returning the first non-401 response if it is a success.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let mut credential = self.store.access_token()?;
        let mut retries = 0;

        loop {
            let response = self
                .transport
                .send(&request.authorized(credential.as_deref()))
                .await?;

            if response.status != StatusCode::UNAUTHORIZED {
                if response.is_success() {
                    return Ok(response);
                }
                debug!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status.as_u16(),
                    "Request failed"
                );
                return Err(response.into_error());
            }

            if retries >= MAX_AUTH_RETRIES {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    "Still unauthorized after renewal, ending session"
                );
                self.expire_session();
                return Err(ApiError::SessionExpired);
            }
            retries += 1;

            debug!(method = %request.method, path = %request.path, "Unauthorized, renewing credential");
            match self.coordinator.renew().await {
                Ok(token) => credential = Some(token),
                Err(failure) => {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        reason = %failure,
                        "Credential renewal failed, not retrying"
                    );
                    return Err(ApiError::SessionExpired);
                }
            }
        }
    }

    /// [`execute`](Self::execute) and decode the body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> ApiResult<T> {
        self.execute(request).await?.json()
    }

    fn expire_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear rejected session");
        }
        self.state.apply_if_valid(&SessionMachineInput::SessionRejected);
    }
}
