//! Single-flight renewal of the access credential.

use crate::endpoints::Endpoints;
use crate::transport::summarize_response_body;
use crate::{ApiRequest, HttpTransport, SessionMachineInput, SessionStateTracker};
use client_storage::SessionStore;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a renewal did not produce a new access credential.
///
/// Cloneable so every caller joined to one attempt receives the same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenewalFailure {
    #[error("No refresh credential stored")]
    MissingRefreshToken,

    #[error("Refresh rejected with status {0}")]
    Rejected(u16),

    #[error("Refresh request failed: {0}")]
    Transport(String),

    #[error("Undecodable refresh response: {0}")]
    Decode(String),

    #[error("Session storage failed: {0}")]
    Storage(String),

    /// The session was cleared or replaced while the renewal was in flight.
    #[error("Session changed during renewal")]
    Superseded,
}

type RenewalAttempt = Shared<BoxFuture<'static, Result<String, RenewalFailure>>>;

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Exchanges the refresh credential for a new access credential, with at most
/// one exchange in flight no matter how many callers ask.
///
/// Cheap to clone; clones share the in-flight slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    store: Arc<SessionStore>,
    transport: Arc<dyn HttpTransport>,
    state: Arc<SessionStateTracker>,
    in_flight: Mutex<Option<RenewalAttempt>>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<SessionStore>,
        transport: Arc<dyn HttpTransport>,
        state: Arc<SessionStateTracker>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store,
                transport,
                state,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Renew the access credential, joining the attempt already in flight if
    /// there is one. Outcomes are never cached: once an attempt completes the
    /// next call starts a fresh exchange.
    pub async fn renew(&self) -> Result<String, RenewalFailure> {
        let attempt = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(attempt) => {
                    debug!("Joining in-flight credential renewal");
                    attempt.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let attempt = async move {
                        let outcome = inner.exchange().await;
                        inner.in_flight.lock().take();
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(attempt.clone());
                    attempt
                }
            }
        };
        attempt.await
    }

    /// True while a renewal exchange is in flight.
    pub fn is_renewing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }
}

impl CoordinatorInner {
    async fn exchange(&self) -> Result<String, RenewalFailure> {
        self.state.apply_if_valid(&SessionMachineInput::Unauthorized);

        let refresh_token = match self.store.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => return Err(self.fail(RenewalFailure::MissingRefreshToken)),
            Err(e) => return Err(self.fail(RenewalFailure::Storage(e.to_string()))),
        };

        info!("Renewing access credential");
        let request = ApiRequest::post(Endpoints::REFRESH).authorized(Some(&refresh_token));
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(RenewalFailure::Transport(e.message))),
        };

        if !response.is_success() {
            warn!(
                status = %response.status,
                body_summary = %summarize_response_body(&response.body),
                "Credential renewal rejected"
            );
            return Err(self.fail(RenewalFailure::Rejected(response.status.as_u16())));
        }

        let access_token = match serde_json::from_str::<RefreshResponse>(&response.body) {
            Ok(body) => body.access_token,
            Err(e) => return Err(self.fail(RenewalFailure::Decode(e.to_string()))),
        };

        match self.store.replace_access_token(&refresh_token, &access_token) {
            Ok(true) => {
                self.state.apply_if_valid(&SessionMachineInput::RefreshSuccess);
                info!("Access credential renewed");
                Ok(access_token)
            }
            Ok(false) => {
                // Logout or a new login owns the store now; leave it alone.
                warn!("Session changed during renewal, discarding renewed credential");
                self.settle_superseded();
                Err(RenewalFailure::Superseded)
            }
            Err(e) => Err(self.fail(RenewalFailure::Storage(e.to_string()))),
        }
    }

    /// Leave Refreshing according to whatever the store now holds.
    fn settle_superseded(&self) {
        let input = match self.store.get() {
            Ok(session) if !session.is_anonymous() => SessionMachineInput::RefreshSuccess,
            _ => SessionMachineInput::RefreshFailed,
        };
        self.state.apply_if_valid(&input);
    }

    /// Clear the session and return to Anonymous.
    fn fail(&self, failure: RenewalFailure) -> RenewalFailure {
        warn!(reason = %failure, "Credential renewal failed, clearing session");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session after renewal failure");
        }
        self.state.apply_if_valid(&SessionMachineInput::RefreshFailed);
        failure
    }
}
