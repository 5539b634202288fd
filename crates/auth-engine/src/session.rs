//! Session lifecycle: login, registration, restore, and logout.

use crate::endpoints::Endpoints;
use crate::{
    first_blank, ApiError, ApiRequest, AuthError, AuthResult, AuthenticatedExecutor, HttpTransport,
    RefreshCoordinator, SessionMachineInput, SessionState, SessionStateTracker,
};
use client_storage::{Session, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: TokenPair,
}

#[derive(Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Owns the session FSM and wires the store, transport, coordinator and
/// executor together.
pub struct SessionManager {
    store: Arc<SessionStore>,
    transport: Arc<dyn HttpTransport>,
    state: Arc<SessionStateTracker>,
    executor: Arc<AuthenticatedExecutor>,
}

impl SessionManager {
    /// Create a session manager and restore the state from `store`.
    pub fn new(store: Arc<SessionStore>, transport: Arc<dyn HttpTransport>) -> AuthResult<Self> {
        let state = Arc::new(SessionStateTracker::new());
        let coordinator = RefreshCoordinator::new(store.clone(), transport.clone(), state.clone());
        let executor = Arc::new(AuthenticatedExecutor::new(
            store.clone(),
            transport.clone(),
            coordinator,
            state.clone(),
        ));

        let manager = Self {
            store,
            transport,
            state,
            executor,
        };
        manager.restore()?;
        Ok(manager)
    }

    /// Executor shared by every controller of this session.
    pub fn executor(&self) -> Arc<AuthenticatedExecutor> {
        Arc::clone(&self.executor)
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Whether a credential pair is stored. Says nothing about its validity.
    pub fn has_stored_session(&self) -> AuthResult<bool> {
        Ok(!self.store.get()?.is_anonymous())
    }

    /// Derive the state from the store: a stored access credential counts
    /// as authenticated until the server says otherwise.
    pub fn restore(&self) -> AuthResult<SessionState> {
        if self.state.current() == SessionState::Anonymous && self.has_stored_session()? {
            debug!("Restoring stored session");
            return self.state.apply(&SessionMachineInput::SessionRestored);
        }
        Ok(self.state.current())
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthResult<()> {
        if let Some(field) = first_blank(&[("username", username), ("password", password)]) {
            return Err(AuthError::Validation(format!("{} is required", field)));
        }
        info!(username = %username, "Logging in");
        self.authenticate(
            Endpoints::LOGIN,
            &LoginRequest { username, password },
            "Login failed",
        )
        .await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> AuthResult<()> {
        if let Some(field) = first_blank(&[
            ("username", username),
            ("email", email),
            ("password", password),
        ]) {
            return Err(AuthError::Validation(format!("{} is required", field)));
        }
        info!(username = %username, "Registering account");
        self.authenticate(
            Endpoints::REGISTER,
            &RegisterRequest {
                username,
                email,
                password,
            },
            "Registration failed",
        )
        .await
    }

    /// End the session. The server is told on a best-effort basis; local
    /// credentials are cleared regardless.
    pub async fn logout(&self) -> AuthResult<()> {
        self.state.apply_if_valid(&SessionMachineInput::LogoutRequested);

        if matches!(self.store.access_token(), Ok(Some(_))) {
            if let Err(e) = self.executor.execute(&ApiRequest::post(Endpoints::LOGOUT)).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        let cleared = self.store.clear();
        self.state.apply_if_valid(&SessionMachineInput::LogoutComplete);
        cleared?;
        info!("Logged out");
        Ok(())
    }

    async fn authenticate<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        fallback: &str,
    ) -> AuthResult<()> {
        self.state.apply(&SessionMachineInput::LoginAttempt)?;

        let stored = match self.request_tokens(path, body, fallback).await {
            Ok(tokens) => self
                .store
                .set(&Session::new(tokens.access, tokens.refresh))
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match stored {
            Ok(()) => {
                self.state.apply(&SessionMachineInput::LoginSuccess)?;
                info!("Authenticated");
                Ok(())
            }
            Err(e) => {
                self.state.apply_if_valid(&SessionMachineInput::LoginFailed);
                Err(e)
            }
        }
    }

    async fn request_tokens<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        fallback: &str,
    ) -> AuthResult<TokenPair> {
        let request = ApiRequest::post(path).with_json(body)?;
        let response = self
            .transport
            .send(&request)
            .await
            .map_err(ApiError::from)?;

        if !response.is_success() {
            let status = response.status;
            let message = response
                .error_message()
                .unwrap_or_else(|| fallback.to_string());
            warn!(status = %status, path = %path, "Authentication rejected");
            if status.is_client_error() {
                return Err(AuthError::InvalidCredentials(message));
            }
            return Err(ApiError::Operation {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body: TokenResponse = response.json()?;
        Ok(body.token)
    }
}
