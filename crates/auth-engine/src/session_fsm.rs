//! Session state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//! ┌─────────────────┐  SessionRestored   ┌─────────────────┐
//! │    Anonymous    │ ─────────────────► │  Authenticated  │
//! └──┬───────▲──────┘                    └──┬───────▲──────┘
//!    │       │ LoginFailed                  │       │
//!    │       └───────────┐                  │       │ LoginSuccess
//!    │ LoginAttempt   ┌──┴──────────────┐   │       │
//!    └──────────────► │    LoggingIn    │ ──┼───────┘
//!                     └─────────────────┘   │
//!                                           │ Unauthorized (401)
//!                                           ▼
//!                     ┌─────────────────┐  RefreshSuccess  ──► Authenticated
//!                     │   Refreshing    │  RefreshFailed   ──► Anonymous
//!                     └─────────────────┘  SessionRejected ──► Anonymous
//!
//!   Anonymous --Unauthorized--> Refreshing
//!   Authenticated --SessionRejected--> Anonymous
//!   Authenticated --LoginAttempt--> LoggingIn
//!   Anonymous | Authenticated | Refreshing --LogoutRequested--> LoggingOut
//!   LoggingOut --LogoutComplete--> Anonymous
//! ```
//!
//! Authenticated is optimistic: the stored access credential is assumed
//! valid until the server answers 401.

use parking_lot::Mutex;
use rust_fsm::*;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::{AuthError, AuthResult};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Anonymous)

    Anonymous => {
        LoginAttempt => LoggingIn,
        SessionRestored => Authenticated,
        // A request sent with a stale credential after restart
        Unauthorized => Refreshing,
        LogoutRequested => LoggingOut
    },
    LoggingIn => {
        LoginSuccess => Authenticated,
        LoginFailed => Anonymous
    },
    Authenticated => {
        Unauthorized => Refreshing,
        // 401 survived a renewal
        SessionRejected => Anonymous,
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut
    },
    Refreshing => {
        RefreshSuccess => Authenticated,
        RefreshFailed => Anonymous,
        // Another call's retry was refused while this renewal ran
        SessionRejected => Anonymous,
        LogoutRequested => LoggingOut
    },
    LoggingOut => {
        LogoutComplete => Anonymous
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Session state for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    LoggingIn,
    Authenticated,
    Refreshing,
    LoggingOut,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    /// Returns true if the state is an in-progress state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionState::LoggingIn | SessionState::Refreshing | SessionState::LoggingOut
        )
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::Anonymous => SessionState::Anonymous,
            SessionMachineState::LoggingIn => SessionState::LoggingIn,
            SessionMachineState::Authenticated => SessionState::Authenticated,
            SessionMachineState::Refreshing => SessionState::Refreshing,
            SessionMachineState::LoggingOut => SessionState::LoggingOut,
        }
    }
}

/// Owns the session FSM and publishes every state change on a watch channel.
pub struct SessionStateTracker {
    fsm: Mutex<SessionMachine>,
    tx: watch::Sender<SessionState>,
}

impl SessionStateTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionState::Anonymous);
        Self {
            fsm: Mutex::new(SessionMachine::new()),
            tx,
        }
    }

    pub fn current(&self) -> SessionState {
        SessionState::from(self.fsm.lock().state())
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Transition the FSM and publish the new state if it changed.
    pub fn apply(&self, input: &SessionMachineInput) -> AuthResult<SessionState> {
        let mut fsm = self.fsm.lock();
        let old_state = SessionState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = SessionState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Session state transition"
            );
            self.tx.send_replace(new_state);
        }

        Ok(new_state)
    }

    /// Like [`apply`](Self::apply), for transitions that may race with
    /// logout or a new login. A rejected input leaves the state as is.
    pub fn apply_if_valid(&self, input: &SessionMachineInput) -> SessionState {
        match self.apply(input) {
            Ok(state) => state,
            Err(e) => {
                debug!(error = %e, "Ignoring session transition");
                self.current()
            }
        }
    }
}

impl Default for SessionStateTracker {
    fn default() -> Self {
        Self::new()
    }
}
