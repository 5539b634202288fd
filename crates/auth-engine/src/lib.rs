//! Session authentication for the Quill blog client.
//!
//! This crate provides:
//! - An explicit FSM for the session lifecycle (anonymous, authenticated, refreshing)
//! - Single-flight access credential renewal
//! - An executor that retries a request once after renewing on 401
//! - Login, registration, and logout against the blog API

mod coordinator;
mod endpoints;
mod error;
mod executor;
mod session;
mod session_fsm;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use coordinator::{RefreshCoordinator, RenewalFailure};
pub use endpoints::Endpoints;
pub use error::{first_blank, ApiError, ApiResult, AuthError, AuthResult};
pub use executor::{AuthenticatedExecutor, MAX_AUTH_RETRIES};
pub use session::SessionManager;
pub use session_fsm::session_machine;
pub use session_fsm::{
    SessionMachine, SessionMachineInput, SessionMachineState, SessionState, SessionStateTracker,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, TransportError};
