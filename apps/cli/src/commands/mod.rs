//! CLI command implementations.

mod auth;
mod comments;
mod posts;
mod profile;

pub use auth::{login, logout, register, status};
pub use comments::{comments_add, comments_delete, comments_list};
pub use posts::{posts_create, posts_delete, posts_list, posts_update};
pub use profile::{profile_show, profile_update};

use anyhow::Result;
use auth_engine::{AuthenticatedExecutor, ReqwestTransport, SessionManager};
use client_config_and_utils::{Config, Paths};
use client_storage::open_session_store;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs to talk to the blog API.
pub struct Context {
    pub paths: Paths,
    pub config: Config,
    pub session: SessionManager,
}

impl Context {
    /// Open the stored session and build the HTTP stack from `config`.
    pub fn open(paths: Paths, config: Config) -> Result<Self> {
        let store = Arc::new(open_session_store(&paths.session_file())?);
        let base_url = config.api_base_url()?;
        debug!(api_base_url = %base_url, "Opening session");
        let transport = Arc::new(ReqwestTransport::new(base_url, config.request_timeout())?);
        let session = SessionManager::new(store, transport)?;
        Ok(Self {
            paths,
            config,
            session,
        })
    }

    pub fn executor(&self) -> Arc<AuthenticatedExecutor> {
        self.session.executor()
    }

    /// Fail unless a session is stored.
    pub fn require_session(&self) -> Result<()> {
        if !self.session.has_stored_session()? {
            anyhow::bail!("Not logged in. Run 'quill login' first");
        }
        Ok(())
    }
}
