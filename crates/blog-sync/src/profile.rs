//! The signed-in user's profile.

use crate::api::fetch;
use crate::state::StateCell;
use crate::{Profile, ProfileDraft, SyncResult, Tracked};
use auth_engine::{ApiRequest, AuthenticatedExecutor, Endpoints};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub type ProfileState = Tracked<Option<Profile>>;

pub struct ProfileController {
    executor: Arc<AuthenticatedExecutor>,
    state: StateCell<Option<Profile>>,
}

impl ProfileController {
    pub fn new(executor: Arc<AuthenticatedExecutor>) -> Self {
        Self {
            executor,
            state: StateCell::new(None),
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.read(Option::clone)
    }

    pub async fn load(&self) -> SyncResult<Profile> {
        self.state.begin();
        let result = fetch::<Profile>(&self.executor, Ok(ApiRequest::get(Endpoints::PROFILE))).await;
        self.state.finish("load profile", &result, |profile, loaded| {
            *profile = Some(loaded.clone());
        });
        result
    }

    pub async fn update(&self, draft: &ProfileDraft) -> SyncResult<Profile> {
        if let Err(e) = draft.validate() {
            self.state.reject("update profile", &e);
            return Err(e);
        }

        self.state.begin();
        let result = fetch::<Profile>(
            &self.executor,
            ApiRequest::put(Endpoints::PROFILE).with_json(draft),
        )
        .await;
        self.state.finish("update profile", &result, |profile, updated| {
            *profile = Some(updated.clone());
        });

        if result.is_ok() {
            info!("Updated profile");
        }
        result
    }

    pub fn reset(&self) {
        self.state.reset(None);
    }
}
