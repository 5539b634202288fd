//! Posts collection kept in sync with the server.

use crate::api::{fetch, send};
use crate::state::StateCell;
use crate::{Post, PostDraft, PostId, SyncResult, Tracked};
use auth_engine::{ApiRequest, AuthenticatedExecutor, Endpoints};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Posts in server order, with operation status.
pub type PostsState = Tracked<Vec<Post>>;

/// Lists, searches, creates, updates and deletes posts.
///
/// Local state changes only after the server confirms an operation, so the
/// collection never holds a post the server has not acknowledged.
pub struct PostsController {
    executor: Arc<AuthenticatedExecutor>,
    state: StateCell<Vec<Post>>,
}

impl PostsController {
    pub fn new(executor: Arc<AuthenticatedExecutor>) -> Self {
        Self {
            executor,
            state: StateCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> PostsState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PostsState> {
        self.state.subscribe()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.read(Vec::clone)
    }

    /// Replace the collection with the server's posts, or with search
    /// results when `query` is not blank.
    pub async fn list(&self, query: Option<&str>) -> SyncResult<Vec<Post>> {
        let request = match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => ApiRequest::get(Endpoints::SEARCH).with_query("q", q),
            None => ApiRequest::get(Endpoints::POSTS),
        };

        self.state.begin();
        let result = fetch::<Vec<Post>>(&self.executor, Ok(request)).await;
        self.state.finish("load posts", &result, |posts, fetched| {
            *posts = fetched.clone();
        });

        if let Ok(posts) = &result {
            debug!(count = posts.len(), "Loaded posts");
        }
        result
    }

    /// Create a post and prepend the server's copy.
    pub async fn create(&self, draft: &PostDraft) -> SyncResult<Post> {
        if let Err(e) = draft.validate() {
            self.state.reject("create post", &e);
            return Err(e);
        }

        self.state.begin();
        let result = fetch::<Post>(
            &self.executor,
            ApiRequest::post(Endpoints::POSTS).with_json(draft),
        )
        .await;
        self.state.finish("create post", &result, |posts, created| {
            posts.insert(0, created.clone());
        });

        if let Ok(post) = &result {
            info!(post_id = %post.id, "Created post");
        }
        result
    }

    /// Update a post and replace the matching entry in place.
    pub async fn update(&self, id: PostId, draft: &PostDraft) -> SyncResult<Post> {
        if let Err(e) = draft.validate() {
            self.state.reject("update post", &e);
            return Err(e);
        }

        self.state.begin();
        let result = fetch::<Post>(
            &self.executor,
            ApiRequest::put(Endpoints::post(id)).with_json(draft),
        )
        .await;
        self.state.finish("update post", &result, |posts, updated| {
            if let Some(slot) = posts.iter_mut().find(|p| p.id == id) {
                *slot = updated.clone();
            }
        });

        if result.is_ok() {
            info!(post_id = %id, "Updated post");
        }
        result
    }

    /// Delete a post and drop it from the collection.
    pub async fn remove(&self, id: PostId) -> SyncResult<()> {
        self.state.begin();
        let result = send(&self.executor, Ok(ApiRequest::delete(Endpoints::post(id)))).await;
        self.state.finish("delete post", &result, |posts, _| {
            posts.retain(|p| p.id != id);
        });

        if result.is_ok() {
            info!(post_id = %id, "Deleted post");
        }
        result
    }

    /// Forget all posts, e.g. after logout.
    pub fn reset(&self) {
        self.state.reset(Vec::new());
    }
}
