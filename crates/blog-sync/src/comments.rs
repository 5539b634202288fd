//! Comments of a single post.

use crate::api::{fetch, send};
use crate::state::StateCell;
use crate::{Comment, CommentDraft, CommentId, PostId, SyncResult, Tracked};
use auth_engine::{ApiRequest, AuthenticatedExecutor, Endpoints};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// The post a controller is bound to and its comments, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub post_id: PostId,
    pub comments: Vec<Comment>,
}

impl CommentThread {
    fn empty(post_id: PostId) -> Self {
        Self {
            post_id,
            comments: Vec::new(),
        }
    }
}

pub type CommentsState = Tracked<CommentThread>;

/// Comment list bound to one post. Each instance owns its own state.
///
/// Results that arrive after the controller was rebound to another post
/// are dropped.
pub struct CommentsController {
    executor: Arc<AuthenticatedExecutor>,
    state: StateCell<CommentThread>,
}

impl CommentsController {
    /// Controller for `post_id` with nothing loaded yet.
    pub fn new(executor: Arc<AuthenticatedExecutor>, post_id: PostId) -> Self {
        Self {
            executor,
            state: StateCell::new(CommentThread::empty(post_id)),
        }
    }

    /// Controller for `post_id` with its comments loaded. A failed load is
    /// reported through `last_error`.
    pub async fn bind(executor: Arc<AuthenticatedExecutor>, post_id: PostId) -> Self {
        let controller = Self::new(executor, post_id);
        // Failure is already recorded in the state.
        let _ = controller.list().await;
        controller
    }

    pub fn post_id(&self) -> PostId {
        self.state.read(|thread| thread.post_id)
    }

    pub fn state(&self) -> CommentsState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CommentsState> {
        self.state.subscribe()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.read(|thread| thread.comments.clone())
    }

    /// Bind to `post_id` and load its comments. Switching posts clears the
    /// previous post's comments first.
    pub async fn rebind(&self, post_id: PostId) -> SyncResult<Vec<Comment>> {
        if self.post_id() != post_id {
            debug!(post_id = %post_id, "Rebinding comments");
            self.state.reset(CommentThread::empty(post_id));
        }
        self.list().await
    }

    /// Replace the comments with the server's list for the bound post.
    pub async fn list(&self) -> SyncResult<Vec<Comment>> {
        let post_id = self.post_id();

        self.state.begin();
        let result = fetch::<Vec<Comment>>(
            &self.executor,
            Ok(ApiRequest::get(Endpoints::comments(post_id))),
        )
        .await;
        self.state.finish_where(
            "load comments",
            &result,
            |thread| thread.post_id == post_id,
            |thread, fetched| thread.comments = fetched.clone(),
        );
        result
    }

    /// Add a comment to the bound post and append the server's copy.
    pub async fn add(&self, draft: &CommentDraft) -> SyncResult<Comment> {
        if let Err(e) = draft.validate() {
            self.state.reject("add comment", &e);
            return Err(e);
        }
        let post_id = self.post_id();

        self.state.begin();
        let result = fetch::<Comment>(
            &self.executor,
            ApiRequest::post(Endpoints::comments(post_id)).with_json(draft),
        )
        .await;
        self.state.finish_where(
            "add comment",
            &result,
            |thread| thread.post_id == post_id,
            |thread, created| thread.comments.push(created.clone()),
        );

        if let Ok(comment) = &result {
            info!(post_id = %post_id, comment_id = %comment.id, "Added comment");
        }
        result
    }

    /// Delete a comment of the bound post.
    pub async fn remove(&self, id: CommentId) -> SyncResult<()> {
        let post_id = self.post_id();

        self.state.begin();
        let result = send(
            &self.executor,
            Ok(ApiRequest::delete(Endpoints::comment(post_id, id))),
        )
        .await;
        self.state.finish_where(
            "delete comment",
            &result,
            |thread| thread.post_id == post_id,
            |thread, _| thread.comments.retain(|c| c.id != id),
        );

        if result.is_ok() {
            info!(post_id = %post_id, comment_id = %id, "Deleted comment");
        }
        result
    }
}
