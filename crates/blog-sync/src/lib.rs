//! Posts, comments and profile kept in sync with the blog API.
//!
//! Controllers confirm every mutation with the server before touching local
//! state, and publish their state on a watch channel.

mod api;
mod comments;
mod error;
mod models;
mod posts;
mod profile;
mod state;

pub use comments::{CommentThread, CommentsController, CommentsState};
pub use error::{SyncError, SyncResult};
pub use models::{Comment, CommentDraft, CommentId, Post, PostDraft, PostId, Profile, ProfileDraft};
pub use posts::{PostsController, PostsState};
pub use profile::{ProfileController, ProfileState};
pub use state::Tracked;
