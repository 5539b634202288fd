//! Comment commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use blog_sync::{CommentDraft, CommentId, CommentsController, PostId};

/// List comments on a post.
pub async fn comments_list(ctx: &Context, post: i64, format: &OutputFormat) -> Result<()> {
    ctx.require_session()?;
    let controller = CommentsController::bind(ctx.executor(), PostId(post)).await;
    if let Some(error) = controller.state().last_error {
        return Err(anyhow!(error));
    }

    let comments = controller.comments();
    match format {
        OutputFormat::Text => {
            if comments.is_empty() {
                println!("No comments yet");
            }
            for comment in &comments {
                let author = if comment.author_name.is_empty() {
                    "unknown"
                } else {
                    comment.author_name.as_str()
                };
                let when = comment
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("[{}] {} {}", comment.id, author, when);
                println!("    {}", comment.content);
            }
        }
        OutputFormat::Json => output::print_json(&comments),
    }
    Ok(())
}

/// Comment on a post.
pub async fn comments_add(
    ctx: &Context,
    post: i64,
    content: String,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session()?;
    let controller = CommentsController::new(ctx.executor(), PostId(post));
    let comment = controller
        .add(&CommentDraft::new(content))
        .await
        .map_err(|e| anyhow!(e.user_message("add comment")))?;

    match format {
        OutputFormat::Text => {
            output::print_success(&format!("Comment {} added to post {}", comment.id, post), format)
        }
        OutputFormat::Json => output::print_json(&comment),
    }
    Ok(())
}

/// Delete a comment.
pub async fn comments_delete(ctx: &Context, post: i64, id: i64, format: &OutputFormat) -> Result<()> {
    ctx.require_session()?;
    let controller = CommentsController::new(ctx.executor(), PostId(post));
    controller
        .remove(CommentId(id))
        .await
        .map_err(|e| anyhow!(e.user_message("delete comment")))?;
    output::print_success(&format!("Comment {} deleted", id), format);
    Ok(())
}
