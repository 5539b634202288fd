//! Post commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use blog_sync::{Post, PostDraft, PostId, PostsController};

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts found");
        return;
    }
    println!("{:<6} {:<30} {}", "ID", "Title", "Content");
    println!("{}", "-".repeat(90));
    for post in posts {
        println!(
            "{:<6} {:<30} {}",
            post.id,
            output::truncate(&post.title, 30),
            output::truncate(&post.content, 50)
        );
    }
}

fn print_post(post: &Post, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            output::print_heading(&post.title);
            output::print_row("ID", &post.id.to_string());
            if let Some(created_at) = post.created_at {
                output::print_row("Created", &created_at.format("%Y-%m-%d %H:%M").to_string());
            }
            println!("\n{}", post.content);
        }
        OutputFormat::Json => output::print_json(post),
    }
}

/// List posts, or search them when `query` is given.
pub async fn posts_list(ctx: &Context, query: Option<&str>, format: &OutputFormat) -> Result<()> {
    ctx.require_session()?;
    let controller = PostsController::new(ctx.executor());
    controller
        .list(query)
        .await
        .map_err(|e| anyhow!(e.user_message("load posts")))?;

    let posts = controller.posts();
    match format {
        OutputFormat::Text => print_posts(&posts),
        OutputFormat::Json => output::print_json(&posts),
    }
    Ok(())
}

/// Create a post.
pub async fn posts_create(
    ctx: &Context,
    title: String,
    content: String,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session()?;
    let controller = PostsController::new(ctx.executor());
    let post = controller
        .create(&PostDraft::new(title, content))
        .await
        .map_err(|e| anyhow!(e.user_message("create post")))?;
    print_post(&post, format);
    Ok(())
}

/// Update a post.
pub async fn posts_update(
    ctx: &Context,
    id: i64,
    title: String,
    content: String,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session()?;
    let controller = PostsController::new(ctx.executor());
    let post = controller
        .update(PostId(id), &PostDraft::new(title, content))
        .await
        .map_err(|e| anyhow!(e.user_message("update post")))?;
    print_post(&post, format);
    Ok(())
}

/// Delete a post.
pub async fn posts_delete(ctx: &Context, id: i64, format: &OutputFormat) -> Result<()> {
    ctx.require_session()?;
    let controller = PostsController::new(ctx.executor());
    controller
        .remove(PostId(id))
        .await
        .map_err(|e| anyhow!(e.user_message("delete post")))?;
    output::print_success(&format!("Post {} deleted", id), format);
    Ok(())
}
