//! Profile commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use blog_sync::{Profile, ProfileController, ProfileDraft};

fn print_profile(profile: &Profile, format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            output::print_heading("Profile");
            output::print_row("Username", &profile.username);
            output::print_row("Email", &profile.email);
        }
        OutputFormat::Json => output::print_json(profile),
    }
}

/// Show the signed-in user's profile.
pub async fn profile_show(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_session()?;
    let controller = ProfileController::new(ctx.executor());
    let profile = controller
        .load()
        .await
        .map_err(|e| anyhow!(e.user_message("load profile")))?;
    print_profile(&profile, format);
    Ok(())
}

/// Update username and email.
pub async fn profile_update(
    ctx: &Context,
    username: String,
    email: String,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_session()?;
    let controller = ProfileController::new(ctx.executor());
    let profile = controller
        .update(&ProfileDraft::new(username, email))
        .await
        .map_err(|e| anyhow!(e.user_message("update profile")))?;
    print_profile(&profile, format);
    Ok(())
}
