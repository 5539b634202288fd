//! Authentication commands.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn value_or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}

/// Login with username and password.
pub async fn login(ctx: &Context, username: Option<String>, format: &OutputFormat) -> Result<()> {
    let username = value_or_prompt(username, "Username")?;
    if username.is_empty() {
        output::print_error("Username is required", format);
        return Ok(());
    }

    // Prompt for password (hidden)
    let password = rpassword::prompt_password("Password: ")?;

    if let OutputFormat::Text = format {
        println!("Logging in...");
    }
    ctx.session.login(&username, &password).await?;
    output::print_success(&format!("Logged in as {}", username), format);
    Ok(())
}

/// Create an account and log in.
pub async fn register(
    ctx: &Context,
    username: Option<String>,
    email: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let username = value_or_prompt(username, "Username")?;
    let email = value_or_prompt(email, "Email")?;
    let password = rpassword::prompt_password("Password: ")?;

    ctx.session.register(&username, &email, &password).await?;
    output::print_success(&format!("Registered and logged in as {}", username), format);
    Ok(())
}

/// Logout and clear session.
pub async fn logout(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.session.logout().await?;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Check authentication status.
pub async fn status(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let state = ctx.session.state();
    let api_url = &ctx.config.api_base_url;

    match format {
        OutputFormat::Text => {
            output::print_row("Session", &format!("{:?}", state));
            output::print_row("API", api_url);
            output::print_row("Session file", &ctx.paths.session_file().display().to_string());
        }
        OutputFormat::Json => {
            output::print_json(&serde_json::json!({
                "state": state,
                "logged_in": state.is_authenticated(),
                "api_base_url": api_url,
            }));
        }
    }
    Ok(())
}
