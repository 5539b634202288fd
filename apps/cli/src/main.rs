//! Quill CLI - Command-line client for the Quill blog.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use client_config_and_utils::{init_logging, parse_level, Config, Paths};

/// Quill CLI - Sign in, write posts, and manage comments.
#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill CLI for the Quill blog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with username and password
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Create an account and log in
    Register {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Logout and clear session
    Logout,

    /// Check authentication status
    Status,

    /// Manage posts
    Posts {
        #[command(subcommand)]
        command: PostCommands,
    },

    /// Manage comments on a post
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    /// List posts
    List {
        /// Search term
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Create a post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,
        /// Post content
        #[arg(short, long)]
        content: String,
    },
    /// Update a post
    Update {
        /// Post ID
        id: i64,
        /// New title
        #[arg(short, long)]
        title: String,
        /// New content
        #[arg(short, long)]
        content: String,
    },
    /// Delete a post
    Delete {
        /// Post ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// List comments on a post
    List {
        /// Post ID
        post: i64,
    },
    /// Comment on a post
    Add {
        /// Post ID
        post: i64,
        /// Comment text
        content: String,
    },
    /// Delete a comment
    Delete {
        /// Post ID
        post: i64,
        /// Comment ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show,
    /// Update username and email
    Update {
        /// New username
        #[arg(short, long)]
        username: String,
        /// New email
        #[arg(short, long)]
        email: String,
    },
}

fn load_config() -> anyhow::Result<(Paths, Config)> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;
    Ok((paths, config))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (paths, config) = match load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            output::print_error(&e.to_string(), &cli.format);
            std::process::exit(1);
        }
    };

    let level = parse_level(cli.log_level.as_deref().unwrap_or(&config.log_level));
    // CLI output owns the terminal; logs go to the JSONL file only.
    init_logging("cli", level.as_str(), Some(&paths), false);

    let format = cli.format;
    let result = match commands::Context::open(paths, config) {
        Ok(ctx) => match cli.command {
            Commands::Login { username } => commands::login(&ctx, username, &format).await,
            Commands::Register { username, email } => {
                commands::register(&ctx, username, email, &format).await
            }
            Commands::Logout => commands::logout(&ctx, &format).await,
            Commands::Status => commands::status(&ctx, &format).await,
            Commands::Posts { command } => match command {
                PostCommands::List { query } => {
                    commands::posts_list(&ctx, query.as_deref(), &format).await
                }
                PostCommands::Create { title, content } => {
                    commands::posts_create(&ctx, title, content, &format).await
                }
                PostCommands::Update { id, title, content } => {
                    commands::posts_update(&ctx, id, title, content, &format).await
                }
                PostCommands::Delete { id } => commands::posts_delete(&ctx, id, &format).await,
            },
            Commands::Comments { command } => match command {
                CommentCommands::List { post } => {
                    commands::comments_list(&ctx, post, &format).await
                }
                CommentCommands::Add { post, content } => {
                    commands::comments_add(&ctx, post, content, &format).await
                }
                CommentCommands::Delete { post, id } => {
                    commands::comments_delete(&ctx, post, id, &format).await
                }
            },
            Commands::Profile { command } => match command {
                ProfileCommands::Show => commands::profile_show(&ctx, &format).await,
                ProfileCommands::Update { username, email } => {
                    commands::profile_update(&ctx, username, email, &format).await
                }
            },
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
