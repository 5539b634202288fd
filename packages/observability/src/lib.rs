//! # Observability
//!
//! Structured logging setup for the Quill client.
//!
//! Binaries call [`init_with_config`] once at startup and use the standard
//! `tracing` macros everywhere else. Library crates never install a
//! subscriber themselves.
//!
//! Log lines are written as JSONL to a single file (by default
//! `~/.quill/logs/dev.jsonl`), optionally mirrored to stderr in compact form:
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "cli".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! tracing::info!("ready");
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

pub use file_sink::{FileLogWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli"). Included in every log line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// JSONL log file path. When `None`, only the stderr layer is installed.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with custom configuration.
///
/// Installing a subscriber twice is a no-op. If the log file cannot be
/// opened, logging continues on stderr only.
pub fn init_with_config(config: LogConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let env_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let mut open_error = None;
    let json_layer = match config.log_path.as_ref() {
        Some(path) => match FileLogWriter::new(path) {
            Ok(writer) => Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                    .with_filter(env_filter()),
            ),
            Err(e) => {
                open_error = Some((path.clone(), e));
                None
            }
        },
        None => None,
    };

    // Without a file sink, stderr is the only place logs can go.
    let stderr_enabled = config.also_stderr || json_layer.is_none();
    let stderr_layer = stderr_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter())
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }

    match (open_error, config.log_path.as_ref()) {
        (Some((path, e)), _) => tracing::warn!(
            log_path = %path.display(),
            error = %e,
            "failed to open log file, logging to stderr only"
        ),
        (None, Some(path)) => tracing::debug!(
            service = %config.service_name,
            log_path = %path.display(),
            "observability initialized"
        ),
        (None, None) => {}
    }
}
