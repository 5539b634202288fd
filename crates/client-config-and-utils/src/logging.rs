//! Logging initialization for client binaries.
//!
//! Thin wrapper over the observability crate: structured JSONL goes to
//! `~/.quill/logs/dev.jsonl`, optionally mirrored to stderr.

use crate::Paths;
use observability::LogConfig;

/// Initialize logging for a client binary.
///
/// * `service_name` - Name written into every log line (e.g. "cli")
/// * `level` - Default level; `RUST_LOG` takes precedence when set
/// * `paths` - Where the JSONL log file lives; `None` logs to stderr only
/// * `also_stderr` - Mirror log lines to stderr
pub fn init_logging(service_name: &str, level: &str, paths: Option<&Paths>, also_stderr: bool) {
    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path: paths.map(Paths::log_file),
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_all_variants() {
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("info"), tracing::Level::INFO);
        assert_eq!(parse_level("warn"), tracing::Level::WARN);
        assert_eq!(parse_level("warning"), tracing::Level::WARN);
        assert_eq!(parse_level("error"), tracing::Level::ERROR);
    }

    #[test]
    fn parse_level_case_insensitive_and_defaults() {
        assert_eq!(parse_level("Debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("WARNING"), tracing::Level::WARN);
        assert_eq!(parse_level(""), tracing::Level::INFO);
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
    }
}
