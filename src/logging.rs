//! # Structured Logging Module
//!
//! Environment-aware structured logging with console output and an
//! optional JSON file layer for debugging async workflow replays.

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Idempotent; safe to call from tests and binaries alike. When
/// `FLOWSTATE_LOG_DIR` is set, a JSON file layer is added alongside the
/// console layer.
pub fn init_structured_logging() {
    init_structured_logging_with_level(None);
}

/// Initialize logging with an explicit level override from configuration
pub fn init_structured_logging_with_level(level_override: Option<&str>) {
    let level = level_override
        .map(str::to_string)
        .unwrap_or_else(|| default_log_level(&get_environment()));

    LOGGER_INITIALIZED.get_or_init(|| {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_filter(EnvFilter::new(level.clone()));

        let file_layer = std::env::var("FLOWSTATE_LOG_DIR").ok().map(|dir| {
            let log_dir = PathBuf::from(dir);
            if !log_dir.exists() {
                // Fall through to the appender error path if this fails
                let _ = fs::create_dir_all(&log_dir);
            }
            let file_name = format!("flowstate.{}.json.log", process::id());
            let appender = tracing_appender::rolling::never(&log_dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // Keep the flush guard alive for the process lifetime
            std::mem::forget(guard);

            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(level.clone()))
        });

        let subscriber = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        // A global subscriber may already exist (e.g. in test harnesses)
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        } else {
            tracing::info!(
                pid = process::id(),
                level = %level,
                "🔧 STRUCTURED LOGGING: initialized"
            );
        }
    });
}

/// Current environment from environment variables
fn get_environment() -> String {
    std::env::var(crate::constants::ENV_VAR)
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Log level based on environment
fn default_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
