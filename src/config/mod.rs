//! # Configuration System
//!
//! YAML-based configuration with environment overlays. A base file
//! provides the full structure; an optional per-environment file
//! overrides individual keys. Validation is explicit: a bad value fails
//! loading instead of being silently replaced.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use flowstate_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let bind = manager.config().web.bind_address.clone();
//! let capacity = manager.config().events.channel_capacity;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring flowstate YAML files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FlowstateConfig {
    /// Web API and dashboard stream settings
    pub web: WebConfig,

    /// Event store backend selection and bounds
    pub event_store: EventStoreConfig,

    /// Database connection settings for the postgres backend
    pub database: DatabaseConfig,

    /// Event publisher settings
    pub events: EventsConfig,

    /// Logging overrides
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub request_timeout_ms: u64,
    /// Interval between dashboard keepalive frames
    pub dashboard_push_interval_ms: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: defaults::BIND_ADDRESS.to_string(),
            request_timeout_ms: defaults::REQUEST_TIMEOUT_MS,
            dashboard_push_interval_ms: defaults::DASHBOARD_PUSH_INTERVAL_MS,
        }
    }
}

/// Which event store implementation backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStoreConfig {
    pub backend: StoreBackend,
    pub max_events_per_workflow: u64,
}

impl Default for EventStoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            max_events_per_workflow: defaults::MAX_EVENTS_PER_WORKFLOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool: u32,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool: defaults::DATABASE_POOL_SIZE,
            connect_timeout_seconds: defaults::DATABASE_CONNECT_TIMEOUT_SECONDS,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: defaults::EVENT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Overrides the environment-derived log level when set
    pub log_level: Option<String>,
}

impl FlowstateConfig {
    /// Database url, preferring the conventional environment variable
    pub fn database_url(&self) -> Option<String> {
        std::env::var(crate::constants::DATABASE_URL_VAR)
            .ok()
            .or_else(|| self.database.url.clone())
    }

    /// Validate cross-field invariants after loading
    pub fn validate(&self) -> ConfigResult<()> {
        if self.web.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigurationError::Invalid(format!(
                "web.bind_address is not a valid socket address: {}",
                self.web.bind_address
            )));
        }
        if self.web.dashboard_push_interval_ms == 0 {
            return Err(ConfigurationError::Invalid(
                "web.dashboard_push_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.events.channel_capacity == 0 {
            return Err(ConfigurationError::Invalid(
                "events.channel_capacity must be greater than zero".to_string(),
            ));
        }
        if self.event_store.max_events_per_workflow == 0 {
            return Err(ConfigurationError::Invalid(
                "event_store.max_events_per_workflow must be greater than zero".to_string(),
            ));
        }
        if self.event_store.backend == StoreBackend::Postgres && self.database_url().is_none() {
            return Err(ConfigurationError::Invalid(
                "event_store.backend is postgres but no database url is configured".to_string(),
            ));
        }
        Ok(())
    }
}
