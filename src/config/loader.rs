//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles YAML file discovery,
//! environment detection, and base/overlay merging.

use super::error::{ConfigResult, ConfigurationError};
use super::FlowstateConfig;
use crate::constants::{CONFIG_DIR_VAR, ENV_VAR};
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const BASE_FILE: &str = "base.yaml";
const ENVIRONMENTS_DIR: &str = "environments";
const DEFAULT_CONFIG_DIR: &str = "config/flowstate";

/// Loaded configuration plus the context it was loaded under
pub struct ConfigManager {
    config: FlowstateConfig,
    environment: String,
    config_directory: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration with an explicit environment.
    ///
    /// Useful for tests that must not mutate process-wide environment
    /// variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let directory = config_dir.or_else(Self::discover_config_directory);

        let config = match &directory {
            Some(dir) => Self::load_merged(dir, environment)?,
            None => {
                // No config tree on disk; run on compiled defaults
                warn!(
                    environment = environment,
                    "no configuration directory found, using built-in defaults"
                );
                FlowstateConfig::default()
            }
        };

        config.validate()?;

        debug!(
            environment = environment,
            directory = ?directory,
            "configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: directory,
        }))
    }

    /// Construct directly from an in-memory config (test support)
    pub fn from_config(config: FlowstateConfig, environment: &str) -> ConfigResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self {
            config,
            environment: environment.to_string(),
            config_directory: None,
        }))
    }

    pub fn config(&self) -> &FlowstateConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> Option<&Path> {
        self.config_directory.as_deref()
    }

    /// Detect the runtime environment from conventional variables
    pub fn detect_environment() -> String {
        env::var(ENV_VAR)
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn discover_config_directory() -> Option<PathBuf> {
        if let Ok(dir) = env::var(CONFIG_DIR_VAR) {
            let path = PathBuf::from(dir);
            if path.is_dir() {
                return Some(path);
            }
        }

        let candidate = PathBuf::from(DEFAULT_CONFIG_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        None
    }

    /// Read base.yaml, then overlay environments/<env>.yaml when present
    fn load_merged(directory: &Path, environment: &str) -> ConfigResult<FlowstateConfig> {
        let base_path = directory.join(BASE_FILE);
        let mut merged = Self::read_yaml(&base_path)?;

        let overlay_path = directory
            .join(ENVIRONMENTS_DIR)
            .join(format!("{environment}.yaml"));
        if overlay_path.is_file() {
            let overlay = Self::read_yaml(&overlay_path)?;
            merge_yaml(&mut merged, overlay);
        }

        serde_yaml::from_value(merged).map_err(|source| ConfigurationError::Parse {
            path: base_path,
            source,
        })
    }

    fn read_yaml(path: &Path) -> ConfigResult<YamlValue> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigurationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Recursively merge `overlay` into `base`; overlay scalars win
fn merge_yaml(base: &mut YamlValue, overlay: YamlValue) {
    match (base, overlay) {
        (YamlValue::Mapping(base_map), YamlValue::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay_value) => *base_slot = overlay_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlay_scalars_win() {
        let mut base: YamlValue = serde_yaml::from_str(
            "web:\n  bind_address: \"0.0.0.0:8003\"\n  request_timeout_ms: 30000\n",
        )
        .unwrap();
        let overlay: YamlValue =
            serde_yaml::from_str("web:\n  bind_address: \"127.0.0.1:9000\"\n").unwrap();

        merge_yaml(&mut base, overlay);
        let config: FlowstateConfig = serde_yaml::from_value(base).unwrap();
        assert_eq!(config.web.bind_address, "127.0.0.1:9000");
        assert_eq!(config.web.request_timeout_ms, 30000);
    }

    #[test]
    fn test_merge_preserves_untouched_sections() {
        let mut base: YamlValue =
            serde_yaml::from_str("events:\n  channel_capacity: 64\n").unwrap();
        let overlay: YamlValue =
            serde_yaml::from_str("telemetry:\n  log_level: \"debug\"\n").unwrap();

        merge_yaml(&mut base, overlay);
        let config: FlowstateConfig = serde_yaml::from_value(base).unwrap();
        assert_eq!(config.events.channel_capacity, 64);
        assert_eq!(config.telemetry.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_detect_environment_defaults_to_development() {
        // Only meaningful when the variables are unset in the test runner
        if env::var(ENV_VAR).is_err() && env::var("APP_ENV").is_err() {
            assert_eq!(ConfigManager::detect_environment(), "development");
        }
    }
}
