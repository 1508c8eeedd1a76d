//! Configuration loading and merging tests.

use flowstate_core::config::{ConfigManager, ConfigurationError, FlowstateConfig, StoreBackend};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, base: &str, overlays: &[(&str, &str)]) {
    fs::write(dir.path().join("base.yaml"), base).unwrap();
    if !overlays.is_empty() {
        let env_dir = dir.path().join("environments");
        fs::create_dir_all(&env_dir).unwrap();
        for (name, content) in overlays {
            fs::write(env_dir.join(format!("{name}.yaml")), content).unwrap();
        }
    }
}

#[test]
fn test_base_only_load() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "web:\n  bind_address: \"127.0.0.1:8010\"\nevents:\n  channel_capacity: 32\n",
        &[],
    );

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap();
    assert_eq!(manager.config().web.bind_address, "127.0.0.1:8010");
    assert_eq!(manager.config().events.channel_capacity, 32);
    assert_eq!(manager.environment(), "test");
}

#[test]
fn test_environment_overlay_wins() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "web:\n  bind_address: \"0.0.0.0:8003\"\n  request_timeout_ms: 30000\n",
        &[(
            "production",
            "web:\n  bind_address: \"0.0.0.0:80\"\ntelemetry:\n  log_level: \"info\"\n",
        )],
    );

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "production")
            .unwrap();
    assert_eq!(manager.config().web.bind_address, "0.0.0.0:80");
    // Untouched keys survive the merge
    assert_eq!(manager.config().web.request_timeout_ms, 30000);
    assert_eq!(
        manager.config().telemetry.log_level.as_deref(),
        Some("info")
    );
}

#[test]
fn test_missing_overlay_falls_back_to_base() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "events:\n  channel_capacity: 8\n", &[]);

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "staging")
            .unwrap();
    assert_eq!(manager.config().events.channel_capacity, 8);
}

#[test]
fn test_missing_base_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
    assert!(matches!(result, Err(ConfigurationError::FileRead { .. })));
}

#[test]
fn test_unparseable_yaml_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "web: [not, a, mapping\n", &[]);

    let result =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
    assert!(matches!(result, Err(ConfigurationError::Parse { .. })));
}

#[test]
fn test_validation_failures_stop_loading() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "events:\n  channel_capacity: 0\n", &[]);

    let result =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test");
    assert!(matches!(result, Err(ConfigurationError::Invalid(_))));
}

#[test]
fn test_backend_selection_parses() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        "event_store:\n  backend: postgres\ndatabase:\n  url: \"postgres://localhost/flowstate\"\n",
        &[],
    );

    let manager =
        ConfigManager::load_from_directory_with_env(Some(dir.path().to_path_buf()), "test")
            .unwrap();
    assert_eq!(
        manager.config().event_store.backend,
        StoreBackend::Postgres
    );
}

#[test]
fn test_in_memory_config_for_tests() {
    let manager = ConfigManager::from_config(FlowstateConfig::default(), "test").unwrap();
    assert_eq!(manager.config_directory(), None);
    assert_eq!(manager.config().event_store.backend, StoreBackend::Memory);
}
