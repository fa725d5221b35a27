//! Tests for configuration loading

use std::fs;

use tempfile::TempDir;

use crate::Result;
use crate::config::Config;

#[test]
fn test_missing_file_yields_defaults() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load(&temp_dir.path().join("config.json"))?;
    assert_eq!(config, Config::default());
    assert_eq!(config.global_shortcut, "<Super>space");
    assert_eq!(config.default_mode, "Launcher");
    assert_eq!(config.launcher.max_results, 10);
    Ok(())
}

#[test]
fn test_partial_config_keeps_defaults() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, r#"{ "globalShortcut": "<Control><Alt>space" }"#).unwrap();

    let config = Config::load(&config_path)?;
    assert_eq!(config.global_shortcut, "<Control><Alt>space");
    assert_eq!(config.launcher.max_results, 10);
    assert!(config.ai.vertex_key().is_none());
    Ok(())
}

#[test]
fn test_full_config() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    let full_config = r#"{
        "globalShortcut": "<Super>b",
        "defaultMode": "Clipboard History",
        "launcher": { "maxResults": 25 },
        "ai": { "vertexApiKey": "vx", "openrouterApiKey": "or" }
    }"#;
    fs::write(&config_path, full_config).unwrap();

    let config = Config::load(&config_path)?;
    assert_eq!(config.global_shortcut, "<Super>b");
    assert_eq!(config.default_mode, "Clipboard History");
    assert_eq!(config.launcher.max_results, 25);
    assert_eq!(config.ai.vertex_key(), Some("vx"));
    assert_eq!(config.ai.openrouter_key(), Some("or"));
    Ok(())
}

#[test]
fn test_invalid_json_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, "{ invalid json ]").unwrap();

    assert!(Config::load(&config_path).is_err());
    assert_eq!(Config::load_or_default(&config_path), Config::default());
}

#[test]
fn test_reload_picks_up_changes() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.json");

    fs::write(&config_path, r#"{ "launcher": { "maxResults": 5 } }"#).unwrap();
    assert_eq!(Config::load(&config_path)?.launcher.max_results, 5);

    fs::write(&config_path, r#"{ "launcher": { "maxResults": 8 } }"#).unwrap();
    assert_eq!(Config::load(&config_path)?.launcher.max_results, 8);
    Ok(())
}

#[test]
fn test_round_trip_serialization_uses_camel_case() {
    let json = serde_json::to_string(&Config::default()).unwrap();
    assert!(json.contains("globalShortcut"));
    assert!(json.contains("maxResults"));
}
