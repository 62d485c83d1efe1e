/*!
 * Tests for configuration loading
 */

use anyhow::Result;

use crate::common;
use subtran::app_config::{Config, LogLevel};

#[test]
fn test_loadOrDefault_withMissingFile_shouldUseDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let config = Config::load_or_default(temp_dir.path().join("subtran.json"))?;

    assert_eq!(config, Config::default());
    assert!(!temp_dir.path().join("subtran.json").exists());
    Ok(())
}

#[test]
fn test_fromFile_withPartialConfig_shouldOverrideGivenFields() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "subtran.json",
        r#"{ "target_language": "fr", "model": "llama3.2:3b", "context_window_size": 5, "log_level": "warn" }"#,
    )?;

    let config = Config::load_or_default(&path)?;

    assert_eq!(config.target_language, "fr");
    assert_eq!(config.model, "llama3.2:3b");
    assert_eq!(config.context_window_size, 5);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert_eq!(config.retry_pause_ms, 500);
    config.validate()?;
    Ok(())
}

#[test]
fn test_fromFile_withInvalidJson_shouldFailWithPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    let error = Config::from_file(&path).unwrap_err();

    assert!(format!("{:#}", error).contains("broken.json"));
    Ok(())
}

#[test]
fn test_serialize_shouldRoundTripThroughJson() -> Result<()> {
    let config = Config {
        temperature: Some(0.2),
        ..common::fast_config()
    };

    let json = serde_json::to_string_pretty(&config)?;
    let parsed: Config = serde_json::from_str(&json)?;

    assert_eq!(parsed, config);
    Ok(())
}
