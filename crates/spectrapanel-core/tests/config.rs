use std::fs;
use std::time::Duration;

use pretty_assertions::assert_eq;
use spectrapanel_core::config::{ConfigError, PanelConfig};
use spectrapanel_core::spectral::{ChannelSet, ReferenceMode};
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = PanelConfig::default();
    assert!(config.sensor.is_development());
    assert_eq!(config.sensor.origin, None);
    assert_eq!(config.sensor.timeout(), Duration::from_secs(10));
    assert_eq!(config.channels, ChannelSet::Visible);
    assert_eq!(config.reference, ReferenceMode::Sunlight);

    let params = config.acquisition.to_parameters();
    assert_eq!(params.atime, 29);
    assert_eq!(params.astep, 3596);
    assert_eq!(params.gain_exponent, 9);
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = PanelConfig::default();
    config.sensor.origin = Some("http://192.168.1.40/".to_string());
    config.sensor.development = Some(false);
    config.acquisition.led_current_ma = 12;
    config.channels = ChannelSet::Nir;
    config.reference = ReferenceMode::Direct;

    config.save(&path).unwrap();
    let loaded = PanelConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "acquisition": { "atime": 0 }, "channels": "clear" }"#,
    )
    .unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert_eq!(config.acquisition.atime, 0);
    assert_eq!(config.acquisition.astep, 3596);
    assert_eq!(config.channels, ChannelSet::Clear);
    assert!(config.sensor.is_development());
}

#[test]
fn test_configured_origin_is_used() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "sensor": { "origin": "http://192.168.1.40/" } }"#).unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert!(!config.sensor.is_development());
    assert_eq!(
        config.sensor.endpoint().unwrap().url().as_str(),
        "http://192.168.1.40/as7341"
    );
}

#[test]
fn test_explicit_development_overrides_origin() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "sensor": { "origin": "http://192.168.1.40/", "development": true } }"#,
    )
    .unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert_eq!(
        config.sensor.endpoint().unwrap().url().as_str(),
        "http://esp32-as7341.local/as7341"
    );
}

#[test]
fn test_led_current_coerced_on_conversion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "acquisition": { "led_current_ma": 3 } }"#).unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert_eq!(config.acquisition.led_current_ma, 3);
    assert_eq!(config.acquisition.to_parameters().led_current_ma, 0);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = PanelConfig::load_or_default(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let err = PanelConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.json"));
}
