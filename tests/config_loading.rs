//! Figment layering: file values, environment overrides, validation.

use std::io::Write;

use ndskit::{ConfigError, NdsKitConfig, OutputFormat};
use serial_test::serial;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn clear_env() {
    for name in [
        "NDSKIT_RESOLVER__DEFAULT_HOST",
        "NDSKIT_RESOLVER__DEFAULT_PORT",
        "NDSKIT_LOGGING__LEVEL",
        "NDSKIT_LOGGING__FORMAT",
    ] {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    clear_env();
    let file = write_config(
        r#"
[resolver]
default_host = "nds.example.org"
lookback_secs = 3600

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = NdsKitConfig::load_from(file.path()).unwrap();
    assert_eq!(config.resolver.default_host, "nds.example.org");
    assert_eq!(config.resolver.lookback_secs, 3600);
    // untouched keys keep their defaults
    assert_eq!(config.resolver.default_port, 31200);
    assert_eq!(config.resolver.primary_env, "NDSSERVER");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, OutputFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = write_config(
        r#"
[resolver]
default_host = "nds.example.org"
default_port = 1000
"#,
    );
    std::env::set_var("NDSKIT_RESOLVER__DEFAULT_PORT", "31201");
    std::env::set_var("NDSKIT_LOGGING__FORMAT", "pretty");

    let config = NdsKitConfig::load_from(file.path());
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.resolver.default_host, "nds.example.org");
    assert_eq!(config.resolver.default_port, 31201);
    assert_eq!(config.logging.format, OutputFormat::Pretty);
}

#[test]
#[serial]
fn test_malformed_file_is_reported() {
    clear_env();
    let file = write_config("[resolver]\ndefault_port = \"not a port\"\n");
    let err = NdsKitConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
#[serial]
fn test_validation_after_load() {
    clear_env();
    let file = write_config("[logging]\nlevel = \"loud\"\n");
    let config = NdsKitConfig::load_from(file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("loud"));
}
