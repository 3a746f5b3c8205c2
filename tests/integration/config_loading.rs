//! Integration tests for the configuration system

use genstudio::cli::RunContext;
use genstudio::config::ConfigLoader;
use tempfile::TempDir;

#[test]
fn test_config_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("genstudio.toml");
    std::fs::write(
        &config_file,
        r#"
[server]
base_url = "https://studio.example.com/api"
request_timeout_secs = 600

[autosave]
delay_ms = 250

[history]
page_size = 24

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.server.base_url, "https://studio.example.com/api");
    assert_eq!(config.server.request_timeout_secs, 600);
    assert_eq!(config.server.connect_timeout_secs, 10);
    assert_eq!(config.autosave.delay_ms, 250);
    assert_eq!(config.history.page_size, 24);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");

    let context = RunContext::new(config).unwrap();
    assert_eq!(context.client().base_url(), "https://studio.example.com/api");
}

#[test]
fn test_invalid_server_url_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("genstudio.toml");
    std::fs::write(&config_file, "[server]\nbase_url = \"ftp://nope\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("http://"), "{}", err);
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
