use std::io::Write;

use linebook::error::{ConfigError, Error};
use linebook::infrastructure::config::Config;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn config_loads_every_section() {
    let file = write_temp_config(
        r#"
[venue]
base_url = "https://api.example.com/v1"
timeout_secs = 10

[logging]
level = "debug"
format = "json"

[requests]
max_concurrency = 5
max_attempts = 4

[catalog]
poll_interval_secs = 60
fetch_delay_ms = 0
tournament_ids = ["t1", "t2"]

[orders]
interval_secs = 30
page_limit = 25
event_id = "e1"
"#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.venue.timeout_secs, 10);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.requests.max_concurrency, 5);
    assert_eq!(config.requests.backoff_base_ms, 500);
    assert_eq!(config.catalog.tournament_ids, vec!["t1", "t2"]);
    assert_eq!(config.orders.page_limit, 25);
    assert_eq!(config.orders.event_id.as_ref().map(|e| e.as_str()), Some("e1"));
    assert_eq!(config.orders.window_days, 7);
}

#[test]
fn config_rejects_missing_base_url() {
    let file = write_temp_config("[logging]\nlevel = \"info\"\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::MissingField { field: "base_url" })) => {}
        Err(err) => panic!("Expected missing base_url, got {err}"),
        Ok(_) => panic!("Expected missing base_url to be rejected"),
    }
}

#[test]
fn config_rejects_zero_concurrency() {
    let file = write_temp_config(
        r#"
[venue]
base_url = "https://api.example.com"

[requests]
max_concurrency = 0
"#,
    );

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "max_concurrency",
            ..
        }))
    ));
}

#[test]
fn config_rejects_malformed_toml() {
    let file = write_temp_config("[venue\nbase_url = ");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn config_reports_unreadable_file() {
    assert!(matches!(
        Config::load("/nonexistent/linebook/config.toml"),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}
