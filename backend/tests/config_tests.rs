mod support;

use std::io::Write;

use people_counter::config::DashboardConfig;
use people_counter::error::ConfigError;
use support::with_scoped_env;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_file() {
    let file = write_config(
        r#"
[devices]
inside = "North"
outside = "South"

[[festival.editions]]
year = 2026
friday = "2026-07-31"
saturday = "2026-08-01"
"#,
    );
    let config = DashboardConfig::from_file(file.path()).unwrap();
    assert_eq!(config.devices.inside, "North");
    assert!(config.festival.edition(2026).is_some());
    assert_eq!(config.display.timezone, "Europe/Brussels");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DashboardConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_shipped_sample_config_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/counter.toml");
    let config = DashboardConfig::from_file(path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.festival.editions().count(), 2);
    assert_eq!(config.display.table_rows, 50);
}

#[test]
fn test_env_overrides() {
    with_scoped_env(
        &[
            ("COUNTER_ENDPOINT", Some("http://localhost:9000/grouped")),
            ("COUNTER_TIMEZONE", Some("UTC")),
            ("COUNTER_REFRESH_SECS", Some("5")),
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some("3000")),
        ],
        || {
            let mut config = DashboardConfig::default();
            config.apply_env_overrides().unwrap();
            assert_eq!(config.upstream.endpoint, "http://localhost:9000/grouped");
            assert_eq!(config.display.timezone, "UTC");
            assert_eq!(config.upstream.refresh_interval_secs, 5);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 3000);
        },
    );
}

#[test]
fn test_invalid_port_override() {
    with_scoped_env(&[("PORT", Some("eighty"))], || {
        let mut config = DashboardConfig::default();
        let err = config.apply_env_overrides().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "server.port", .. }));
    });
}

#[test]
fn test_load_from_explicit_path_validates() {
    let file = write_config("[display]\ntimezone = \"Nowhere/Special\"\n");
    let path = file.path().to_string_lossy().to_string();
    with_scoped_env(
        &[
            ("COUNTER_CONFIG", Some(path.as_str())),
            ("COUNTER_TIMEZONE", None),
        ],
        || {
            let err = DashboardConfig::load().unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "display.timezone", .. }));
        },
    );
}
