use std::fs;
use std::time::Duration;

use wincache_core::model::{SelectionMode, Sort};
use wincache_core::{CacheType, ConfigError, StoreConfig, StoreOptions, WindowStore};

#[test]
fn loads_store_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wincache.toml");
    fs::write(
        &path,
        r#"
selection = "multi"

[pagination]
page_size = 25
pages_to_cache = 2
cache_type = "partial"

[filter]
debounce_ms = 250

[sort]
field = "name"
direction = "asc"
"#,
    )
    .unwrap();

    let config = StoreConfig::load(&path).unwrap();
    let pagination = config.pagination.unwrap();
    assert_eq!(pagination.page_size, 25);
    assert_eq!(pagination.pages_to_cache, 2);
    assert_eq!(pagination.cache_type, CacheType::Partial);
    assert_eq!(config.filter.debounce(), Duration::from_millis(250));
    assert_eq!(config.sort.default_sort(), Sort::asc("name"));
    assert!(!config.sort.remote);
    assert_eq!(config.selection, SelectionMode::Multi);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = StoreConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[pagination\npage_size = 1").unwrap();
    let err = StoreConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn unknown_cache_type_is_rejected() {
    let err = StoreConfig::from_toml_str("[pagination]\ncache_type = \"ring\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn store_refuses_invalid_config() {
    let config = StoreConfig::paginated(10, 0, CacheType::Grow);
    let err = WindowStore::<wincache_core::Record, serde_json::Value>::new(config, StoreOptions::new())
        .unwrap_err();
    assert!(err.to_string().contains("pages_to_cache"));
}
