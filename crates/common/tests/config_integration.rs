//! Integration tests for cache configuration
//!
//! Loads `CacheMapConfig` from TOML files on disk and feeds the result to
//! `CacheMap` constructors.

#![cfg(feature = "runtime")]

use std::io::Write;
use std::time::Duration;

use sundry_common::cache::{
    CacheError, CacheMap, CacheMapConfig, ExpirationPolicy, DEFAULT_EXPIRATION_TIME,
    DEFAULT_SWEEPER_THREAD_NAME,
};
use tempfile::{NamedTempFile, TempDir};

fn write_config(contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Loads a live configuration from disk and builds a cache from it.
///
/// # Test Steps
/// 1. Write a TOML file selecting the live policy
/// 2. Load it with `CacheMapConfig::load`
/// 3. Verify every field and that the cache starts its sweeper
#[test]
fn test_load_live_config_from_file() -> anyhow::Result<()> {
    let file = write_config(
        r#"
        expiration_time_ms = 1500
        track_metrics = true
        sweeper_thread_name = "orders-sweeper"

        [policy]
        mode = "live"
        sweep_interval_ms = 250
        "#,
    )?;

    let config = CacheMapConfig::load(file.path())?;
    assert_eq!(config.expiration_time, Duration::from_millis(1500));
    assert!(config.track_metrics);
    assert_eq!(config.sweeper_thread_name, "orders-sweeper");
    assert_eq!(
        config.policy,
        ExpirationPolicy::Live { sweep_interval: Duration::from_millis(250) }
    );

    let cache = CacheMap::new(config, |key: &u32| key + 1)?;
    assert!(cache.is_live());
    assert_eq!(cache.get(&1), 2);
    Ok(())
}

/// Missing keys fall back to defaults, giving an on-access cache.
#[test]
fn test_load_partial_config_uses_defaults() -> anyhow::Result<()> {
    let file = write_config("track_metrics = true\n")?;

    let config = CacheMapConfig::load(file.path())?;
    assert_eq!(config.expiration_time, DEFAULT_EXPIRATION_TIME);
    assert_eq!(config.sweeper_thread_name, DEFAULT_SWEEPER_THREAD_NAME);
    assert_eq!(config.policy, ExpirationPolicy::OnAccess);

    let cache = CacheMap::new(config, |key: &u32| *key)?;
    assert!(!cache.is_live());
    Ok(())
}

/// A configuration written with `toml` reads back unchanged.
#[test]
fn test_saved_config_reloads() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("cache.toml");
    let original = CacheMapConfig::builder()
        .expiration_time(Duration::from_secs(45))
        .live(Duration::from_secs(3))
        .sweeper_thread_name("session-sweeper")
        .build();

    std::fs::write(&path, toml::to_string(&original)?)?;

    assert_eq!(CacheMapConfig::load(&path)?, original);
    Ok(())
}

/// A missing file is reported as an I/O error.
#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();

    let err = CacheMapConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, CacheError::ConfigIo(_)));
}

/// Malformed TOML and unknown policy modes are parse errors.
#[test]
fn test_load_malformed_file() {
    let syntax = write_config("expiration_time_ms = = 5").unwrap();
    assert!(matches!(CacheMapConfig::load(syntax.path()), Err(CacheError::ConfigParse(_))));

    let unknown_mode = write_config("[policy]\nmode = \"eager\"\n").unwrap();
    assert!(matches!(CacheMapConfig::load(unknown_mode.path()), Err(CacheError::ConfigParse(_))));
}

/// Values that parse but violate cache invariants are rejected on load.
#[test]
fn test_load_invalid_values() {
    let zero_interval = write_config("[policy]\nmode = \"live\"\nsweep_interval_ms = 0\n").unwrap();
    let err = CacheMapConfig::load(zero_interval.path()).unwrap_err();
    assert!(matches!(err, CacheError::InvalidConfig(_)));
    assert!(err.to_string().contains("sweep interval"));

    let blank_name = write_config(
        "sweeper_thread_name = \"  \"\n[policy]\nmode = \"live\"\nsweep_interval_ms = 10\n",
    )
    .unwrap();
    assert!(matches!(CacheMapConfig::load(blank_name.path()), Err(CacheError::InvalidConfig(_))));
}

/// The same invariants are enforced when a config is built in code.
#[test]
fn test_constructor_rejects_invalid_config() {
    let config = CacheMapConfig::live(Duration::from_secs(1), Duration::ZERO);

    let result = CacheMap::new(config, |key: &u8| *key);
    assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
}
