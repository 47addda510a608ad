//! Integration tests for Settings config loading with layered precedence.
//!
//! Precedence: defaults < global file < local file < BREAKERTREE_* env vars.
//! These tests use temp directories only and never set env vars.

use std::fs;

use tempfile::TempDir;

use breakertree::config::{local_config_path, Settings};
use breakertree::domain::DEFAULT_KIND;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_local_config_with_relative_store_when_load_then_store_is_anchored_at_dir() {
    // Arrange
    let dir = TempDir::new().unwrap();
    write_config(&dir, ".breakertree.toml", "store_path = \"panel/nodes.toml\"\n");

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.store_path, dir.path().join("panel/nodes.toml"));
}

#[test]
fn given_global_and_local_when_load_from_then_local_wins_per_field() {
    let dir = TempDir::new().unwrap();
    let global = write_config(
        &dir,
        "global.toml",
        "kind = \"relay\"\nbatch_threads = 4\nstore_path = \"/srv/global.toml\"\n",
    );
    let local = write_config(&dir, "local.toml", "store_path = \"/srv/local.toml\"\n");

    let settings = Settings::load_from(Some(&global), Some(&local)).expect("load settings");

    assert_eq!(settings.store_path, std::path::PathBuf::from("/srv/local.toml"));
    // not overridden locally
    assert_eq!(settings.kind, "relay");
    assert_eq!(settings.batch_threads, Some(4));
}

#[test]
fn given_no_local_config_when_load_then_defaults_apply() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load_from(None, None).expect("load settings");

    assert_eq!(settings.kind, DEFAULT_KIND);
    assert!(!local_config_path(dir.path()).exists());
}

#[test]
fn given_zero_batch_threads_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = write_config(&dir, "local.toml", "batch_threads = 0\n");

    let err = Settings::load_from(None, Some(&local)).unwrap_err();

    assert!(err.to_string().contains("batch_threads"));
}

#[test]
fn given_malformed_toml_when_load_then_config_error_names_file() {
    let dir = TempDir::new().unwrap();
    let local = write_config(&dir, "local.toml", "kind = [unterminated\n");

    let err = Settings::load_from(None, Some(&local)).unwrap_err();

    assert!(err.to_string().contains("local.toml"));
}

#[test]
fn given_settings_when_rendering_toml_then_parses_back() {
    let settings = Settings::default();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
