//! Tests for `YamlConfigStore` on disk.
//!
//! These tests mutate `LAMBDA_EFS_CONFIG` and are serialized with
//! `serial_test` so they never observe each other's value.

#![allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]

use std::path::PathBuf;

use lambda_efs_cli::application::ports::ConfigStore;
use lambda_efs_cli::domain::StackVariant;
use lambda_efs_cli::infra::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, YamlConfigStore};
use serial_test::serial;
use tempfile::TempDir;

fn point_config_at(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("nested").join("lambda-efs.yaml");
    // SAFETY: every test touching this variable is #[serial].
    unsafe { std::env::set_var(CONFIG_PATH_ENV, &path) };
    path
}

#[test]
#[serial]
fn path_defaults_to_working_directory_file() {
    // SAFETY: see `point_config_at`.
    unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
    assert_eq!(
        YamlConfigStore.path().unwrap(),
        PathBuf::from(DEFAULT_CONFIG_FILE)
    );
}

#[test]
#[serial]
fn path_follows_env_override() {
    let dir = TempDir::new().expect("temp dir");
    let expected = point_config_at(&dir);
    assert_eq!(YamlConfigStore.path().unwrap(), expected);
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    let dir = TempDir::new().expect("temp dir");
    point_config_at(&dir);
    let config = YamlConfigStore.load().unwrap();
    assert_eq!(config.stack.name, "LambdaEfsStack");
}

#[test]
#[serial]
fn save_creates_parent_and_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let path = point_config_at(&dir);

    let mut config = YamlConfigStore.load().unwrap();
    config.set("stack.variant", "compute-only").unwrap();
    YamlConfigStore.save(&config).unwrap();

    assert!(path.exists());
    let loaded = YamlConfigStore.load().unwrap();
    assert_eq!(loaded.stack.variant, StackVariant::ComputeOnly);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
