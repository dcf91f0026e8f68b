//! Handler configuration loaded from environment variables via `envy`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use lambda_efs_common::DEFAULT_MOUNT_PATH;
use serde::Deserialize;

/// Settings for one execution environment.
///
/// Each field maps to the upper-cased variable name:
///   - `AWS_LAMBDA_RUNTIME_API` (required, set by the function service)
///   - `EFS_MOUNT_PATH`         (default `/mnt/filesystem`)
#[derive(Debug, Deserialize)]
pub struct HandlerConfig {
    /// `host:port` of the runtime API.
    pub aws_lambda_runtime_api: String,

    /// Local path the filesystem access point is mounted at.
    #[serde(default = "default_mount_path")]
    pub efs_mount_path: PathBuf,
}

fn default_mount_path() -> PathBuf {
    PathBuf::from(DEFAULT_MOUNT_PATH)
}

impl HandlerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        envy::from_env().context(
            "failed to load handler config (AWS_LAMBDA_RUNTIME_API is required; \
             is this running inside the function service?)",
        )
    }

    /// Load configuration from explicit key/value pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs).context("failed to load handler config")
    }
}
