//! Domain types and validators for lambda-efs configuration.
//!
//! Pure functions only, no I/O.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::resources::{Architecture, VALID_ARCHITECTURES};
use crate::domain::stack::{
    ComposeSettings, DEFAULT_CODE_PATH, DEFAULT_STACK_NAME, STACK_NAME_RE, StackVariant,
    VALID_VARIANTS,
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "stack.name",
    "stack.variant",
    "function.code_path",
    "function.architecture",
    "deploy.asset_bucket",
    "deploy.region",
];

static BUCKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex")
});

static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("valid regex")
});

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `./lambda-efs.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StackConfig {
    pub stack: StackSection,
    pub function: FunctionSection,
    pub deploy: DeploySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSection {
    #[serde(default = "default_stack_name")]
    pub name: String,
    #[serde(default)]
    pub variant: StackVariant,
}

impl Default for StackSection {
    fn default() -> Self {
        Self {
            name: default_stack_name(),
            variant: StackVariant::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSection {
    /// Directory containing the built `bootstrap` executable.
    #[serde(default = "default_code_path")]
    pub code_path: String,
    #[serde(default)]
    pub architecture: Architecture,
}

impl Default for FunctionSection {
    fn default() -> Self {
        Self {
            code_path: default_code_path(),
            architecture: Architecture::default(),
        }
    }
}

/// Settings only the deploy step needs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeploySection {
    /// Bucket the code bundle is uploaded to before deploying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

fn default_stack_name() -> String {
    DEFAULT_STACK_NAME.to_string()
}

fn default_code_path() -> String {
    DEFAULT_CODE_PATH.to_string()
}

impl StackConfig {
    /// Composition input derived from this configuration.
    #[must_use]
    pub fn compose_settings(&self) -> ComposeSettings {
        ComposeSettings {
            stack_name: self.stack.name.clone(),
            variant: self.stack.variant,
            code_path: PathBuf::from(&self.function.code_path),
            architecture: self.function.architecture,
        }
    }

    /// Apply a validated `key = value` setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "stack.name" => self.stack.name = value.to_string(),
            "stack.variant" => {
                self.stack.variant = value.parse().map_err(anyhow::Error::msg)?;
            }
            "function.code_path" => self.function.code_path = value.to_string(),
            "function.architecture" => {
                self.function.architecture = value.parse().map_err(anyhow::Error::msg)?;
            }
            "deploy.asset_bucket" => self.deploy.asset_bucket = Some(value.to_string()),
            "deploy.region" => self.deploy.region = Some(value.to_string()),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }

    /// Every key with its current value, `None` when unset.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("stack.name", Some(self.stack.name.clone())),
            ("stack.variant", Some(self.stack.variant.to_string())),
            ("function.code_path", Some(self.function.code_path.clone())),
            (
                "function.architecture",
                Some(self.function.architecture.to_string()),
            ),
            ("deploy.asset_bucket", self.deploy.asset_bucket.clone()),
            ("deploy.region", self.deploy.region.clone()),
        ]
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let (ok, valid) = match key {
        "stack.name" => (
            STACK_NAME_RE.is_match(value),
            "a letter followed by up to 127 letters, digits or hyphens".to_string(),
        ),
        "stack.variant" => (VALID_VARIANTS.contains(&value), VALID_VARIANTS.join(", ")),
        "function.code_path" => (!value.trim().is_empty(), "a non-empty path".to_string()),
        "function.architecture" => (
            VALID_ARCHITECTURES.contains(&value),
            VALID_ARCHITECTURES.join(", "),
        ),
        "deploy.asset_bucket" => (
            BUCKET_RE.is_match(value) && !value.contains(".."),
            "3-63 lowercase letters, digits, dots or hyphens".to_string(),
        ),
        "deploy.region" => (
            REGION_RE.is_match(value),
            "a region name such as eu-west-1".to_string(),
        ),
        _ => (true, String::new()),
    };
    if !ok {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            valid,
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
