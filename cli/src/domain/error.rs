//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use lambda_efs_common::{MountPathError, PosixIdentity};
use thiserror::Error;

// ── Composition errors ────────────────────────────────────────────────────────

/// Errors raised while composing or validating a stack graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error(
        "Compute unit '{compute}' mounts access point '{access_point}' but is not placed in a network."
    )]
    MountRequiresNetwork {
        compute: String,
        access_point: String,
    },

    #[error(
        "Compute unit '{compute}' is placed in network '{compute_network}' but access point '{access_point}' is reachable only from '{storage_network}'."
    )]
    NetworkMismatch {
        compute: String,
        compute_network: String,
        access_point: String,
        storage_network: String,
    },

    #[error(
        "Identity mismatch on access point '{access_point}': {role} is {found}, expected {expected}."
    )]
    IdentityMismatch {
        access_point: String,
        role: &'static str,
        expected: PosixIdentity,
        found: PosixIdentity,
    },

    #[error("Access point '{access_point}' belongs to storage '{storage}', which is not in network '{network}'.")]
    StoragePlacement {
        access_point: String,
        storage: String,
        network: String,
    },

    #[error(transparent)]
    InvalidMountPath(#[from] MountPathError),

    #[error("Access point root '{0}' must be an absolute path.")]
    InvalidRootPath(String),

    #[error("Invalid logical id '{0}': must be 1-255 ASCII letters or digits.")]
    InvalidLogicalId(String),

    #[error("Duplicate logical id '{0}'.")]
    DuplicateId(String),

    #[error("Resource '{resource}' references '{missing}', which is not declared before it.")]
    UndeclaredReference { resource: String, missing: String },

    #[error(
        "Invalid stack name '{0}': must start with a letter and contain at most 128 letters, digits or hyphens."
    )]
    InvalidStackName(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

// ── Deploy errors ─────────────────────────────────────────────────────────────

/// Errors raised by the deploy, destroy, status and invoke use-cases.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("No asset bucket configured. Set one with: lambda-efs config set deploy.asset_bucket <bucket>")]
    MissingAssetBucket,

    #[error(
        "Code bundle not found at {0}. Build the handler first: cargo lambda build --release -p lambda-efs-handler"
    )]
    MissingCodeBundle(String),

    #[error("Stack '{0}' does not exist. Run 'lambda-efs deploy' to create it.")]
    StackNotFound(String),

    #[error("Stack '{stack}' has no '{output}' output.")]
    MissingOutput { stack: String, output: String },

    #[error("{step} failed: {detail}")]
    CommandFailed { step: &'static str, detail: String },

    #[error("Function '{function}' failed ({kind}): {payload}")]
    FunctionFailed {
        function: String,
        kind: String,
        payload: String,
    },
}
