//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;

use crate::domain::StackConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Result of a synchronous function invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResponse {
    /// HTTP-style status reported by the invoke API (200 on delivery).
    pub status_code: u16,
    /// Set when the function itself failed (`Unhandled`, `Handled`).
    pub function_error: Option<String>,
    /// Raw response payload written by the function.
    pub payload: Vec<u8>,
}

// ── Stack Port Traits ─────────────────────────────────────────────────────────

/// Stack operations performed by the provisioning backend.
#[allow(async_fn_in_trait)]
pub trait StackProvisioner {
    /// Upload local code bundles referenced by `template` to `bucket` and
    /// write a template pointing at the uploaded objects to `output`.
    async fn package(&self, template: &Path, bucket: &str, output: &Path) -> Result<Output>;
    /// Create or update `stack_name` from `template` and wait for completion.
    async fn deploy(&self, template: &Path, stack_name: &str) -> Result<Output>;
    /// Request deletion of `stack_name`.
    async fn delete(&self, stack_name: &str) -> Result<Output>;
    /// Block until `stack_name` is fully deleted.
    async fn wait_deleted(&self, stack_name: &str) -> Result<Output>;
    /// Describe `stack_name` as JSON.
    async fn describe(&self, stack_name: &str) -> Result<Output>;
}

/// Synchronous function invocation.
#[allow(async_fn_in_trait)]
pub trait FunctionInvoker {
    /// Invoke `function_name` with a JSON `payload` and wait for the result.
    async fn invoke(&self, function_name: &str, payload: &str) -> Result<FunctionResponse>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config and Filesystem Ports ───────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load configuration, returning defaults when no file exists.
    fn load(&self) -> Result<StackConfig>;
    /// Persist configuration.
    fn save(&self, config: &StackConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

/// Abstracts the local filesystem operations services need.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Absolute form of an existing `path`.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

/// Abstracts content hashing of code bundles.
pub trait AssetHasher {
    /// SHA-256 hex digest over a directory's relative paths and contents.
    fn hash_dir(&self, path: &Path) -> Result<String>;
}
