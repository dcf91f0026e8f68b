//! JSON output helpers.
//!
//! `format_error` is the error object every `--json` code path prints when a
//! command fails; `JsonRenderer` prints successful results.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::application::services::deploy::{DeployOutcome, DestroyOutcome, StackStatus, Synthesized};
use crate::application::services::invoke::Invocation;
use crate::domain::{ComposeError, ConfigError, DeployError, StackConfig, StackGraph};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the typed error at the root of `err`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<DeployError>() {
        return match e {
            DeployError::MissingAssetBucket => "MISSING_ASSET_BUCKET",
            DeployError::MissingCodeBundle(_) => "MISSING_CODE_BUNDLE",
            DeployError::StackNotFound(_) => "STACK_NOT_FOUND",
            DeployError::MissingOutput { .. } => "MISSING_OUTPUT",
            DeployError::CommandFailed { .. } => "COMMAND_FAILED",
            DeployError::FunctionFailed { .. } => "FUNCTION_FAILED",
        };
    }
    if err.downcast_ref::<ComposeError>().is_some() {
        return "COMPOSE_ERROR";
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return "INVALID_CONFIG";
    }
    "ERROR"
}

/// Renders results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

#[allow(clippy::unused_self)]
impl JsonRenderer {
    fn print(value: &impl Serialize) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("JSON serialization failed")?
        );
        Ok(())
    }

    pub fn render_version(&self, version: &str) -> Result<()> {
        Self::print(&json!({ "version": version }))
    }

    pub fn render_graph(&self, graph: &StackGraph) -> Result<()> {
        Self::print(graph)
    }

    pub fn render_synth(&self, synthesized: &Synthesized) -> Result<()> {
        Self::print(&json!({
            "stack": synthesized.graph.name,
            "variant": synthesized.graph.variant,
            "path": synthesized.path,
            "resources": synthesized.template.resources.len(),
            "outputs": synthesized.template.outputs.keys().collect::<Vec<_>>(),
        }))
    }

    pub fn render_config(&self, config: &StackConfig, path: &std::path::Path) -> Result<()> {
        Self::print(&json!({ "path": path, "config": config }))
    }

    pub fn render_status(&self, status: &StackStatus) -> Result<()> {
        Self::print(status)
    }

    pub fn render_deploy(&self, outcome: &DeployOutcome) -> Result<()> {
        Self::print(outcome)
    }

    pub fn render_destroy(&self, outcome: &DestroyOutcome) -> Result<()> {
        Self::print(outcome)
    }

    pub fn render_invocation(&self, invocation: &Invocation) -> Result<()> {
        Self::print(invocation)
    }
}
