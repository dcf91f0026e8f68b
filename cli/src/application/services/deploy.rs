//! Application service: synth, deploy, destroy and status use-cases.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{AssetHasher, LocalFs, ProgressReporter, StackProvisioner};
use crate::application::services::compose::compose;
use crate::application::services::synth::{AssetRef, render, synthesize};
use crate::domain::stack::{ComposeSettings, StackGraph};
use crate::domain::{DeployError, Template};

/// Marker printed by `cloudformation deploy` when the change set is empty.
const NO_CHANGES_MARKER: &str = "No changes to deploy";

/// Marker in `describe-stacks` stderr for an unknown stack.
const NOT_FOUND_MARKER: &str = "does not exist";

/// A composed and synthesized stack.
#[derive(Debug)]
pub struct Synthesized {
    pub graph: StackGraph,
    pub template: Template,
    pub rendered: String,
    /// Where the template was written, when an output directory was given.
    pub path: Option<PathBuf>,
}

/// Compose and synthesize the stack described by `settings`.
///
/// The code bundle is hashed and referenced by its absolute path when
/// present; a missing bundle only omits the asset metadata. When `out_dir` is given the template is written to
/// `<out_dir>/<stack>.template.json`.
///
/// # Errors
///
/// Returns an error if composition fails or the template cannot be written.
pub fn synth_stack(
    fs: &impl LocalFs,
    hasher: &impl AssetHasher,
    settings: &ComposeSettings,
    out_dir: Option<&Path>,
) -> Result<Synthesized> {
    // `cloudformation package` resolves a relative `Code` path against the
    // template's directory, not the working directory.
    let mut settings = settings.clone();
    let asset = if fs.exists(&settings.code_path) {
        settings.code_path = fs.canonicalize(&settings.code_path)?;
        Some(asset_ref(hasher, &settings.code_path)?)
    } else {
        None
    };
    let graph = compose(&settings)?;
    let template = synthesize(&graph, asset.as_ref())?;
    let rendered = render(&template)?;

    let path = match out_dir {
        Some(dir) => {
            fs.create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let path = dir.join(format!("{}.template.json", graph.name));
            fs.write(&path, &rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            Some(path)
        }
        None => None,
    };

    Ok(Synthesized {
        graph,
        template,
        rendered,
        path,
    })
}

fn asset_ref(hasher: &impl AssetHasher, path: &Path) -> Result<AssetRef> {
    let hash = hasher
        .hash_dir(path)
        .with_context(|| format!("hashing code bundle {}", path.display()))?;
    Ok(AssetRef {
        path: path.to_string_lossy().into_owned(),
        hash,
    })
}

// ── Deploy ────────────────────────────────────────────────────────────────────

pub struct DeployOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub settings: &'a ComposeSettings,
    pub asset_bucket: Option<&'a str>,
    pub out_dir: &'a Path,
}

/// Outcome of the `deploy_stack` use-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeployOutcome {
    /// The stack was created or updated.
    Deployed { stack: String },
    /// The stack already matched the template.
    Unchanged { stack: String },
}

/// Compose, synthesize, package and deploy the stack.
///
/// # Errors
///
/// Returns an error if no asset bucket is configured, the code bundle is
/// missing, composition fails, or a provisioning command fails.
pub async fn deploy_stack(
    provisioner: &impl StackProvisioner,
    fs: &impl LocalFs,
    hasher: &impl AssetHasher,
    opts: DeployOptions<'_, impl ProgressReporter>,
) -> Result<DeployOutcome> {
    let DeployOptions {
        reporter,
        settings,
        asset_bucket,
        out_dir,
    } = opts;

    let bucket = asset_bucket.ok_or(DeployError::MissingAssetBucket)?;
    if !fs.exists(&settings.code_path) {
        return Err(
            DeployError::MissingCodeBundle(settings.code_path.display().to_string()).into(),
        );
    }

    reporter.step("composing stack...");
    let synthesized = synth_stack(fs, hasher, settings, Some(out_dir))?;
    let stack = synthesized.graph.name.clone();
    let template_path = synthesized
        .path
        .context("synthesized template was not written")?;
    reporter.success(&format!("template written to {}", template_path.display()));

    reporter.step(&format!("uploading code bundle to s3://{bucket}..."));
    let packaged = out_dir.join(format!("{stack}.packaged.json"));
    let output = provisioner
        .package(&template_path, bucket, &packaged)
        .await
        .context("packaging template")?;
    ensure_success("package", &output)?;

    reporter.step(&format!("deploying stack {stack}..."));
    let output = provisioner
        .deploy(&packaged, &stack)
        .await
        .context("deploying stack")?;
    ensure_success("deploy", &output)?;

    if String::from_utf8_lossy(&output.stdout).contains(NO_CHANGES_MARKER) {
        tracing::info!(stack = %stack, "stack unchanged");
        reporter.success(&format!("stack {stack} is up to date"));
        return Ok(DeployOutcome::Unchanged { stack });
    }
    tracing::info!(stack = %stack, "stack deployed");
    reporter.success(&format!("stack {stack} deployed"));
    Ok(DeployOutcome::Deployed { stack })
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Observed state of a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StackStatus {
    NotFound {
        stack: String,
    },
    Present {
        stack: String,
        status: String,
        outputs: BTreeMap<String, String>,
    },
}

/// Describe `stack_name`.
///
/// # Errors
///
/// Returns an error if the describe command fails for any reason other than
/// an unknown stack, or its output cannot be parsed.
pub async fn stack_status(
    provisioner: &impl StackProvisioner,
    stack_name: &str,
) -> Result<StackStatus> {
    let output = provisioner
        .describe(stack_name)
        .await
        .context("describing stack")?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(NOT_FOUND_MARKER) {
            return Ok(StackStatus::NotFound {
                stack: stack_name.to_string(),
            });
        }
        ensure_success("describe", &output)?;
    }
    parse_describe(stack_name, &output.stdout)
}

/// Parse `describe-stacks` JSON into a `StackStatus::Present`.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON or lists no stack.
pub fn parse_describe(stack_name: &str, stdout: &[u8]) -> Result<StackStatus> {
    let doc: serde_json::Value =
        serde_json::from_slice(stdout).context("parsing describe-stacks output")?;
    let stack = doc
        .get("Stacks")
        .and_then(|s| s.get(0))
        .ok_or_else(|| DeployError::StackNotFound(stack_name.to_string()))?;

    let status = stack
        .get("StackStatus")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();
    let outputs = stack
        .get("Outputs")
        .and_then(serde_json::Value::as_array)
        .map(|outs| {
            outs.iter()
                .filter_map(|o| {
                    let key = o.get("OutputKey")?.as_str()?;
                    let value = o.get("OutputValue")?.as_str()?;
                    Some((key.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(StackStatus::Present {
        stack: stack_name.to_string(),
        status,
        outputs,
    })
}

// ── Destroy ───────────────────────────────────────────────────────────────────

/// Outcome of the `destroy_stack` use-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DestroyOutcome {
    Destroyed { stack: String },
    NotFound { stack: String },
}

/// Delete `stack_name` and wait until deletion completes.
///
/// # Errors
///
/// Returns an error if a provisioning command fails.
pub async fn destroy_stack(
    provisioner: &impl StackProvisioner,
    reporter: &impl ProgressReporter,
    stack_name: &str,
) -> Result<DestroyOutcome> {
    if let StackStatus::NotFound { stack } = stack_status(provisioner, stack_name).await? {
        reporter.warn(&format!("stack {stack} does not exist"));
        return Ok(DestroyOutcome::NotFound { stack });
    }

    reporter.step(&format!("deleting stack {stack_name}..."));
    let output = provisioner
        .delete(stack_name)
        .await
        .context("deleting stack")?;
    ensure_success("delete", &output)?;

    reporter.step("waiting for deletion to complete...");
    let output = provisioner
        .wait_deleted(stack_name)
        .await
        .context("waiting for stack deletion")?;
    ensure_success("wait", &output)?;

    tracing::info!(stack = stack_name, "stack destroyed");
    reporter.success(&format!("stack {stack_name} destroyed"));
    Ok(DestroyOutcome::Destroyed {
        stack: stack_name.to_string(),
    })
}

/// Map a failed command to `DeployError::CommandFailed` with its stderr.
pub(crate) fn ensure_success(step: &'static str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr
    };
    Err(DeployError::CommandFailed { step, detail }.into())
}
