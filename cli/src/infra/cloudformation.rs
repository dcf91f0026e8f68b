//! Infrastructure implementation of the stack and invoke port traits.
//!
//! `AwsCliProvisioner<R>` routes every `aws` CLI call through a
//! `CommandRunner`, so tests can inject a recording runner without spawning
//! real processes.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::{CommandRunner, FunctionInvoker, FunctionResponse, StackProvisioner};
use crate::domain::DeployError;
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, STACK_OPERATION_TIMEOUT, TokioCommandRunner};

const AWS: &str = "aws";

/// Option `lambda invoke` needs for a raw JSON payload; AWS CLI v1 rejects it.
const BINARY_FORMAT_OPTION: &str = "--cli-binary-format";

/// Infrastructure adapter that drives CloudFormation and Lambda through the
/// `aws` CLI.
pub struct AwsCliProvisioner<R: CommandRunner> {
    runner: R,
    region: Option<String>,
}

impl<R: CommandRunner> AwsCliProvisioner<R> {
    /// Create a provisioner; `region` is passed as `--region` on every call.
    pub fn new(runner: R, region: Option<String>) -> Self {
        Self { runner, region }
    }

    fn with_region<'a>(&'a self, base: &[&'a str]) -> Vec<&'a str> {
        let mut args = base.to_vec();
        if let Some(region) = &self.region {
            args.push("--region");
            args.push(region);
        }
        args
    }

    async fn aws(&self, base: &[&str], timeout: Duration, step: &str) -> Result<Output> {
        let args = self.with_region(base);
        self.runner
            .run_with_timeout(AWS, &args, timeout)
            .await
            .with_context(|| format!("aws {step}"))
    }
}

impl AwsCliProvisioner<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(region: Option<String>) -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), region)
    }
}

impl<R: CommandRunner> StackProvisioner for AwsCliProvisioner<R> {
    async fn package(&self, template: &Path, bucket: &str, output: &Path) -> Result<Output> {
        let template = template.to_string_lossy();
        let output = output.to_string_lossy();
        self.aws(
            &[
                "cloudformation",
                "package",
                "--template-file",
                &template,
                "--s3-bucket",
                bucket,
                "--output-template-file",
                &output,
            ],
            STACK_OPERATION_TIMEOUT,
            "cloudformation package",
        )
        .await
    }

    async fn deploy(&self, template: &Path, stack_name: &str) -> Result<Output> {
        let template = template.to_string_lossy();
        self.aws(
            &[
                "cloudformation",
                "deploy",
                "--template-file",
                &template,
                "--stack-name",
                stack_name,
                "--capabilities",
                "CAPABILITY_IAM",
                "--no-fail-on-empty-changeset",
            ],
            STACK_OPERATION_TIMEOUT,
            "cloudformation deploy",
        )
        .await
    }

    async fn delete(&self, stack_name: &str) -> Result<Output> {
        self.aws(
            &["cloudformation", "delete-stack", "--stack-name", stack_name],
            DEFAULT_CMD_TIMEOUT,
            "cloudformation delete-stack",
        )
        .await
    }

    async fn wait_deleted(&self, stack_name: &str) -> Result<Output> {
        self.aws(
            &[
                "cloudformation",
                "wait",
                "stack-delete-complete",
                "--stack-name",
                stack_name,
            ],
            STACK_OPERATION_TIMEOUT,
            "cloudformation wait",
        )
        .await
    }

    async fn describe(&self, stack_name: &str) -> Result<Output> {
        self.aws(
            &[
                "cloudformation",
                "describe-stacks",
                "--stack-name",
                stack_name,
                "--output",
                "json",
            ],
            DEFAULT_CMD_TIMEOUT,
            "cloudformation describe-stacks",
        )
        .await
    }
}

/// Metadata `aws lambda invoke` prints on stdout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InvokeMetadata {
    status_code: u16,
    #[serde(default)]
    function_error: Option<String>,
}

impl<R: CommandRunner> FunctionInvoker for AwsCliProvisioner<R> {
    async fn invoke(&self, function_name: &str, payload: &str) -> Result<FunctionResponse> {
        // The CLI writes the function's response to a file, not stdout.
        let response_file =
            tempfile::NamedTempFile::new().context("creating invoke response file")?;
        let response_path = response_file.path().to_string_lossy().into_owned();

        let output = self
            .aws(
                &[
                    "lambda",
                    "invoke",
                    "--function-name",
                    function_name,
                    BINARY_FORMAT_OPTION,
                    "raw-in-base64-out",
                    "--payload",
                    payload,
                    "--output",
                    "json",
                    &response_path,
                ],
                DEFAULT_CMD_TIMEOUT,
                "lambda invoke",
            )
            .await?;
        if !output.status.success() {
            let mut detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if detail.contains(BINARY_FORMAT_OPTION) {
                detail.push_str("\n\nlambda-efs invoke requires AWS CLI v2 (aws --version).");
            }
            return Err(DeployError::CommandFailed {
                step: "invoke",
                detail,
            }
            .into());
        }

        let meta: InvokeMetadata =
            serde_json::from_slice(&output.stdout).context("parsing lambda invoke output")?;
        let payload = std::fs::read(response_file.path())
            .with_context(|| format!("reading {response_path}"))?;

        Ok(FunctionResponse {
            status_code: meta.status_code,
            function_error: meta.function_error,
            payload,
        })
    }
}
