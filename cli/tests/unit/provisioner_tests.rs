//! Unit and property tests for `AwsCliProvisioner`.
//!
//! Verifies that every port method builds the expected `aws` argument list,
//! applies the configured region, and uses the long timeout for calls that
//! wait on stack operations.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, bail};
use lambda_efs_cli::application::ports::{CommandRunner, FunctionInvoker, StackProvisioner};
use lambda_efs_cli::infra::cloudformation::AwsCliProvisioner;
use lambda_efs_cli::infra::command_runner::{DEFAULT_CMD_TIMEOUT, STACK_OPERATION_TIMEOUT};
use proptest::prelude::*;

use crate::helpers::{err_output, ok_output};

// ─── MockCommandRunner ────────────────────────────────────────────────────────

type Responder = Arc<dyn Fn(&[String]) -> Result<Output> + Send + Sync>;

/// A `CommandRunner` that records every `(program, args, timeout)` call and
/// answers through a configurable responder.
#[derive(Clone)]
struct MockCommandRunner {
    calls: Arc<Mutex<Vec<(String, Vec<String>, Duration)>>>,
    respond: Responder,
}

impl MockCommandRunner {
    fn new_ok() -> Self {
        Self::responding(|_| Ok(ok_output(b"")))
    }

    fn responding(f: impl Fn(&[String]) -> Result<Output> + Send + Sync + 'static) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(f),
        }
    }

    fn recorded(&self) -> Vec<(String, Vec<String>, Duration)> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    fn only_args(&self) -> Vec<String> {
        let calls = self.recorded();
        assert_eq!(calls.len(), 1, "expected exactly one call");
        calls[0].1.clone()
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, DEFAULT_CMD_TIMEOUT).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        self.calls
            .lock()
            .expect("mutex poisoned")
            .push((program.to_owned(), args.clone(), timeout));
        (self.respond)(&args)
    }
}

fn provisioner(runner: &MockCommandRunner, region: Option<&str>) -> AwsCliProvisioner<MockCommandRunner> {
    AwsCliProvisioner::new(runner.clone(), region.map(str::to_string))
}

// ─── Stack operations ─────────────────────────────────────────────────────────

#[tokio::test]
async fn package_builds_expected_args() {
    let runner = MockCommandRunner::new_ok();
    provisioner(&runner, None)
        .package(
            Path::new("out/S.template.json"),
            "my-assets",
            Path::new("out/S.packaged.json"),
        )
        .await
        .unwrap();

    let calls = runner.recorded();
    assert_eq!(calls[0].0, "aws");
    assert_eq!(
        calls[0].1,
        [
            "cloudformation",
            "package",
            "--template-file",
            "out/S.template.json",
            "--s3-bucket",
            "my-assets",
            "--output-template-file",
            "out/S.packaged.json",
        ]
    );
}

#[tokio::test]
async fn deploy_requests_iam_capability_and_tolerates_empty_changeset() {
    let runner = MockCommandRunner::new_ok();
    provisioner(&runner, None)
        .deploy(Path::new("out/S.packaged.json"), "S")
        .await
        .unwrap();

    let (_, args, timeout) = runner.recorded().remove(0);
    assert_eq!(
        args,
        [
            "cloudformation",
            "deploy",
            "--template-file",
            "out/S.packaged.json",
            "--stack-name",
            "S",
            "--capabilities",
            "CAPABILITY_IAM",
            "--no-fail-on-empty-changeset",
        ]
    );
    assert_eq!(timeout, STACK_OPERATION_TIMEOUT);
}

#[tokio::test]
async fn delete_and_wait_use_stack_name() {
    let runner = MockCommandRunner::new_ok();
    let p = provisioner(&runner, None);
    p.delete("S").await.unwrap();
    p.wait_deleted("S").await.unwrap();

    let calls = runner.recorded();
    assert_eq!(
        calls[0].1,
        ["cloudformation", "delete-stack", "--stack-name", "S"]
    );
    assert_eq!(calls[0].2, DEFAULT_CMD_TIMEOUT);
    assert_eq!(
        calls[1].1,
        [
            "cloudformation",
            "wait",
            "stack-delete-complete",
            "--stack-name",
            "S"
        ]
    );
    assert_eq!(calls[1].2, STACK_OPERATION_TIMEOUT);
}

#[tokio::test]
async fn describe_requests_json_output() {
    let runner = MockCommandRunner::new_ok();
    provisioner(&runner, None).describe("S").await.unwrap();
    assert_eq!(
        runner.only_args(),
        [
            "cloudformation",
            "describe-stacks",
            "--stack-name",
            "S",
            "--output",
            "json"
        ]
    );
}

#[tokio::test]
async fn region_is_appended_to_every_call() {
    let runner = MockCommandRunner::new_ok();
    let p = provisioner(&runner, Some("eu-west-1"));
    p.describe("S").await.unwrap();
    p.delete("S").await.unwrap();

    for (_, args, _) in runner.recorded() {
        assert_eq!(&args[args.len() - 2..], ["--region", "eu-west-1"]);
    }
}

#[tokio::test]
async fn runner_error_gets_step_context() {
    let runner = MockCommandRunner::responding(|_| bail!("aws timed out after 120s"));
    let err = provisioner(&runner, None).describe("S").await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("aws cloudformation describe-stacks"), "{chain}");
    assert!(chain.contains("timed out"), "{chain}");
}

// ─── Invoke ───────────────────────────────────────────────────────────────────

/// Simulates `aws lambda invoke`: writes `payload` to the outfile (last
/// argument) and prints `stdout`.
fn invoke_responder(payload: &'static [u8], stdout: &'static [u8]) -> MockCommandRunner {
    MockCommandRunner::responding(move |args| {
        let outfile = args.last().expect("outfile argument");
        std::fs::write(outfile, payload)?;
        Ok(ok_output(stdout))
    })
}

#[tokio::test]
async fn invoke_reads_payload_from_outfile() {
    let runner = invoke_responder(
        b"\"Hello Lambda! Test123\"",
        br#"{"StatusCode":200,"ExecutedVersion":"$LATEST"}"#,
    );
    let response = provisioner(&runner, None)
        .invoke("my-fn", "{}")
        .await
        .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.function_error, None);
    assert_eq!(response.payload, b"\"Hello Lambda! Test123\"");

    let args = runner.only_args();
    assert_eq!(
        &args[..9],
        [
            "lambda",
            "invoke",
            "--function-name",
            "my-fn",
            "--cli-binary-format",
            "raw-in-base64-out",
            "--payload",
            "{}",
            "--output",
        ]
    );
}

#[tokio::test]
async fn invoke_parses_function_error() {
    let runner = invoke_responder(
        br#"{"errorMessage":"boom","errorType":"Handler.ReadFailed"}"#,
        br#"{"StatusCode":200,"FunctionError":"Unhandled","ExecutedVersion":"$LATEST"}"#,
    );
    let response = provisioner(&runner, None)
        .invoke("my-fn", "{}")
        .await
        .unwrap();
    assert_eq!(response.function_error.as_deref(), Some("Unhandled"));
}

#[tokio::test]
async fn invoke_cli_failure_is_command_failed() {
    let runner = MockCommandRunner::responding(|_| {
        Ok(err_output(
            254,
            b"An error occurred (ResourceNotFoundException): Function not found",
        ))
    });
    let err = provisioner(&runner, None)
        .invoke("missing", "{}")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("invoke failed:"));
}

#[tokio::test]
async fn invoke_on_cli_v1_points_at_v2() {
    let runner = MockCommandRunner::responding(|_| {
        Ok(err_output(
            255,
            b"Unknown options: --cli-binary-format, raw-in-base64-out",
        ))
    });
    let err = provisioner(&runner, None)
        .invoke("my-fn", "{}")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Unknown options"), "{message}");
    assert!(message.contains("requires AWS CLI v2"), "{message}");
}

#[tokio::test]
async fn invoke_other_failures_have_no_version_hint() {
    let runner = MockCommandRunner::responding(|_| {
        Ok(err_output(254, b"An error occurred (AccessDeniedException)"))
    });
    let err = provisioner(&runner, None)
        .invoke("my-fn", "{}")
        .await
        .unwrap_err();
    assert!(!err.to_string().contains("AWS CLI v2"));
}

// ─── Property tests ───────────────────────────────────────────────────────────

proptest! {
    /// The stack name is always passed verbatim after `--stack-name`.
    #[test]
    fn prop_describe_passes_stack_name(name in "[A-Za-z][A-Za-z0-9-]{0,40}") {
        let runner = MockCommandRunner::new_ok();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(provisioner(&runner, None).describe(&name)).unwrap();
        let args = runner.only_args();
        let pos = args.iter().position(|a| a == "--stack-name").unwrap();
        prop_assert_eq!(&args[pos + 1], &name);
    }
}
