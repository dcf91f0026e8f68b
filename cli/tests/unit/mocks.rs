//! Shared mock infrastructure for unit tests.
//!
//! Hand-written port implementations that record calls and return canned
//! results, so each test file doesn't re-define the same boilerplate.

#![allow(dead_code, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Mutex;

use anyhow::Result;
use lambda_efs_cli::application::ports::{
    AssetHasher, ConfigStore, FunctionInvoker, FunctionResponse, LocalFs, ProgressReporter,
    StackProvisioner,
};
use lambda_efs_cli::domain::StackConfig;

use crate::helpers::ok_output;

// ── Mock: recording stack provisioner ─────────────────────────────────────────

/// Records every call as `"op target"` and returns a canned `Output` per op.
pub struct RecordingProvisioner {
    pub calls: Mutex<Vec<String>>,
    pub package: Output,
    pub deploy: Output,
    pub delete: Output,
    pub wait: Output,
    pub describe: Output,
}

impl RecordingProvisioner {
    /// Every command succeeds with empty stdout.
    pub fn ok() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            package: ok_output(b""),
            deploy: ok_output(b"Successfully created/updated stack - LambdaEfsStack"),
            delete: ok_output(b""),
            wait: ok_output(b""),
            describe: ok_output(br#"{"Stacks":[{"StackStatus":"CREATE_COMPLETE"}]}"#),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl StackProvisioner for RecordingProvisioner {
    async fn package(&self, template: &Path, bucket: &str, output: &Path) -> Result<Output> {
        self.record(format!(
            "package {} {bucket} {}",
            template.display(),
            output.display()
        ));
        Ok(self.package.clone())
    }

    async fn deploy(&self, template: &Path, stack_name: &str) -> Result<Output> {
        self.record(format!("deploy {} {stack_name}", template.display()));
        Ok(self.deploy.clone())
    }

    async fn delete(&self, stack_name: &str) -> Result<Output> {
        self.record(format!("delete {stack_name}"));
        Ok(self.delete.clone())
    }

    async fn wait_deleted(&self, stack_name: &str) -> Result<Output> {
        self.record(format!("wait {stack_name}"));
        Ok(self.wait.clone())
    }

    async fn describe(&self, stack_name: &str) -> Result<Output> {
        self.record(format!("describe {stack_name}"));
        Ok(self.describe.clone())
    }
}

// ── Mock: canned function invoker ─────────────────────────────────────────────

pub struct StubInvoker {
    pub response: FunctionResponse,
    pub invoked: Mutex<Vec<(String, String)>>,
}

impl StubInvoker {
    pub fn returning(payload: &[u8], function_error: Option<&str>) -> Self {
        Self {
            response: FunctionResponse {
                status_code: 200,
                function_error: function_error.map(str::to_string),
                payload: payload.to_vec(),
            },
            invoked: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<(String, String)> {
        self.invoked.lock().expect("lock").clone()
    }
}

impl FunctionInvoker for StubInvoker {
    async fn invoke(&self, function_name: &str, payload: &str) -> Result<FunctionResponse> {
        self.invoked
            .lock()
            .expect("lock")
            .push((function_name.to_string(), payload.to_string()));
        Ok(self.response.clone())
    }
}

// ── Mock: in-memory filesystem and hasher ─────────────────────────────────────

#[derive(Default)]
pub struct MemoryFs {
    pub existing: BTreeSet<PathBuf>,
    pub dirs: Mutex<Vec<PathBuf>>,
    pub files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFs {
    pub fn with_bundle(path: &str) -> Self {
        Self {
            existing: BTreeSet::from([PathBuf::from(path)]),
            ..Self::default()
        }
    }

    pub fn written(&self) -> BTreeMap<PathBuf, String> {
        self.files.lock().expect("lock").clone()
    }
}

impl LocalFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(Path::new(WORK_DIR).join(path))
    }
}

/// Directory `MemoryFs` resolves relative paths against.
pub const WORK_DIR: &str = "/work";

pub const FIXED_HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

pub struct FixedHasher;

impl AssetHasher for FixedHasher {
    fn hash_dir(&self, _: &Path) -> Result<String> {
        Ok(FIXED_HASH.to_string())
    }
}

// ── Mock: progress reporter ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}

// ── Mock: in-memory config store ──────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfigStore {
    pub config: Mutex<Option<StackConfig>>,
    pub saves: Mutex<u32>,
}

impl MemoryConfigStore {
    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("lock")
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<StackConfig> {
        Ok(self.config.lock().expect("lock").clone().unwrap_or_default())
    }

    fn save(&self, config: &StackConfig) -> Result<()> {
        *self.config.lock().expect("lock") = Some(config.clone());
        *self.saves.lock().expect("lock") += 1;
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("memory.yaml"))
    }
}
