//! Code bundle paths in templates written by `synth_stack` on disk.
//!
//! `cloudformation package` resolves a relative `Code` path against the
//! directory holding the template. These tests change the process working
//! directory and are serialized with `serial_test`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use lambda_efs_cli::application::services::deploy::synth_stack;
use lambda_efs_cli::domain::ComposeSettings;
use lambda_efs_cli::infra::fs::LocalFs;
use serial_test::serial;
use tempfile::TempDir;

/// Restores the previous working directory when dropped.
struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    fn enter(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("current dir");
        std::env::set_current_dir(dir).expect("enter temp dir");
        Self { previous }
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

fn project_with_bundle() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let bundle = dir.path().join("target/lambda/bootstrap");
    std::fs::create_dir_all(&bundle).unwrap();
    std::fs::write(bundle.join("bootstrap"), b"\x7fELF").unwrap();
    dir
}

#[test]
#[serial]
fn code_path_resolves_from_template_directory() {
    let project = project_with_bundle();
    let _cwd = WorkingDir::enter(project.path());

    let synthesized = synth_stack(
        &LocalFs,
        &LocalFs,
        &ComposeSettings::default(),
        Some(Path::new("target/stack")),
    )
    .expect("synth");

    let template_path = synthesized.path.expect("template written");
    let template: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&template_path).unwrap()).unwrap();
    let code = template["Resources"]["LambdaWithEfs"]["Properties"]["Code"]
        .as_str()
        .expect("Code is a path");

    let resolved = template_path.parent().unwrap().join(code);
    assert!(
        resolved.join("bootstrap").is_file(),
        "{code} does not resolve from {}",
        template_path.display()
    );
}

#[test]
#[serial]
fn asset_hash_is_independent_of_working_directory() {
    let project = project_with_bundle();
    let first = {
        let _cwd = WorkingDir::enter(project.path());
        synth_stack(&LocalFs, &LocalFs, &ComposeSettings::default(), None).unwrap()
    };

    let nested = project.path().join("nested");
    std::fs::create_dir_all(&nested).unwrap();
    let settings = ComposeSettings {
        code_path: PathBuf::from("../target/lambda/bootstrap"),
        ..ComposeSettings::default()
    };
    let second = {
        let _cwd = WorkingDir::enter(&nested);
        synth_stack(&LocalFs, &LocalFs, &settings, None).unwrap()
    };

    assert_eq!(
        first.template.resources["LambdaWithEfs"].metadata,
        second.template.resources["LambdaWithEfs"].metadata
    );
}
