//! Property-based tests for configuration validation and composition
//! invariants.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;

use proptest::prelude::*;

use lambda_efs_cli::application::services::compose::compose;
use lambda_efs_cli::application::services::synth::{render, synthesize};
use lambda_efs_cli::domain::config::VALID_CONFIG_KEYS;
use lambda_efs_cli::domain::resources::{Resource, ResourceKind};
use lambda_efs_cli::domain::{
    ComposeSettings, StackVariant, validate_config_key, validate_config_value,
};

fn variant() -> impl Strategy<Value = StackVariant> {
    prop_oneof![Just(StackVariant::Mounted), Just(StackVariant::ComputeOnly)]
}

fn stack_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,40}"
}

// ============================================================================
// validate_config_key() and validate_config_value()
// ============================================================================

proptest! {
    /// Arbitrary keys outside the whitelist are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,12}\\.[a-z_]{1,12}") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    /// Every well-formed stack name is accepted.
    #[test]
    fn prop_valid_stack_names_accepted(name in stack_name()) {
        prop_assert!(validate_config_value("stack.name", &name).is_ok());
    }

    /// Stack names starting with a digit or hyphen are rejected.
    #[test]
    fn prop_stack_names_must_start_with_letter(name in "[0-9-][A-Za-z0-9-]{0,20}") {
        prop_assert!(validate_config_value("stack.name", &name).is_err());
    }

    /// Only the two variant names are accepted.
    #[test]
    fn prop_unknown_variants_rejected(value in "[a-z-]{1,20}") {
        let expected_ok = value == "mounted" || value == "compute-only";
        prop_assert_eq!(validate_config_value("stack.variant", &value).is_ok(), expected_ok);
    }

    /// Bucket names with uppercase letters are rejected.
    #[test]
    fn prop_uppercase_buckets_rejected(value in "[a-z]{2,10}[A-Z][a-z]{2,10}") {
        prop_assert!(validate_config_value("deploy.asset_bucket", &value).is_err());
    }
}

// ============================================================================
// Composition invariants
// ============================================================================

proptest! {
    /// Resources are declared network → storage → access point → compute,
    /// with every dependency declared before its dependent.
    #[test]
    fn prop_declaration_order_holds(name in stack_name(), v in variant()) {
        let graph = compose(&ComposeSettings {
            stack_name: name,
            variant: v,
            code_path: PathBuf::from("target/lambda/bootstrap"),
            ..ComposeSettings::default()
        }).unwrap();

        let kinds: Vec<ResourceKind> = graph.resources().iter().map(Resource::kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort_by_key(|k| match k {
            ResourceKind::Network => 0,
            ResourceKind::Storage => 1,
            ResourceKind::AccessPoint => 2,
            ResourceKind::Compute => 3,
        });
        prop_assert_eq!(&kinds, &sorted);

        for (i, resource) in graph.resources().iter().enumerate() {
            for dep in resource.dependencies() {
                let pos = graph.resources().iter().position(|r| r.id() == dep);
                prop_assert!(pos.is_some_and(|p| p < i), "{} depends on later {}", resource.id(), dep);
            }
        }
    }

    /// A mounted compute unit always shares its storage's network and runs as
    /// the access point's identity; compute-only never mounts.
    #[test]
    fn prop_mount_colocation(name in stack_name(), v in variant()) {
        let graph = compose(&ComposeSettings {
            stack_name: name,
            variant: v,
            code_path: PathBuf::from("bundle"),
            ..ComposeSettings::default()
        }).unwrap();
        let compute = graph.compute().unwrap();
        match compute.mount.access_point() {
            Some(ap) => {
                prop_assert_eq!(compute.network.as_ref(), Some(&ap.network));
                prop_assert_eq!(compute.execution_identity, ap.posix_user);
                prop_assert_eq!(ap.owner, ap.posix_user);
            }
            None => prop_assert_eq!(v, StackVariant::ComputeOnly),
        }
    }

    /// Rendering the same settings twice yields identical bytes.
    #[test]
    fn prop_synthesis_is_deterministic(name in stack_name(), v in variant()) {
        let settings = ComposeSettings {
            stack_name: name,
            variant: v,
            code_path: PathBuf::from("target/lambda/bootstrap"),
            ..ComposeSettings::default()
        };
        let a = render(&synthesize(&compose(&settings).unwrap(), None).unwrap()).unwrap();
        let b = render(&synthesize(&compose(&settings).unwrap(), None).unwrap()).unwrap();
        prop_assert_eq!(a, b);
    }
}
