//! Stack graph: resources in declaration order plus the invariants that tie
//! them together.
//!
//! Pure functions only, no I/O.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use lambda_efs_common::validate_mount_path;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ComposeError;
use crate::domain::resources::{
    AccessPoint, Architecture, ComputeUnit, LogicalId, MountedStorage, NetworkBoundary, Resource,
};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_STACK_NAME: &str = "LambdaEfsStack";
pub const DEFAULT_CODE_PATH: &str = "target/lambda/bootstrap";
pub const VALID_VARIANTS: &[&str] = &["mounted", "compute-only"];

/// Stack names accepted by the provisioning backend.
pub static STACK_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // static pattern; covered by tests
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("valid regex")
});

// ── Variant ──────────────────────────────────────────────────────────────────

/// Which resources a composition declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StackVariant {
    /// Network, filesystem with access point, and a function mounting it.
    #[default]
    Mounted,
    /// Function only. Its handler still targets the default mount path and
    /// fails at invocation because nothing is mounted there.
    ComputeOnly,
}

impl StackVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mounted => "mounted",
            Self::ComputeOnly => "compute-only",
        }
    }
}

impl fmt::Display for StackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mounted" => Ok(Self::Mounted),
            "compute-only" => Ok(Self::ComputeOnly),
            other => Err(format!(
                "unknown variant '{other}' (valid: {})",
                VALID_VARIANTS.join(", ")
            )),
        }
    }
}

// ── Composition input ────────────────────────────────────────────────────────

/// Everything the composition root needs. All other resource parameters are
/// named constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeSettings {
    pub stack_name: String,
    pub variant: StackVariant,
    pub code_path: PathBuf,
    pub architecture: Architecture,
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_string(),
            variant: StackVariant::default(),
            code_path: PathBuf::from(DEFAULT_CODE_PATH),
            architecture: Architecture::default(),
        }
    }
}

/// # Errors
///
/// Returns `ComposeError::InvalidStackName` if `name` is not a valid stack name.
pub fn validate_stack_name(name: &str) -> Result<(), ComposeError> {
    if STACK_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ComposeError::InvalidStackName(name.to_string()))
    }
}

// ── Checkpoints ──────────────────────────────────────────────────────────────

/// Completion markers of the three build steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Checkpoint {
    NetworkReady,
    StorageReady,
    ComputeReady,
}

impl Checkpoint {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NetworkReady => "network-ready",
            Self::StorageReady => "storage-ready",
            Self::ComputeReady => "compute-ready",
        }
    }
}

// ── Graph ────────────────────────────────────────────────────────────────────

/// Declared resources of one stack, in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct StackGraph {
    pub name: String,
    pub variant: StackVariant,
    resources: Vec<Resource>,
    checkpoints: Vec<Checkpoint>,
}

impl StackGraph {
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid stack name.
    pub fn new(name: &str, variant: StackVariant) -> Result<Self, ComposeError> {
        validate_stack_name(name)?;
        Ok(Self {
            name: name.to_string(),
            variant,
            resources: Vec::new(),
            checkpoints: Vec::new(),
        })
    }

    /// Append a resource. Its id must be new and everything it references
    /// must already be declared.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` or `UndeclaredReference`.
    pub fn declare(&mut self, resource: Resource) -> Result<(), ComposeError> {
        if self.get(resource.id()).is_some() {
            return Err(ComposeError::DuplicateId(resource.id().to_string()));
        }
        if let Some(missing) = resource
            .dependencies()
            .into_iter()
            .find(|dep| self.get(dep).is_none())
        {
            return Err(ComposeError::UndeclaredReference {
                resource: resource.id().to_string(),
                missing: missing.to_string(),
            });
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn reach(&mut self, checkpoint: Checkpoint) {
        self.checkpoints.push(checkpoint);
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    #[must_use]
    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id() == id)
    }

    #[must_use]
    pub fn network(&self) -> Option<&NetworkBoundary> {
        self.resources.iter().find_map(|r| match r {
            Resource::Network(n) => Some(n),
            _ => None,
        })
    }

    #[must_use]
    pub fn storage(&self) -> Option<&MountedStorage> {
        self.resources.iter().find_map(|r| match r {
            Resource::Storage(s) => Some(s),
            _ => None,
        })
    }

    #[must_use]
    pub fn access_point(&self) -> Option<&AccessPoint> {
        self.resources.iter().find_map(|r| match r {
            Resource::AccessPoint(a) => Some(a),
            _ => None,
        })
    }

    #[must_use]
    pub fn compute(&self) -> Option<&ComputeUnit> {
        self.resources.iter().find_map(|r| match r {
            Resource::Compute(c) => Some(c),
            _ => None,
        })
    }

    /// Re-check every cross-resource invariant of the graph.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ComposeError> {
        validate_stack_name(&self.name)?;

        let mut position: HashMap<&LogicalId, usize> = HashMap::new();
        for (idx, resource) in self.resources.iter().enumerate() {
            if position.insert(resource.id(), idx).is_some() {
                return Err(ComposeError::DuplicateId(resource.id().to_string()));
            }
            for dep in resource.dependencies() {
                if !position.contains_key(dep) {
                    return Err(ComposeError::UndeclaredReference {
                        resource: resource.id().to_string(),
                        missing: dep.to_string(),
                    });
                }
            }
        }

        for resource in &self.resources {
            match resource {
                Resource::AccessPoint(ap) => self.check_access_point(ap)?,
                Resource::Compute(compute) => check_compute(compute)?,
                Resource::Network(_) | Resource::Storage(_) => {}
            }
        }
        Ok(())
    }

    fn check_access_point(&self, ap: &AccessPoint) -> Result<(), ComposeError> {
        if !ap.root_path.starts_with('/') {
            return Err(ComposeError::InvalidRootPath(ap.root_path.clone()));
        }
        if let Some(Resource::Storage(storage)) = self.get(&ap.storage)
            && storage.network != ap.network
        {
            return Err(ComposeError::StoragePlacement {
                access_point: ap.id.to_string(),
                storage: storage.id.to_string(),
                network: ap.network.to_string(),
            });
        }
        if ap.owner != ap.posix_user {
            return Err(ComposeError::IdentityMismatch {
                access_point: ap.id.to_string(),
                role: "root directory owner",
                expected: ap.posix_user,
                found: ap.owner,
            });
        }
        Ok(())
    }
}

/// Colocation and identity checks for a compute unit's mount.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn check_compute(compute: &ComputeUnit) -> Result<(), ComposeError> {
    let Some(ap) = compute.mount.access_point() else {
        return Ok(());
    };
    if let Some(path) = compute.mount.path() {
        validate_mount_path(path)?;
    }
    let Some(network) = &compute.network else {
        return Err(ComposeError::MountRequiresNetwork {
            compute: compute.id.to_string(),
            access_point: ap.id.to_string(),
        });
    };
    if *network != ap.network {
        return Err(ComposeError::NetworkMismatch {
            compute: compute.id.to_string(),
            compute_network: network.to_string(),
            access_point: ap.id.to_string(),
            storage_network: ap.network.to_string(),
        });
    }
    if compute.execution_identity != ap.posix_user {
        return Err(ComposeError::IdentityMismatch {
            access_point: ap.id.to_string(),
            role: "function execution identity",
            expected: ap.posix_user,
            found: compute.execution_identity,
        });
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
