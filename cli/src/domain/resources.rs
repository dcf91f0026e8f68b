//! Resource entities declared by the composer.
//!
//! These are configuration objects, not runtime data. Each one is created
//! once per composition and never mutated after it is declared.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use lambda_efs_common::{Permissions, PosixIdentity};
use serde::{Deserialize, Serialize};

use crate::domain::error::ComposeError;

// ── Identifiers ──────────────────────────────────────────────────────────────

/// Logical identifier of a resource inside a stack.
///
/// 1-255 ASCII alphanumerics, the shape the provisioning backend accepts
/// for template keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// # Errors
    ///
    /// Returns `ComposeError::InvalidLogicalId` for empty, over-long or
    /// non-alphanumeric ids.
    pub fn new(id: &str) -> Result<Self, ComposeError> {
        if id.is_empty() || id.len() > 255 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ComposeError::InvalidLogicalId(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a child id, e.g. `Efs` + `MountTarget1` → `EfsMountTarget1`.
    #[must_use]
    pub fn child(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.0)
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Policies and runtime tags ────────────────────────────────────────────────

/// What happens to a resource when the stack is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Delete with the stack; nothing outlives the deployment.
    Destroy,
}

impl RemovalPolicy {
    /// Value of `DeletionPolicy` / `UpdateReplacePolicy` in a template.
    #[must_use]
    pub fn as_template_policy(self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Runtime {
    #[serde(rename = "provided.al2023")]
    ProvidedAl2023,
}

impl Runtime {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProvidedAl2023 => "provided.al2023",
        }
    }
}

/// Instruction set the code bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

pub const VALID_ARCHITECTURES: &[&str] = &["x86_64", "arm64"];

impl Architecture {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Self::X86_64),
            "arm64" => Ok(Self::Arm64),
            other => Err(format!(
                "unknown architecture '{other}' (valid: {})",
                VALID_ARCHITECTURES.join(", ")
            )),
        }
    }
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// Isolated virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkBoundary {
    pub id: LogicalId,
    pub cidr: String,
    /// Number of availability zones that get a subnet.
    pub max_azs: u8,
}

/// Network filesystem placed inside a `NetworkBoundary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountedStorage {
    pub id: LogicalId,
    pub network: LogicalId,
    pub name: String,
    pub removal_policy: RemovalPolicy,
    pub encrypted: bool,
}

/// Identity-enforced entry path into a `MountedStorage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPoint {
    pub id: LogicalId,
    pub storage: LogicalId,
    /// Network of the backing storage; mounts must come from here.
    pub network: LogicalId,
    pub root_path: String,
    /// Owner of the root directory when the filesystem creates it.
    pub owner: PosixIdentity,
    pub permissions: Permissions,
    /// Identity every client operation through this access point runs as.
    pub posix_user: PosixIdentity,
}

/// How a compute unit sees storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "binding", rename_all = "snake_case")]
pub enum Mount {
    None,
    Bound {
        access_point: AccessPoint,
        path: String,
    },
}

impl Mount {
    #[must_use]
    pub fn bound(access_point: &AccessPoint, path: &str) -> Self {
        Self::Bound {
            access_point: access_point.clone(),
            path: path.to_string(),
        }
    }

    #[must_use]
    pub fn access_point(&self) -> Option<&AccessPoint> {
        match self {
            Self::None => None,
            Self::Bound { access_point, .. } => Some(access_point),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Bound { path, .. } => Some(path),
        }
    }
}

/// Directory holding the packaged function code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBundle {
    pub path: PathBuf,
}

/// Serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeUnit {
    pub id: LogicalId,
    pub runtime: Runtime,
    pub architecture: Architecture,
    pub entry_point: String,
    pub code: CodeBundle,
    pub memory_mb: u32,
    pub timeout_secs: u32,
    pub network: Option<LogicalId>,
    pub mount: Mount,
    pub execution_identity: PosixIdentity,
    pub environment: BTreeMap<String, String>,
}

// ── Resource sum type ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    Storage,
    AccessPoint,
    Compute,
}

impl ResourceKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Storage => "storage",
            Self::AccessPoint => "access point",
            Self::Compute => "compute",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
    Network(NetworkBoundary),
    Storage(MountedStorage),
    AccessPoint(AccessPoint),
    Compute(ComputeUnit),
}

impl Resource {
    #[must_use]
    pub fn id(&self) -> &LogicalId {
        match self {
            Self::Network(n) => &n.id,
            Self::Storage(s) => &s.id,
            Self::AccessPoint(a) => &a.id,
            Self::Compute(c) => &c.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Network(_) => ResourceKind::Network,
            Self::Storage(_) => ResourceKind::Storage,
            Self::AccessPoint(_) => ResourceKind::AccessPoint,
            Self::Compute(_) => ResourceKind::Compute,
        }
    }

    /// Resources that must be declared before this one.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&LogicalId> {
        match self {
            Self::Network(_) => Vec::new(),
            Self::Storage(s) => vec![&s.network],
            Self::AccessPoint(a) => vec![&a.storage],
            Self::Compute(c) => c
                .network
                .iter()
                .chain(c.mount.access_point().map(|ap| &ap.id))
                .collect(),
        }
    }
}
