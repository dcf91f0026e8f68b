//! Infrastructure composer: the composition root and its three build steps.
//!
//! Each step declares its resources on the shared `StackGraph` and returns
//! the reference the next step consumes. Composition is single-shot: a graph
//! is built once per deployment and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use lambda_efs_common::{
    ACCESS_POINT_PERMISSIONS, ACCESS_POINT_ROOT, FUNCTION_IDENTITY, MODELS_MOUNT_PATH,
    MOUNT_PATH_ENV,
};

use crate::domain::resources::{
    AccessPoint, Architecture, CodeBundle, ComputeUnit, LogicalId, Mount, MountedStorage,
    NetworkBoundary, RemovalPolicy, Resource, Runtime,
};
use crate::domain::ComposeError;
use crate::domain::stack::{Checkpoint, ComposeSettings, StackGraph, StackVariant, check_compute};

pub const NETWORK_ID: &str = "Vpc";
pub const STORAGE_ID: &str = "Efs";
pub const ACCESS_POINT_ID: &str = "EfsAccessPoint";
pub const COMPUTE_ID: &str = "LambdaWithEfs";

const NETWORK_CIDR: &str = "10.0.0.0/16";
const NETWORK_MAX_AZS: u8 = 2;
const FILE_SYSTEM_NAME: &str = "DryerPredictionsEFS";
const ENTRY_POINT: &str = "bootstrap";
const MEMORY_MB: u32 = 128;
const TIMEOUT_SECS: u32 = 10;

/// Declare the network boundary.
///
/// # Errors
///
/// Returns an error if the graph already holds a resource with the same id.
pub fn build_network_boundary(graph: &mut StackGraph) -> Result<NetworkBoundary, ComposeError> {
    let network = NetworkBoundary {
        id: LogicalId::new(NETWORK_ID)?,
        cidr: NETWORK_CIDR.to_string(),
        max_azs: NETWORK_MAX_AZS,
    };
    graph.declare(Resource::Network(network.clone()))?;
    graph.reach(Checkpoint::NetworkReady);
    tracing::debug!(
        stack = %graph.name,
        network = %network.id,
        checkpoint = "network-ready",
        "network boundary declared",
    );
    Ok(network)
}

/// Declare the filesystem inside `network` and derive its single access point.
///
/// # Errors
///
/// Returns an error if `network` was not declared on `graph` first.
pub fn build_mounted_storage(
    graph: &mut StackGraph,
    network: &NetworkBoundary,
) -> Result<AccessPoint, ComposeError> {
    let storage = MountedStorage {
        id: LogicalId::new(STORAGE_ID)?,
        network: network.id.clone(),
        name: FILE_SYSTEM_NAME.to_string(),
        removal_policy: RemovalPolicy::Destroy,
        encrypted: true,
    };
    let access_point = AccessPoint {
        id: LogicalId::new(ACCESS_POINT_ID)?,
        storage: storage.id.clone(),
        network: network.id.clone(),
        root_path: ACCESS_POINT_ROOT.to_string(),
        owner: FUNCTION_IDENTITY,
        permissions: ACCESS_POINT_PERMISSIONS,
        posix_user: FUNCTION_IDENTITY,
    };

    graph.declare(Resource::Storage(storage))?;
    graph.declare(Resource::AccessPoint(access_point.clone()))?;
    graph.reach(Checkpoint::StorageReady);
    tracing::debug!(
        stack = %graph.name,
        access_point = %access_point.id,
        root = %access_point.root_path,
        identity = %access_point.posix_user,
        checkpoint = "storage-ready",
        "mounted storage declared",
    );
    Ok(access_point)
}

/// Declare the function, optionally placed in `network` and mounting storage.
///
/// A bound mount requires `network` to be present and to be the network of
/// the access point's filesystem.
///
/// # Errors
///
/// Returns a `ComposeError` when the mount cannot resolve from the requested
/// placement, or when the mount path is not a valid function mount path.
pub fn build_compute_unit(
    graph: &mut StackGraph,
    network: Option<&NetworkBoundary>,
    mount: Mount,
    code_path: &Path,
    architecture: Architecture,
) -> Result<ComputeUnit, ComposeError> {
    let mut environment = BTreeMap::new();
    if let Some(path) = mount.path() {
        environment.insert(MOUNT_PATH_ENV.to_string(), path.to_string());
    }

    let compute = ComputeUnit {
        id: LogicalId::new(COMPUTE_ID)?,
        runtime: Runtime::ProvidedAl2023,
        architecture,
        entry_point: ENTRY_POINT.to_string(),
        code: CodeBundle {
            path: code_path.to_path_buf(),
        },
        memory_mb: MEMORY_MB,
        timeout_secs: TIMEOUT_SECS,
        network: network.map(|n| n.id.clone()),
        mount,
        execution_identity: FUNCTION_IDENTITY,
        environment,
    };
    check_compute(&compute)?;

    graph.declare(Resource::Compute(compute.clone()))?;
    graph.reach(Checkpoint::ComputeReady);
    tracing::debug!(
        stack = %graph.name,
        compute = %compute.id,
        mount = compute.mount.path().unwrap_or("none"),
        checkpoint = "compute-ready",
        "compute unit declared",
    );
    Ok(compute)
}

/// Composition root: build the resource graph for `settings`.
///
/// # Errors
///
/// Returns the first composition error; a partially built graph is never
/// returned.
pub fn compose(settings: &ComposeSettings) -> Result<StackGraph, ComposeError> {
    let mut graph = StackGraph::new(&settings.stack_name, settings.variant)?;

    match settings.variant {
        StackVariant::Mounted => {
            let network = build_network_boundary(&mut graph)?;
            let access_point = build_mounted_storage(&mut graph, &network)?;
            build_compute_unit(
                &mut graph,
                Some(&network),
                Mount::bound(&access_point, MODELS_MOUNT_PATH),
                &settings.code_path,
                settings.architecture,
            )?;
        }
        StackVariant::ComputeOnly => {
            build_compute_unit(
                &mut graph,
                None,
                Mount::None,
                &settings.code_path,
                settings.architecture,
            )?;
        }
    }

    graph.validate()?;
    tracing::info!(
        stack = %graph.name,
        variant = %graph.variant,
        resources = graph.resources().len(),
        "stack composed",
    );
    Ok(graph)
}
