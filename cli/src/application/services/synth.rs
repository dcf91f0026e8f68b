//! Template synthesis: expand a composed `StackGraph` into the concrete
//! provider resources each entity needs.
//!
//! Pure and deterministic: the same graph and asset always render the same
//! bytes.

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::domain::resources::{
    AccessPoint, ComputeUnit, LogicalId, MountedStorage, NetworkBoundary, Resource,
};
use crate::domain::stack::{StackGraph, StackVariant};
use crate::domain::template::{
    Template, TemplateResource, get_att, reference, select_az, sub,
};
use crate::domain::ComposeError;

/// NFS port the filesystem's mount targets listen on.
const NFS_PORT: u16 = 2049;

const BASIC_EXECUTION_POLICY: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";
const VPC_EXECUTION_POLICY: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaVPCAccessExecutionRole";

/// Local code bundle referenced by the function resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub path: String,
    /// SHA-256 hex digest of the bundle contents.
    pub hash: String,
}

/// Expand `graph` into a template.
///
/// # Errors
///
/// Returns an error if the graph violates an invariant.
pub fn synthesize(graph: &StackGraph, asset: Option<&AssetRef>) -> Result<Template, ComposeError> {
    graph.validate()?;

    let description = match graph.variant {
        StackVariant::Mounted => format!(
            "{} (mounted): network, filesystem with access point, and a function mounting it",
            graph.name
        ),
        StackVariant::ComputeOnly => format!("{} (compute-only): function only", graph.name),
    };
    let mut template = Template::new(description);

    for resource in graph.resources() {
        match resource {
            Resource::Network(network) => add_network(&mut template, network),
            Resource::Storage(storage) => {
                let network = network_of(graph, &storage.id, &storage.network)?;
                add_storage(&mut template, storage, network);
            }
            Resource::AccessPoint(ap) => add_access_point(&mut template, ap),
            Resource::Compute(compute) => add_compute(&mut template, graph, compute, asset)?,
        }
    }

    tracing::debug!(
        stack = %graph.name,
        resources = template.resources.len(),
        "template synthesized",
    );
    Ok(template)
}

/// Render a template as pretty-printed JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(template: &Template) -> Result<String> {
    let mut out = serde_json::to_string_pretty(template).context("serializing template")?;
    out.push('\n');
    Ok(out)
}

// ── Per-entity expansion ─────────────────────────────────────────────────────

fn network_of<'a>(
    graph: &'a StackGraph,
    owner: &LogicalId,
    id: &LogicalId,
) -> Result<&'a NetworkBoundary, ComposeError> {
    match graph.get(id) {
        Some(Resource::Network(n)) => Ok(n),
        _ => Err(ComposeError::UndeclaredReference {
            resource: owner.to_string(),
            missing: id.to_string(),
        }),
    }
}

fn subnet_ids(network: &NetworkBoundary) -> Vec<String> {
    (1..=network.max_azs)
        .map(|n| network.id.child(&format!("PrivateSubnet{n}")))
        .collect()
}

fn mount_target_ids(storage: &LogicalId, network: &NetworkBoundary) -> Vec<String> {
    (1..=network.max_azs)
        .map(|n| storage.child(&format!("MountTarget{n}")))
        .collect()
}

fn security_group_id(owner: &LogicalId) -> String {
    owner.child("SecurityGroup")
}

fn add_network(template: &mut Template, network: &NetworkBoundary) {
    let vpc = network.id.as_str();
    template.add(
        vpc,
        TemplateResource::new(
            "AWS::EC2::VPC",
            json!({
                "CidrBlock": network.cidr,
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
                "Tags": [{ "Key": "Name", "Value": sub(&format!("${{AWS::StackName}}/{vpc}")) }],
            }),
        ),
    );

    // One isolated /18 per availability zone, carved out of the VPC block.
    for (index, subnet) in subnet_ids(network).into_iter().enumerate() {
        template.add(
            subnet,
            TemplateResource::new(
                "AWS::EC2::Subnet",
                json!({
                    "VpcId": reference(vpc),
                    "AvailabilityZone": select_az(index),
                    "CidrBlock": {
                        "Fn::Select": [
                            index,
                            { "Fn::Cidr": [get_att(vpc, "CidrBlock"), network.max_azs, "14"] }
                        ]
                    },
                    "MapPublicIpOnLaunch": false,
                }),
            ),
        );
    }

    template.output("VpcId", "Network boundary id", reference(vpc));
}

fn add_storage(template: &mut Template, storage: &MountedStorage, network: &NetworkBoundary) {
    let fs = storage.id.as_str();
    let sg = security_group_id(&storage.id);

    template.add(
        sg.clone(),
        TemplateResource::new(
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": format!("{fs} mount targets"),
                "VpcId": reference(network.id.as_str()),
            }),
        ),
    );

    template.add(
        fs,
        TemplateResource::new(
            "AWS::EFS::FileSystem",
            json!({
                "Encrypted": storage.encrypted,
                "PerformanceMode": "generalPurpose",
                "ThroughputMode": "bursting",
                "FileSystemTags": [{ "Key": "Name", "Value": storage.name }],
            }),
        )
        .with_policy(storage.removal_policy.as_template_policy()),
    );

    for (subnet, target) in subnet_ids(network)
        .into_iter()
        .zip(mount_target_ids(&storage.id, network))
    {
        template.add(
            target,
            TemplateResource::new(
                "AWS::EFS::MountTarget",
                json!({
                    "FileSystemId": reference(fs),
                    "SubnetId": reference(&subnet),
                    "SecurityGroups": [get_att(&sg, "GroupId")],
                }),
            ),
        );
    }

    template.output("FileSystemId", "Network filesystem id", reference(fs));
}

fn add_access_point(template: &mut Template, ap: &AccessPoint) {
    template.add(
        ap.id.as_str(),
        TemplateResource::new(
            "AWS::EFS::AccessPoint",
            json!({
                "FileSystemId": reference(ap.storage.as_str()),
                "PosixUser": {
                    "Uid": ap.posix_user.uid.to_string(),
                    "Gid": ap.posix_user.gid.to_string(),
                },
                "RootDirectory": {
                    "Path": ap.root_path,
                    "CreationInfo": {
                        "OwnerUid": ap.owner.uid.to_string(),
                        "OwnerGid": ap.owner.gid.to_string(),
                        "Permissions": ap.permissions.to_string(),
                    },
                },
            }),
        ),
    );

    template.output(
        "AccessPointArn",
        "Access point mounted by the function",
        get_att(ap.id.as_str(), "Arn"),
    );
}

fn add_compute(
    template: &mut Template,
    graph: &StackGraph,
    compute: &ComputeUnit,
    asset: Option<&AssetRef>,
) -> Result<(), ComposeError> {
    let function = compute.id.as_str();
    let role = compute.id.child("ServiceRole");
    let network = compute
        .network
        .as_ref()
        .map(|id| network_of(graph, &compute.id, id))
        .transpose()?;

    let mut managed = vec![sub(BASIC_EXECUTION_POLICY)];
    if network.is_some() {
        managed.push(sub(VPC_EXECUTION_POLICY));
    }
    let mut role_props = json!({
        "AssumeRolePolicyDocument": {
            "Version": "2012-10-17",
            "Statement": [{
                "Action": "sts:AssumeRole",
                "Effect": "Allow",
                "Principal": { "Service": "lambda.amazonaws.com" },
            }],
        },
        "ManagedPolicyArns": managed,
    });
    if let Some(ap) = compute.mount.access_point() {
        role_props["Policies"] = json!([{
            "PolicyName": "FilesystemClientAccess",
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": ["elasticfilesystem:ClientMount", "elasticfilesystem:ClientWrite"],
                    "Resource": get_att(ap.storage.as_str(), "Arn"),
                    "Condition": {
                        "StringEquals": {
                            "elasticfilesystem:AccessPointArn": get_att(ap.id.as_str(), "Arn"),
                        },
                    },
                }],
            },
        }]);
    }
    template.add(role.clone(), TemplateResource::new("AWS::IAM::Role", role_props));

    let mut props = json!({
        "Runtime": compute.runtime.as_str(),
        "Handler": compute.entry_point,
        "Architectures": [compute.architecture.as_str()],
        "Code": compute.code.path.to_string_lossy(),
        "MemorySize": compute.memory_mb,
        "Timeout": compute.timeout_secs,
        "Role": get_att(&role, "Arn"),
    });
    if !compute.environment.is_empty() {
        props["Environment"] = json!({ "Variables": compute.environment });
    }
    let mut depends_on = vec![role];

    if let Some(network) = network {
        let sg = security_group_id(&compute.id);
        template.add(
            sg.clone(),
            TemplateResource::new(
                "AWS::EC2::SecurityGroup",
                json!({
                    "GroupDescription": format!("{function} network interfaces"),
                    "VpcId": reference(network.id.as_str()),
                    "SecurityGroupEgress": [{ "CidrIp": "0.0.0.0/0", "IpProtocol": "-1" }],
                }),
            ),
        );
        let subnets: Vec<Value> = subnet_ids(network).iter().map(|s| reference(s)).collect();
        props["VpcConfig"] = json!({
            "SubnetIds": subnets,
            "SecurityGroupIds": [get_att(&sg, "GroupId")],
        });

        if let (Some(ap), Some(path)) = (compute.mount.access_point(), compute.mount.path()) {
            let ingress = ap.storage.child(&format!("IngressFrom{function}"));
            template.add(
                ingress.clone(),
                TemplateResource::new(
                    "AWS::EC2::SecurityGroupIngress",
                    json!({
                        "GroupId": get_att(&security_group_id(&ap.storage), "GroupId"),
                        "SourceSecurityGroupId": get_att(&sg, "GroupId"),
                        "IpProtocol": "tcp",
                        "FromPort": NFS_PORT,
                        "ToPort": NFS_PORT,
                        "Description": format!("NFS from {function}"),
                    }),
                ),
            );
            props["FileSystemConfigs"] = json!([{
                "Arn": get_att(ap.id.as_str(), "Arn"),
                "LocalMountPath": path,
            }]);
            // The mount only resolves once every mount target is available.
            depends_on.extend(mount_target_ids(&ap.storage, network));
            depends_on.push(ingress);
        }
    }

    let mut resource =
        TemplateResource::new("AWS::Lambda::Function", props).depends_on(depends_on);
    if let Some(asset) = asset {
        resource = resource.with_metadata(json!({
            "aws:asset:path": asset.path,
            "aws:asset:hash": asset.hash,
            "aws:asset:property": "Code",
        }));
    }
    template.add(function, resource);
    template.output("FunctionName", "Deployed function name", reference(function));
    Ok(())
}
