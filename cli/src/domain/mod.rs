//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod resources;
pub mod stack;
pub mod template;

pub use config::{StackConfig, validate_config_key, validate_config_value};
pub use error::{ComposeError, ConfigError, DeployError};
pub use resources::{
    AccessPoint, ComputeUnit, LogicalId, Mount, MountedStorage, NetworkBoundary, Resource,
};
pub use stack::{Checkpoint, ComposeSettings, StackGraph, StackVariant};
pub use template::Template;
