//! The contract between the composer and the handler about where the
//! filesystem is mounted and what the handler writes there.

use thiserror::Error;

/// Environment variable carrying the mount path into the function.
pub const MOUNT_PATH_ENV: &str = "EFS_MOUNT_PATH";

/// Mount path the handler falls back to when `EFS_MOUNT_PATH` is unset.
pub const DEFAULT_MOUNT_PATH: &str = "/mnt/filesystem";

/// Mount path used by the mounted stack variant.
pub const MODELS_MOUNT_PATH: &str = "/mnt/models";

/// Root of the access point inside the filesystem.
pub const ACCESS_POINT_ROOT: &str = "/export/lambda";

pub const PROBE_FILE_NAME: &str = "test.txt";
pub const PROBE_CONTENT: &str = "Test123";

/// Handler response for the text read back from the mount.
#[must_use]
pub fn greeting(text: &str) -> String {
    format!("Hello Lambda! {text}")
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountPathError {
    #[error("mount path '{0}' must be absolute")]
    NotAbsolute(String),

    #[error("mount path '{0}' must be below /mnt/")]
    OutsideMnt(String),

    #[error("mount path '{0}' must not contain '..' or empty segments")]
    Unnormalized(String),
}

/// Validates a local mount path for a function.
///
/// The function service only accepts paths of the form `/mnt/<name>[/...]`.
pub fn validate_mount_path(path: &str) -> Result<(), MountPathError> {
    if !path.starts_with('/') {
        return Err(MountPathError::NotAbsolute(path.to_string()));
    }
    let rest = path
        .strip_prefix("/mnt/")
        .ok_or_else(|| MountPathError::OutsideMnt(path.to_string()))?;
    if rest.is_empty() {
        return Err(MountPathError::OutsideMnt(path.to_string()));
    }
    if rest.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(MountPathError::Unnormalized(path.to_string()));
    }
    Ok(())
}
