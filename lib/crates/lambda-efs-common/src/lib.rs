pub mod identity;
pub mod mount;

pub use identity::{
    ACCESS_POINT_PERMISSIONS, FUNCTION_IDENTITY, Permissions, PermissionsError, PosixIdentity,
};
pub use mount::{
    ACCESS_POINT_ROOT, DEFAULT_MOUNT_PATH, MODELS_MOUNT_PATH, MOUNT_PATH_ENV, MountPathError,
    PROBE_CONTENT, PROBE_FILE_NAME, greeting, validate_mount_path,
};
