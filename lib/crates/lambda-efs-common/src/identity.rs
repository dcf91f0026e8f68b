use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric POSIX owner/group pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PosixIdentity {
    pub uid: u32,
    pub gid: u32,
}

impl PosixIdentity {
    #[must_use]
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

impl fmt::Display for PosixIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// Identity the function runs file operations as.
///
/// The access point enforces this same identity and creates its root
/// directory owned by it. If the two ever drift apart, writes on the mount
/// fail at invocation time with a permission error.
pub const FUNCTION_IDENTITY: PosixIdentity = PosixIdentity::new(1001, 1001);

/// Mode of the access point root directory when the filesystem creates it.
pub const ACCESS_POINT_PERMISSIONS: Permissions = Permissions(0o750);

/// POSIX permission bits (`0o000`..=`0o7777`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permissions(u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermissionsError {
    #[error("invalid permission mode '{0}': expected 3 or 4 octal digits")]
    Malformed(String),
}

impl Permissions {
    /// Parse an octal mode such as `"750"` or `"0750"`.
    pub fn parse_octal(text: &str) -> Result<Self, PermissionsError> {
        let digits = text.strip_prefix("0o").unwrap_or(text);
        let octal = digits.bytes().all(|b| (b'0'..=b'7').contains(&b));
        if !(3..=4).contains(&digits.len()) || !octal {
            return Err(PermissionsError::Malformed(text.to_string()));
        }
        u32::from_str_radix(digits, 8)
            .map(Self)
            .map_err(|_| PermissionsError::Malformed(text.to_string()))
    }

    #[must_use]
    pub const fn mode(self) -> u32 {
        self.0
    }
}

/// Renders as bare octal digits (`750`), the form the filesystem API takes.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl Serialize for Permissions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_octal(&text).map_err(serde::de::Error::custom)
    }
}
