//! The invocation handler: write the probe file, read it back, greet.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use lambda_efs_common::{PROBE_CONTENT, PROBE_FILE_NAME, greeting};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl HandlerError {
    /// Value reported as `errorType` to the runtime API.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Write { .. } => "Handler.WriteFailed",
            Self::Read { .. } => "Handler.ReadFailed",
        }
    }
}

/// Handle one invocation against the filesystem mounted at `mount_root`.
///
/// The file is truncated on every call, so repeated invocations leave it
/// holding exactly the probe content. The event is accepted but unused.
pub fn handle(mount_root: &Path, _event: &serde_json::Value) -> Result<String, HandlerError> {
    let path = mount_root.join(PROBE_FILE_NAME);

    write_probe(&path).map_err(|source| HandlerError::Write {
        path: path.clone(),
        source,
    })?;

    let mut text = String::new();
    File::open(&path)
        .and_then(|mut f| f.read_to_string(&mut text))
        .map_err(|source| HandlerError::Read {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "probe file read back");
    Ok(greeting(&text))
}

fn write_probe(path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(PROBE_CONTENT.as_bytes())?;
    file.flush()
}
