//! Filesystem infrastructure: implements `LocalFs` and `AssetHasher`.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::AssetHasher;

/// Production filesystem implementation of the `LocalFs` port.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing file {}", path.display()))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
    }
}

impl AssetHasher for LocalFs {
    fn hash_dir(&self, path: &Path) -> Result<String> {
        sha256_tree(path)
    }
}

/// SHA-256 over a code bundle.
///
/// For a directory, every regular file contributes its path relative to
/// `root` (with `/` separators), a NUL byte, then its contents, in sorted
/// path order. A single file contributes its file name and contents.
///
/// # Errors
///
/// Returns an error if `root` or any file below it cannot be read.
pub fn sha256_tree(root: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    if root.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        hash_entry(&mut hasher, &name, root)?;
        return Ok(hex_encode(&hasher.finalize()));
    }

    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    let mut entries: Vec<(String, PathBuf)> = files
        .into_iter()
        .map(|p| {
            let rel = p
                .strip_prefix(root)
                .unwrap_or(&p)
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (rel, p)
        })
        .collect();
    entries.sort();

    for (rel, path) in &entries {
        hash_entry(&mut hasher, rel, path)?;
    }
    Ok(hex_encode(&hasher.finalize()))
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let path = entry.context("reading directory entry")?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Reads the file in 64 KB chunks to avoid loading large binaries into memory.
fn hash_entry(hasher: &mut Sha256, name: &str, path: &Path) -> Result<()> {
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    let mut file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file.read(&mut buf).context("reading file")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
