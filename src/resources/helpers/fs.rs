//! File-system resource helpers.
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

/// What occupies a path, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    /// A regular file (or any other non-directory object).
    File,
    /// A real directory.
    Directory,
    /// A symbolic link, possibly dangling.
    Symlink,
}

/// Inspect `path` without following symlinks.
#[must_use]
pub fn existing_kind(path: &Path) -> Option<Existing> {
    let meta = std::fs::symlink_metadata(path).ok()?;
    Some(if meta.file_type().is_symlink() {
        Existing::Symlink
    } else if meta.is_dir() {
        Existing::Directory
    } else {
        Existing::File
    })
}

/// Whether `rel` stays under the directory it is joined to: relative, made
/// only of plain components, and not empty.
#[must_use]
pub fn is_confined(rel: &Path) -> bool {
    rel.components().next().is_some()
        && rel
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}

/// Ancestors of `rel` (relative to `root`) that do not exist yet,
/// shallowest first.  `rel` itself is not included.
#[must_use]
pub fn missing_ancestors(root: &Path, rel: &Path) -> Vec<PathBuf> {
    let mut missing: Vec<PathBuf> = rel
        .ancestors()
        .skip(1)
        .filter(|a| !a.as_os_str().is_empty())
        .take_while(|a| existing_kind(&root.join(a)).is_none())
        .map(Path::to_path_buf)
        .collect();
    missing.reverse();
    missing
}

/// Write `content` to a file that must not exist yet.
///
/// # Errors
///
/// Fails with [`io::ErrorKind::AlreadyExists`] if anything is at `path`, or
/// with the underlying error if the file cannot be written.
pub fn write_new(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(content)?;
    file.sync_data()
}

/// Remove an existing file or symlink at `path`, including broken symlinks.
///
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> io::Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

/// Lower-case hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// SHA-256 of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    std::fs::read(path).map(|bytes| sha256_hex(&bytes))
}
