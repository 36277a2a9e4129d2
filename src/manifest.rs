//! Append-only record of created artifacts.
//!
//! The manifest is a JSON Lines file in the project root.  The first line is
//! a header, every further line one created artifact:
//!
//! ```text
//! {"record":"header","version":1,"project":"demo","created_at":"2026-01-01T00:00:00Z"}
//! {"record":"entry","kind":"directory","path":"R","created_at":"2026-01-01T00:00:00Z"}
//! {"record":"entry","kind":"file","path":"NAMESPACE","created_at":"…","sha256":"…"}
//! ```
//!
//! Each record is flushed to disk before [`ManifestWriter::record`] returns,
//! so an interrupted run leaves a manifest that covers everything created.
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalogue::PathKind;
use crate::error::ManifestError;

/// File name of the manifest in the project root.
pub const MANIFEST_FILE: &str = ".rscaffold-manifest.jsonl";

/// Current manifest format version.
pub const FORMAT_VERSION: u32 = 1;

/// First record of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Format version.
    pub version: u32,
    /// Project name at creation time.
    pub project: String,
    /// When the manifest was started.
    pub created_at: DateTime<Utc>,
}

/// One created artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Artifact kind.
    pub kind: PathKind,
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Content digest for file-like artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ManifestEntry {
    /// Entry stamped with the current time.
    #[must_use]
    pub fn now(kind: PathKind, path: impl Into<PathBuf>, sha256: Option<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            created_at: Utc::now(),
            sha256,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record {
    Header(Header),
    Entry(ManifestEntry),
}

/// Path of the manifest for a project root.
#[must_use]
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ManifestError + '_ {
    move |source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn encode(record: &Record) -> String {
    // Records hold only strings, paths and timestamps, which always encode.
    let mut line = serde_json::to_string(record).unwrap_or_default();
    line.push('\n');
    line
}

/// Appends entries to a manifest, syncing after every write.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    file: File,
}

impl ManifestWriter {
    /// Open the manifest in `root` for appending, writing a header first if
    /// the file is new.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be opened or written.
    pub fn open(root: &Path, project: &str) -> Result<Self, ManifestError> {
        let path = manifest_path(root);
        let fresh = fs::symlink_metadata(&path).is_err();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error(&path))?;
        let mut writer = Self { path, file };
        if fresh {
            writer.append(&Record::Header(Header {
                version: FORMAT_VERSION,
                project: project.to_string(),
                created_at: Utc::now(),
            }))?;
        }
        Ok(writer)
    }

    /// Location of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and flush it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the write or sync fails.
    pub fn record(&mut self, entry: &ManifestEntry) -> Result<(), ManifestError> {
        self.append(&Record::Entry(entry.clone()))
    }

    fn append(&mut self, record: &Record) -> Result<(), ManifestError> {
        self.file
            .write_all(encode(record).as_bytes())
            .map_err(io_error(&self.path))?;
        self.file.sync_data().map_err(io_error(&self.path))
    }
}

/// A manifest read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Header record, if present.
    pub header: Option<Header>,
    /// Entries in creation order.
    pub entries: Vec<ManifestEntry>,
}

/// Read the manifest in `root`.
///
/// A truncated final line (a write interrupted mid-record) is ignored.
///
/// # Errors
///
/// Returns [`ManifestError::Missing`] when there is no manifest,
/// [`ManifestError::Io`] when it cannot be read and
/// [`ManifestError::Malformed`] for an undecodable record.
pub fn read(root: &Path) -> Result<Manifest, ManifestError> {
    let path = manifest_path(root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ManifestError::Missing(path));
        }
        Err(source) => return Err(ManifestError::Io { path, source }),
    };

    let complete = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let mut manifest = Manifest::default();
    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(Record::Header(header)) => manifest.header = Some(header),
            Ok(Record::Entry(entry)) => manifest.entries.push(entry),
            Err(_) if !complete && idx + 1 == lines.len() => {}
            Err(source) => {
                return Err(ManifestError::Malformed {
                    path,
                    line: idx + 1,
                    source,
                });
            }
        }
    }
    Ok(manifest)
}

/// Replace the manifest in `root` with `manifest`, atomically.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] if the replacement cannot be written.
pub fn rewrite(root: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let path = manifest_path(root);
    let tmp = root.join(format!("{MANIFEST_FILE}.tmp"));
    let mut text = String::new();
    if let Some(header) = &manifest.header {
        text.push_str(&encode(&Record::Header(header.clone())));
    }
    for entry in &manifest.entries {
        text.push_str(&encode(&Record::Entry(entry.clone())));
    }
    let mut file = File::create(&tmp).map_err(io_error(&tmp))?;
    file.write_all(text.as_bytes()).map_err(io_error(&tmp))?;
    file.sync_data().map_err(io_error(&tmp))?;
    fs::rename(&tmp, &path).map_err(io_error(&path))
}
