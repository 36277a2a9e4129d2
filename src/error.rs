//! Domain-specific error types for the scaffolding engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ArtifactError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! RscaffoldError
//! ├── Config(ConfigError)    : sources, persistence, key/value validation
//! ├── Scaffold(ScaffoldError): fatal pre-flight failures (conflicts, names)
//! ├── Artifact(ArtifactError): a single create/remove operation
//! └── Manifest(ManifestError): manifest I/O and decoding
//! ```
//!
//! Argument errors are `clap::Error`s and never reach this hierarchy: clap
//! reports them and exits before any filesystem effect.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the scaffolding engine.
#[derive(Error, Debug)]
pub enum RscaffoldError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fatal error raised before scaffolding starts.
    #[error("Scaffolding aborted: {0}")]
    Scaffold(#[from] ScaffoldError),

    /// A single artifact could not be created or removed.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// The manifest could not be read or written.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// Errors that arise from configuration loading, validation and persistence.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The key is not one of the recognized configuration keys.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// The value cannot be interpreted for the key's type.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Dotted key name.
        key: String,
        /// Value as supplied.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A present configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Unreadable {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file could not be written.
    #[error("cannot write config file {path}: {source}")]
    Unwritable {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `config init` refused to replace an existing file.
    #[error("config file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

/// Fatal errors that stop a scaffolding run before anything is written.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// Blocking conflicts exist and the user did not confirm.
    #[error("{count} blocking conflict(s) not confirmed; nothing was written")]
    ConflictDeclined {
        /// Number of blocking conflicts.
        count: usize,
    },

    /// The resolved project name is not usable as an R package name.
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName {
        /// Offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No project name could be derived from the target directory.
    #[error("cannot derive a project name from {0}; pass --project-name")]
    NoProjectName(PathBuf),
}

/// Errors that arise from a single artifact operation.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// A directory could not be created.
    #[error("create directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("write {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A symlink could not be created or replaced.
    #[error("symlink {path}: {source}")]
    Symlink {
        /// Link path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An artifact could not be removed.
    #[error("remove {path}: {source}")]
    Remove {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from manifest I/O.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file could not be opened, appended or synced.
    #[error("manifest I/O on {path}: {source}")]
    Io {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A manifest line is not a valid record.
    #[error("malformed manifest record at {path}:{line}: {source}")]
    Malformed {
        /// Manifest path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// No manifest exists in the target directory.
    #[error("no manifest found at {0}; nothing to reverse")]
    Missing(PathBuf),
}
