//! Create-only resource primitives (check + apply pattern).
//!
//! Each resource creates exactly one filesystem object and never overwrites
//! anything that already exists, with the single exception of symlinks,
//! which are always regenerated.
pub mod directory;
pub mod dotfile;
pub mod file;
pub mod helpers;
pub mod symlink;

use crate::error::ArtifactError;

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Create the resource.
    ///
    /// This method should:
    /// - Leave any existing non-symlink object untouched
    /// - Assume parent directories already exist
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be created due to I/O failures
    /// or permission issues.
    fn apply(&self) -> Result<ResourceChange, ArtifactError>;

    /// Remove the resource, undoing a previous `apply()`.
    ///
    /// Returns [`ResourceChange::AlreadyCorrect`] when nothing was there and
    /// [`ResourceChange::Skipped`] when the object must be kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the object exists but cannot be removed.
    fn remove(&self) -> Result<ResourceChange, ArtifactError>;
}

/// State of a resource on disk.
///
/// # Examples
///
/// ```
/// use rscaffold_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "points to other".into() };
/// let skip = ResourceState::Invalid { reason: "a directory is in the way".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the path.
    Missing,
    /// The path holds exactly what this resource would create.
    Correct,
    /// An object of the right kind exists with different content.
    Incorrect {
        /// Description of what is there.
        current: String,
    },
    /// An object of a different kind is in the way.
    Invalid {
        /// Why the resource cannot be created.
        reason: String,
    },
}

/// Result of applying or removing a resource.
///
/// # Examples
///
/// ```
/// use rscaffold_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "already exists".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The object was created (or removed).
    Applied,
    /// Nothing new was created: the object was already in place, or a
    /// symlink was regenerated.  For removal: the object was already gone.
    AlreadyCorrect,
    /// The object was left alone.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    fn current_state(&self) -> ResourceState;

    /// Determine if applying would create something.
    fn needs_change(&self) -> bool {
        matches!(self.current_state(), ResourceState::Missing)
    }
}
