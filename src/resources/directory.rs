//! Directory resource.
use std::io::ErrorKind;
use std::path::PathBuf;

use super::helpers::fs::{Existing, existing_kind};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ArtifactError;

/// A single directory (parents are created separately).
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    /// Absolute directory path.
    pub path: PathBuf,
}

impl DirectoryResource {
    /// Create a new directory resource.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        format!("{}/", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange, ArtifactError> {
        match existing_kind(&self.path) {
            Some(Existing::Directory) => return Ok(ResourceChange::AlreadyCorrect),
            Some(_) => {
                return Ok(ResourceChange::Skipped {
                    reason: "a non-directory object is in the way".to_string(),
                });
            }
            None => {}
        }
        std::fs::create_dir(&self.path).map_err(|source| ArtifactError::CreateDir {
            path: self.path.clone(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange, ArtifactError> {
        match existing_kind(&self.path) {
            None => return Ok(ResourceChange::AlreadyCorrect),
            Some(Existing::Directory) => {}
            Some(_) => {
                return Ok(ResourceChange::Skipped {
                    reason: "no longer a directory".to_string(),
                });
            }
        }
        match std::fs::remove_dir(&self.path) {
            Ok(()) => Ok(ResourceChange::Applied),
            Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => Ok(ResourceChange::Skipped {
                reason: "directory not empty".to_string(),
            }),
            Err(source) => Err(ArtifactError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> ResourceState {
        match existing_kind(&self.path) {
            None => ResourceState::Missing,
            Some(Existing::Directory) => ResourceState::Correct,
            Some(_) => ResourceState::Invalid {
                reason: "a non-directory object is in the way".to_string(),
            },
        }
    }
}
