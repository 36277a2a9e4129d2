//! Dotfile resource: a copy of a personal configuration file.
use std::io::ErrorKind;
use std::path::PathBuf;

use super::file::FileResource;
use super::helpers::fs::{existing_kind, write_new};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ArtifactError;

/// Copies `source` to `target` once.
#[derive(Debug, Clone)]
pub struct DotfileResource {
    /// File in the dotfiles directory.
    pub source: PathBuf,
    /// Absolute destination in the project root.
    pub target: PathBuf,
}

impl DotfileResource {
    /// Create a new dotfile resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// `true` when the source file exists.
    #[must_use]
    pub fn source_exists(&self) -> bool {
        self.source.is_file()
    }
}

impl Applicable for DotfileResource {
    fn description(&self) -> String {
        format!("{} (from {})", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange, ArtifactError> {
        if existing_kind(&self.target).is_some() {
            return Ok(ResourceChange::Skipped {
                reason: "already exists".to_string(),
            });
        }
        let content = match std::fs::read(&self.source) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(ResourceChange::Skipped {
                    reason: format!("no {} in dotfiles directory", self.source.display()),
                });
            }
            Err(source) => {
                return Err(ArtifactError::Write {
                    path: self.target.clone(),
                    source,
                });
            }
        };
        match write_new(&self.target, &content) {
            Ok(()) => Ok(ResourceChange::Applied),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(ResourceChange::Skipped {
                reason: "already exists".to_string(),
            }),
            Err(source) => Err(ArtifactError::Write {
                path: self.target.clone(),
                source,
            }),
        }
    }

    fn remove(&self) -> Result<ResourceChange, ArtifactError> {
        FileResource::new(self.target.clone(), Vec::new()).remove()
    }
}

impl Resource for DotfileResource {
    fn current_state(&self) -> ResourceState {
        match std::fs::read(&self.source) {
            Ok(content) => FileResource::new(self.target.clone(), content).current_state(),
            Err(_) if existing_kind(&self.target).is_none() => ResourceState::Invalid {
                reason: "source missing".to_string(),
            },
            Err(_) => ResourceState::Incorrect {
                current: "exists, source missing".to_string(),
            },
        }
    }
}
