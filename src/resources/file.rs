//! Regular file resource with in-memory content.
use std::io::ErrorKind;
use std::path::PathBuf;

use super::helpers::fs::{Existing, existing_kind, write_new};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ArtifactError;

/// A file written once with fixed content.
#[derive(Debug, Clone)]
pub struct FileResource {
    /// Absolute file path.
    pub path: PathBuf,
    /// Bytes to write.
    pub content: Vec<u8>,
}

impl FileResource {
    /// Create a new file resource.
    #[must_use]
    pub fn new(path: PathBuf, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            content: content.into(),
        }
    }
}

impl Applicable for FileResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange, ArtifactError> {
        if existing_kind(&self.path).is_some() {
            return Ok(ResourceChange::Skipped {
                reason: "already exists".to_string(),
            });
        }
        match write_new(&self.path, &self.content) {
            Ok(()) => Ok(ResourceChange::Applied),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(ResourceChange::Skipped {
                reason: "already exists".to_string(),
            }),
            Err(source) => Err(ArtifactError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn remove(&self) -> Result<ResourceChange, ArtifactError> {
        match existing_kind(&self.path) {
            None => return Ok(ResourceChange::AlreadyCorrect),
            Some(Existing::Directory) => {
                return Ok(ResourceChange::Skipped {
                    reason: "replaced by a directory".to_string(),
                });
            }
            Some(_) => {}
        }
        std::fs::remove_file(&self.path).map_err(|source| ArtifactError::Remove {
            path: self.path.clone(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FileResource {
    fn current_state(&self) -> ResourceState {
        match existing_kind(&self.path) {
            None => ResourceState::Missing,
            Some(Existing::Directory) => ResourceState::Invalid {
                reason: "a directory is in the way".to_string(),
            },
            Some(Existing::Symlink) => ResourceState::Invalid {
                reason: "a symlink is in the way".to_string(),
            },
            Some(Existing::File) => match std::fs::read(&self.path) {
                Ok(bytes) if bytes == self.content => ResourceState::Correct,
                Ok(_) => ResourceState::Incorrect {
                    current: "different content".to_string(),
                },
                Err(e) => ResourceState::Invalid {
                    reason: format!("unreadable: {e}"),
                },
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn apply_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let resource = FileResource::new(dir.path().join("NAMESPACE"), "export()\n");
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.current_state(), ResourceState::Correct);
    }

    #[test]
    fn apply_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "user notes").unwrap();
        let resource = FileResource::new(path.clone(), "generated");
        assert!(matches!(
            resource.apply().unwrap(),
            ResourceChange::Skipped { .. }
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "user notes");
        assert!(matches!(
            resource.current_state(),
            ResourceState::Incorrect { .. }
        ));
    }

    #[test]
    fn apply_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let resource = FileResource::new(dir.path().join("missing").join("f"), "x");
        assert!(matches!(
            resource.apply().unwrap_err(),
            ArtifactError::Write { .. }
        ));
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let resource = FileResource::new(dir.path().join("LICENSE"), "MIT");
        resource.apply().unwrap();
        assert_eq!(resource.remove().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.remove().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn directory_in_the_way_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let resource = FileResource::new(dir.path().to_path_buf(), "x");
        assert!(matches!(
            resource.current_state(),
            ResourceState::Invalid { .. }
        ));
    }
}
