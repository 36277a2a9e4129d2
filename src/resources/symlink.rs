//! Symlink resource.
use std::path::{Path, PathBuf};

use super::helpers::fs::{Existing, existing_kind, remove_existing};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ArtifactError;

/// A relative symlink inside the project tree.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// What the link points to, relative to the link's directory.
    pub source: PathBuf,
    /// Absolute path where the link is created.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    fn error(&self, source: std::io::Error) -> ArtifactError {
        ArtifactError::Symlink {
            path: self.target.clone(),
            source,
        }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange, ArtifactError> {
        let replaced = match existing_kind(&self.target) {
            Some(Existing::Symlink) => {
                remove_existing(&self.target).map_err(|e| self.error(e))?;
                true
            }
            Some(_) => {
                return Ok(ResourceChange::Skipped {
                    reason: "a real file or directory is in the way".to_string(),
                });
            }
            None => false,
        };

        create_symlink(&self.source, &self.target).map_err(|e| self.error(e))?;

        Ok(if replaced {
            ResourceChange::AlreadyCorrect
        } else {
            ResourceChange::Applied
        })
    }

    fn remove(&self) -> Result<ResourceChange, ArtifactError> {
        match existing_kind(&self.target) {
            None => Ok(ResourceChange::AlreadyCorrect),
            Some(Existing::Symlink) => {
                remove_symlink(&self.target).map_err(|source| ArtifactError::Remove {
                    path: self.target.clone(),
                    source,
                })?;
                Ok(ResourceChange::Applied)
            }
            Some(_) => Ok(ResourceChange::Skipped {
                reason: "replaced by a real file or directory".to_string(),
            }),
        }
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> ResourceState {
        match existing_kind(&self.target) {
            None => ResourceState::Missing,
            Some(Existing::Symlink) => match std::fs::read_link(&self.target) {
                Ok(existing) if paths_equal(&existing, &self.source) => ResourceState::Correct,
                Ok(existing) => ResourceState::Incorrect {
                    current: format!("points to {}", existing.display()),
                },
                Err(e) => ResourceState::Invalid {
                    reason: format!("unreadable link: {e}"),
                },
            },
            Some(_) => ResourceState::Invalid {
                reason: "target is a real file or directory".to_string(),
            },
        }
    }
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir`.
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        if std::fs::remove_file(path).is_err() {
            return std::fs::remove_dir(path);
        }
        Ok(())
    }
    #[cfg(not(windows))]
    {
        std::fs::remove_file(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn paths_equal_works() {
        let path1 = PathBuf::from("analysis/data");
        let path2 = PathBuf::from("analysis/data");
        assert!(paths_equal(&path1, &path2));
        assert!(!paths_equal(&path1, Path::new("analysis")));
    }

    #[test]
    fn symlink_resource_description() {
        let resource = SymlinkResource::new(PathBuf::from("analysis"), PathBuf::from("/p/a"));
        assert!(resource.description().contains("analysis"));
        assert!(resource.description().contains("/p/a"));
    }

    #[test]
    fn symlink_resource_missing_when_target_not_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let resource = SymlinkResource::new(PathBuf::from("tests"), temp_dir.path().join("t"));
        assert_eq!(resource.current_state(), ResourceState::Missing);
    }

    #[cfg(unix)]
    #[test]
    fn apply_creates_relative_link() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp_dir.path().join("analysis")).unwrap();
        let link = temp_dir.path().join("a");
        let resource = SymlinkResource::new(PathBuf::from("analysis"), link.clone());

        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("analysis"));
        assert!(link.is_dir(), "link should resolve to the directory");
        assert_eq!(resource.current_state(), ResourceState::Correct);
    }

    #[cfg(unix)]
    #[test]
    fn apply_regenerates_existing_link_without_reporting_creation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let link = temp_dir.path().join("a");
        std::os::unix::fs::symlink("elsewhere", &link).unwrap();
        let resource = SymlinkResource::new(PathBuf::from("analysis"), link.clone());

        assert!(matches!(
            resource.current_state(),
            ResourceState::Incorrect { .. }
        ));
        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from("analysis"));
    }

    #[test]
    fn apply_skips_real_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let link = temp_dir.path().join("t");
        std::fs::write(&link, "user data").unwrap();
        let resource = SymlinkResource::new(PathBuf::from("tests"), link.clone());

        assert!(matches!(
            resource.apply().unwrap(),
            ResourceChange::Skipped { .. }
        ));
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "user data");
    }

    #[cfg(unix)]
    #[test]
    fn remove_deletes_only_the_link() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("tests");
        std::fs::create_dir(&dir).unwrap();
        let link = temp_dir.path().join("t");
        let resource = SymlinkResource::new(PathBuf::from("tests"), link.clone());
        resource.apply().unwrap();

        assert_eq!(resource.remove().unwrap(), ResourceChange::Applied);
        assert!(link.symlink_metadata().is_err());
        assert!(dir.is_dir(), "link target must survive");
        assert_eq!(resource.remove().unwrap(), ResourceChange::AlreadyCorrect);
    }
}
