//! Conflict detection: compare planned paths with what is already on disk.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalogue::{CanonicalPath, Catalogue, PathKind};
use crate::error::ScaffoldError;
use crate::prompt::Prompt;
use crate::resources::helpers::fs::{Existing, existing_kind};

/// Directories worth reporting even though the tool would create them, with
/// the files whose presence makes them blocking.
pub const DIRECTORY_ALLOW_LIST: &[(&str, &[&str])] = &[
    (
        ".github",
        &["workflows/r-package.yml", "workflows/render-paper.yml"],
    ),
    (".github/workflows", &["r-package.yml", "render-paper.yml"]),
];

/// What was found at a conflicting path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingKind {
    /// A regular file, or a symlink where a real object is expected.
    File,
    /// A directory.
    Directory,
}

impl fmt::Display for ExistingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
        })
    }
}

/// How serious a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Reported for information; scaffolding proceeds.
    Informational,
    /// Requires confirmation before scaffolding.
    Blocking,
}

/// One pre-existing object at a planned path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    /// The planned path.
    pub path: CanonicalPath,
    /// What is already there.
    pub existing_kind: ExistingKind,
    /// Severity of the conflict.
    pub severity: Severity,
    /// Sentinel file that made an allow-listed directory blocking.
    pub sentinel: Option<PathBuf>,
}

impl fmt::Display for ConflictEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exists as a {} (planned {})",
            self.path.path.display(),
            self.existing_kind,
            self.path.kind
        )?;
        if let Some(sentinel) = &self.sentinel {
            write!(f, ", contains {}", sentinel.display())?;
        }
        Ok(())
    }
}

/// All conflicts found for one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Conflicts in plan order.
    pub entries: Vec<ConflictEntry>,
}

impl ConflictReport {
    /// Blocking conflicts.
    pub fn blocking(&self) -> impl Iterator<Item = &ConflictEntry> {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Blocking)
    }

    /// Informational conflicts.
    pub fn informational(&self) -> impl Iterator<Item = &ConflictEntry> {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Informational)
    }

    /// Number of blocking conflicts.
    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.blocking().count()
    }

    /// `true` when `path` has a blocking conflict.
    #[must_use]
    pub fn blocks(&self, path: &Path) -> bool {
        self.blocking().any(|e| e.path.path == path)
    }

    /// The blocking conflict for `path`, if any.
    #[must_use]
    pub fn blocking_for(&self, path: &Path) -> Option<&ConflictEntry> {
        self.blocking().find(|e| e.path.path == path)
    }

    /// `true` when nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classify one planned path.
fn classify(entry: &CanonicalPath, root: &Path) -> Option<ConflictEntry> {
    let found = existing_kind(&root.join(&entry.path))?;
    let conflict = |existing_kind, severity, sentinel| ConflictEntry {
        path: entry.clone(),
        existing_kind,
        severity,
        sentinel,
    };

    match (entry.kind, found) {
        // Links are always regenerated.
        (PathKind::Symlink, Existing::Symlink) => None,
        (PathKind::Directory, Existing::Directory) => {
            let (_, sentinels) = DIRECTORY_ALLOW_LIST
                .iter()
                .find(|(dir, _)| Path::new(dir) == entry.path)?;
            let sentinel = sentinels
                .iter()
                .map(PathBuf::from)
                .find(|s| existing_kind(&root.join(&entry.path).join(s)).is_some());
            let severity = if sentinel.is_some() {
                Severity::Blocking
            } else {
                Severity::Informational
            };
            Some(conflict(ExistingKind::Directory, severity, sentinel))
        }
        (_, Existing::Directory) => Some(conflict(ExistingKind::Directory, Severity::Blocking, None)),
        (_, Existing::File | Existing::Symlink) => {
            Some(conflict(ExistingKind::File, Severity::Blocking, None))
        }
    }
}

/// Check the given planned paths against the filesystem under `root`.
#[must_use]
pub fn detect_paths<'a>(
    paths: impl IntoIterator<Item = &'a CanonicalPath>,
    root: &Path,
) -> ConflictReport {
    ConflictReport {
        entries: paths.into_iter().filter_map(|p| classify(p, root)).collect(),
    }
}

/// Check every catalogue path against the filesystem under `root`.
#[must_use]
pub fn detect(catalogue: &Catalogue, root: &Path) -> ConflictReport {
    detect_paths(catalogue.iter(), root)
}

/// How the gate was passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Nothing blocking was found.
    Clear,
    /// `--force` was given.
    Forced,
    /// `defaults.skip_confirmation` is set.
    SkippedByConfig,
    /// The user confirmed interactively.
    Confirmed,
}

/// Decide whether scaffolding may proceed past blocking conflicts.
///
/// # Errors
///
/// Returns [`ScaffoldError::ConflictDeclined`] when blocking conflicts exist
/// and the user declined (or could not be asked).
pub fn gate(
    report: &ConflictReport,
    force: bool,
    skip_confirmation: bool,
    prompt: &dyn Prompt,
) -> Result<GateOutcome, ScaffoldError> {
    let count = report.blocking_count();
    if count == 0 {
        return Ok(GateOutcome::Clear);
    }
    if force {
        return Ok(GateOutcome::Forced);
    }
    if skip_confirmation {
        return Ok(GateOutcome::SkippedByConfig);
    }
    let question = format!(
        "{count} existing path(s) would block scaffolding; they will be left untouched. Continue?"
    );
    match prompt.confirm(&question) {
        Ok(true) => Ok(GateOutcome::Confirmed),
        Ok(false) | Err(_) => Err(ScaffoldError::ConflictDeclined { count }),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::prompt::MockPrompt;
    use std::fs;

    fn catalogue() -> Catalogue {
        Catalogue::compute("demo")
    }

    #[test]
    fn empty_directory_has_no_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect(&catalogue(), dir.path()).is_empty());
    }

    #[test]
    fn existing_file_is_blocking() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "mine").unwrap();
        let report = detect(&catalogue(), dir.path());
        assert_eq!(report.entries.len(), 1);
        let entry = &report.entries[0];
        assert_eq!(entry.severity, Severity::Blocking);
        assert_eq!(entry.existing_kind, ExistingKind::File);
        assert!(report.blocks(Path::new("README.md")));
    }

    #[test]
    fn directory_where_file_expected_is_blocking() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Makefile")).unwrap();
        let report = detect(&catalogue(), dir.path());
        assert_eq!(report.blocking_count(), 1);
        assert_eq!(report.entries[0].existing_kind, ExistingKind::Directory);
    }

    #[test]
    fn plain_directories_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("analysis/data")).unwrap();
        fs::create_dir(dir.path().join("R")).unwrap();
        assert!(detect(&catalogue(), dir.path()).is_empty());
    }

    #[test]
    fn allow_listed_directory_without_sentinel_is_informational() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".github")).unwrap();
        let report = detect(&catalogue(), dir.path());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].severity, Severity::Informational);
        assert_eq!(report.blocking_count(), 0);
    }

    #[test]
    fn allow_listed_directory_with_sentinel_is_blocking() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".github/workflows")).unwrap();
        fs::write(dir.path().join(".github/workflows/r-package.yml"), "x").unwrap();
        let report = detect(&catalogue(), dir.path());
        // .github and .github/workflows are blocking, the workflow file itself too.
        assert_eq!(report.blocking_count(), 3);
        let github = report.blocking_for(Path::new(".github")).unwrap();
        assert_eq!(
            github.sentinel.as_deref(),
            Some(Path::new("workflows/r-package.yml"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn existing_symlink_at_link_path_is_not_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("somewhere", dir.path().join("a")).unwrap();
        assert!(detect(&catalogue(), dir.path()).is_empty());
    }

    #[test]
    fn real_file_at_link_path_is_blocking() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("t"), "notes").unwrap();
        let report = detect(&catalogue(), dir.path());
        assert_eq!(report.blocking_count(), 1);
        assert_eq!(report.entries[0].path.kind, PathKind::Symlink);
    }

    fn blocked_report() -> ConflictReport {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("LICENSE"), "mine").unwrap();
        detect(&catalogue(), dir.path())
    }

    #[test]
    fn gate_clear_without_blocking_conflicts() {
        let prompt = MockPrompt::new();
        let outcome = gate(&ConflictReport::default(), false, false, &prompt).unwrap();
        assert_eq!(outcome, GateOutcome::Clear);
    }

    #[test]
    fn gate_force_and_config_bypass_prompt() {
        let report = blocked_report();
        let prompt = MockPrompt::new();
        assert_eq!(gate(&report, true, false, &prompt).unwrap(), GateOutcome::Forced);
        assert_eq!(
            gate(&report, false, true, &prompt).unwrap(),
            GateOutcome::SkippedByConfig
        );
    }

    #[test]
    fn gate_asks_and_respects_answer() {
        let report = blocked_report();

        let mut yes = MockPrompt::new();
        yes.expect_confirm().times(1).returning(|_| Ok(true));
        assert_eq!(gate(&report, false, false, &yes).unwrap(), GateOutcome::Confirmed);

        let mut no = MockPrompt::new();
        no.expect_confirm().times(1).returning(|_| Ok(false));
        let err = gate(&report, false, false, &no).unwrap_err();
        assert!(matches!(err, ScaffoldError::ConflictDeclined { count: 1 }));
    }

    #[test]
    fn gate_treats_prompt_failure_as_decline() {
        let report = blocked_report();
        let mut broken = MockPrompt::new();
        broken
            .expect_confirm()
            .returning(|_| Err(anyhow::anyhow!("stdin closed")));
        assert!(gate(&report, false, false, &broken).is_err());
    }
}
