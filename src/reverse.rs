//! Reversal engine: removes what the manifest says was created.
//!
//! Removal order is the inverse of creation dependencies: symlinks,
//! dotfiles, templates, plain files, then directories deepest first.  The
//! manifest goes last, or is rewritten with the entries that had to stay.
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalogue::PathKind;
use crate::error::ManifestError;
use crate::logging::{Log, Outcome};
use crate::manifest::{self, Manifest, ManifestEntry};
use crate::resources::Applicable;
use crate::resources::ResourceChange;
use crate::resources::directory::DirectoryResource;
use crate::resources::file::FileResource;
use crate::resources::helpers::fs::{Existing, existing_kind, is_confined, sha256_file};
use crate::resources::symlink::SymlinkResource;

/// Reversal switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseOptions {
    /// Remove files even if their content changed since creation.
    pub force: bool,
    /// Report without removing anything.
    pub dry_run: bool,
}

/// What happened to one recorded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// Removed.
    Removed,
    /// Would be removed (dry run).
    WouldRemove,
    /// Already gone.
    Absent,
    /// Left in place.
    Kept(String),
    /// Removal failed.
    Failed(String),
}

impl Removal {
    /// Whether the entry stays in the manifest.
    #[must_use]
    pub const fn remains(&self) -> bool {
        matches!(self, Self::Kept(_) | Self::Failed(_))
    }
}

/// Result for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The manifest entry.
    pub entry: ManifestEntry,
    /// What happened.
    pub removal: Removal,
}

/// Output of [`reverse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReversalReport {
    /// Per-entry results in removal order.
    pub outcomes: Vec<RemovalOutcome>,
    /// Whether the manifest file itself was deleted.
    pub manifest_removed: bool,
}

impl ReversalReport {
    fn count(&self, pred: impl Fn(&Removal) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.removal)).count()
    }

    /// Number of removed artifacts.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.count(|r| *r == Removal::Removed)
    }

    /// Number of artifacts kept in place.
    #[must_use]
    pub fn kept(&self) -> usize {
        self.count(|r| matches!(r, Removal::Kept(_)))
    }

    /// Number of failed removals.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|r| matches!(r, Removal::Failed(_)))
    }

    /// Number of already-absent artifacts.
    #[must_use]
    pub fn absent(&self) -> usize {
        self.count(|r| *r == Removal::Absent)
    }
}

const fn kind_rank(kind: PathKind) -> u8 {
    match kind {
        PathKind::Symlink => 0,
        PathKind::Dotfile => 1,
        PathKind::TemplateFile => 2,
        PathKind::File => 3,
        PathKind::Directory => 4,
    }
}

/// Entries in removal order.  Directories sort deepest first; ties keep
/// reverse creation order.
#[must_use]
pub fn removal_order(entries: &[ManifestEntry]) -> Vec<ManifestEntry> {
    let mut ordered: Vec<(usize, ManifestEntry)> =
        entries.iter().cloned().enumerate().collect();
    ordered.sort_by_key(|(idx, entry)| {
        let depth = if entry.kind == PathKind::Directory {
            entry.path.components().count()
        } else {
            0
        };
        (kind_rank(entry.kind), Reverse(depth), Reverse(*idx))
    });
    ordered.into_iter().map(|(_, entry)| entry).collect()
}

/// Remove everything recorded in the manifest under `root`.
///
/// # Errors
///
/// Returns [`ManifestError`] if the manifest is missing or unreadable, or
/// cannot be rewritten or deleted at the end.
pub fn reverse<L: Log + ?Sized>(
    root: &Path,
    options: ReverseOptions,
    log: &L,
) -> Result<ReversalReport, ManifestError> {
    let manifest = manifest::read(root)?;
    let mut report = ReversalReport::default();

    for entry in removal_order(&manifest.entries) {
        let removal = reverse_one(root, &entry, options);
        let name = entry.path.display().to_string();
        match &removal {
            Removal::Removed => {
                log.debug(&format!("removed {} {name}", entry.kind.label()));
                log.record(&name, Outcome::Removed, None);
            }
            Removal::WouldRemove => {
                log.dry_run(&format!("would remove {} {name}", entry.kind.label()));
                log.record(&name, Outcome::DryRun, None);
            }
            Removal::Absent => {
                log.info(&format!("{name}: already absent"));
                log.record(&name, Outcome::Skipped, Some("already absent"));
            }
            Removal::Kept(reason) => {
                log.warn(&format!("keeping {name}: {reason}"));
                log.record(&name, Outcome::Skipped, Some(reason));
            }
            Removal::Failed(reason) => {
                log.error(&format!("{name}: {reason}"));
                log.record(&name, Outcome::Failed, Some(reason));
            }
        }
        report.outcomes.push(RemovalOutcome { entry, removal });
    }

    if options.dry_run {
        return Ok(report);
    }

    let remaining: Vec<ManifestEntry> = manifest
        .entries
        .iter()
        .filter(|e| {
            report
                .outcomes
                .iter()
                .any(|o| o.removal.remains() && &o.entry == *e)
        })
        .cloned()
        .collect();

    if remaining.is_empty() {
        let path = manifest::manifest_path(root);
        fs::remove_file(&path).map_err(|source| ManifestError::Io { path, source })?;
        report.manifest_removed = true;
    } else {
        log.warn(&format!(
            "{} artifact(s) remain; manifest kept for a later run",
            remaining.len()
        ));
        manifest::rewrite(
            root,
            &Manifest {
                header: manifest.header,
                entries: remaining,
            },
        )?;
    }
    Ok(report)
}

fn reverse_one(root: &Path, entry: &ManifestEntry, options: ReverseOptions) -> Removal {
    if !is_confined(&entry.path) {
        return Removal::Failed("path escapes project root".to_string());
    }
    let path = root.join(&entry.path);
    let Some(existing) = existing_kind(&path) else {
        return Removal::Absent;
    };

    if entry.kind.is_file_like()
        && existing == Existing::File
        && !options.force
        && let Some(expected) = &entry.sha256
    {
        match sha256_file(&path) {
            Ok(actual) if &actual == expected => {}
            Ok(_) => return Removal::Kept("modified since creation".to_string()),
            Err(e) => return Removal::Failed(e.to_string()),
        }
    }

    let resource: Box<dyn Applicable> = match entry.kind {
        PathKind::Symlink => Box::new(SymlinkResource::new(PathBuf::new(), path)),
        PathKind::Directory => Box::new(DirectoryResource::new(path)),
        PathKind::File | PathKind::TemplateFile | PathKind::Dotfile => {
            Box::new(FileResource::new(path, Vec::new()))
        }
    };

    if options.dry_run {
        return would_remove(resource.as_ref(), existing, entry.kind);
    }

    match resource.remove() {
        Ok(ResourceChange::Applied) => Removal::Removed,
        Ok(ResourceChange::AlreadyCorrect) => Removal::Absent,
        Ok(ResourceChange::Skipped { reason }) => Removal::Kept(reason),
        Err(e) => Removal::Failed(e.to_string()),
    }
}

fn would_remove(resource: &dyn Applicable, existing: Existing, kind: PathKind) -> Removal {
    match (kind, existing) {
        (PathKind::Symlink, Existing::Symlink)
        | (PathKind::File | PathKind::TemplateFile | PathKind::Dotfile, Existing::File) => {
            Removal::WouldRemove
        }
        (PathKind::Directory, Existing::Directory) => Removal::WouldRemove,
        _ => Removal::Kept(format!("{} is no longer a {}", resource.description(), kind.label())),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalogue::Catalogue;
    use crate::config::defaults;
    use crate::conflicts::ConflictReport;
    use crate::logging::isolated_logger;
    use crate::manifest::ManifestWriter;
    use crate::scaffold::{ScaffoldPlan, Scaffolder};

    fn scaffold(root: &Path) {
        let (log, _tmp, _guard) = isolated_logger();
        let config = defaults::builtin();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root, None);
        let conflicts = ConflictReport::default();
        Scaffolder::new(&config, &conflicts, &log, 2026)
            .run(&plan)
            .unwrap();
    }

    #[test]
    fn order_is_links_then_files_then_deepest_directories() {
        let entries = vec![
            ManifestEntry::now(PathKind::Directory, "analysis", None),
            ManifestEntry::now(PathKind::Directory, "analysis/data", None),
            ManifestEntry::now(PathKind::File, "NAMESPACE", None),
            ManifestEntry::now(PathKind::TemplateFile, "README.md", None),
            ManifestEntry::now(PathKind::Symlink, "a", None),
            ManifestEntry::now(PathKind::Directory, "R", None),
        ];
        let order: Vec<PathBuf> = removal_order(&entries)
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(
            order,
            ["a", "README.md", "NAMESPACE", "analysis/data", "R", "analysis"]
                .map(PathBuf::from)
        );
    }

    #[test]
    fn reverse_restores_empty_directory() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(root.path(), ReverseOptions::default(), &log).unwrap();
        assert_eq!(report.failed(), 0);
        assert_eq!(report.kept(), 0);
        assert!(report.manifest_removed);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn modified_file_is_kept_and_manifest_rewritten() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        fs::write(root.path().join("README.md"), "edited").unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(root.path(), ReverseOptions::default(), &log).unwrap();
        assert_eq!(report.kept(), 1);
        assert!(!report.manifest_removed);
        assert_eq!(
            fs::read_to_string(root.path().join("README.md")).unwrap(),
            "edited"
        );

        let remaining = manifest::read(root.path()).unwrap();
        assert_eq!(remaining.entries.len(), 1);
        assert_eq!(remaining.entries[0].path, PathBuf::from("README.md"));
        assert!(remaining.header.is_some());
    }

    #[test]
    fn force_removes_modified_file() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        fs::write(root.path().join("README.md"), "edited").unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let options = ReverseOptions {
            force: true,
            dry_run: false,
        };
        let report = reverse(root.path(), options, &log).unwrap();
        assert_eq!(report.kept(), 0);
        assert!(report.manifest_removed);
        assert!(!root.path().join("README.md").exists());
    }

    #[test]
    fn user_content_keeps_its_directory() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        fs::write(root.path().join("analysis/scripts/01-clean.R"), "x <- 1").unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(root.path(), ReverseOptions::default(), &log).unwrap();
        assert!(root.path().join("analysis/scripts/01-clean.R").exists());
        let kept: Vec<_> = report
            .outcomes
            .iter()
            .filter(|o| matches!(o.removal, Removal::Kept(_)))
            .map(|o| o.entry.path.clone())
            .collect();
        assert_eq!(
            kept,
            ["analysis/scripts", "analysis"].map(PathBuf::from)
        );
        assert_eq!(manifest::read(root.path()).unwrap().entries.len(), 2);
    }

    #[test]
    fn absent_artifacts_are_reported() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        fs::remove_file(root.path().join("LICENSE")).unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(root.path(), ReverseOptions::default(), &log).unwrap();
        assert_eq!(report.absent(), 1);
        assert!(report.manifest_removed);
    }

    #[test]
    fn dry_run_removes_nothing() {
        let root = tempfile::tempdir().unwrap();
        scaffold(root.path());
        let before = manifest::read(root.path()).unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let options = ReverseOptions {
            force: false,
            dry_run: true,
        };
        let report = reverse(root.path(), options, &log).unwrap();
        assert_eq!(
            report.count(|r| *r == Removal::WouldRemove),
            before.entries.len()
        );
        assert!(!report.manifest_removed);
        assert_eq!(manifest::read(root.path()).unwrap(), before);
        assert!(root.path().join("DESCRIPTION").exists());
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        assert!(matches!(
            reverse(root.path(), ReverseOptions::default(), &log).unwrap_err(),
            ManifestError::Missing(_)
        ));
    }

    #[test]
    fn manifest_written_by_hand_is_honoured() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("R")).unwrap();
        let mut writer = ManifestWriter::open(root.path(), "demo").unwrap();
        writer
            .record(&ManifestEntry::now(PathKind::Directory, "R", None))
            .unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(root.path(), ReverseOptions::default(), &log).unwrap();
        assert_eq!(report.removed(), 1);
        assert!(!root.path().join("R").exists());
    }

    #[test]
    fn parent_relative_entries_are_never_removed() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("proj");
        fs::create_dir(&root).unwrap();
        let victim = outer.path().join("victim.txt");
        fs::write(&victim, "keep me").unwrap();
        ManifestWriter::open(&root, "demo")
            .unwrap()
            .record(&ManifestEntry::now(PathKind::File, "../victim.txt", None))
            .unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let report = reverse(&root, ReverseOptions::default(), &log).unwrap();
        assert_eq!(report.removed(), 0);
        assert_eq!(report.failed(), 1);
        assert!(victim.exists());
        assert!(manifest::manifest_path(&root).exists());
    }

    #[test]
    fn absolute_entries_are_never_removed() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let victim = elsewhere.path().join("abs_victim.txt");
        fs::write(&victim, "keep me").unwrap();
        ManifestWriter::open(root.path(), "demo")
            .unwrap()
            .record(&ManifestEntry::now(PathKind::File, &victim, None))
            .unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let options = ReverseOptions {
            force: true,
            ..ReverseOptions::default()
        };
        let report = reverse(root.path(), options, &log).unwrap();
        assert_eq!(report.removed(), 0);
        assert!(victim.exists());
        assert!(
            report
                .outcomes
                .iter()
                .any(|o| o.removal == Removal::Failed("path escapes project root".to_string()))
        );
    }
}
