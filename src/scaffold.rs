//! Scaffolding engine: creates the planned artifacts and records each one.
//!
//! Nothing that already exists is overwritten.  Paths held by a blocking
//! conflict are skipped with the conflict as the reason, missing parent
//! directories are created one level at a time, and every object the run
//! creates gets exactly one manifest entry.
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::catalogue::{CanonicalPath, Catalogue, PathKind};
use crate::config::{ConfigKey, ResolvedConfig};
use crate::conflicts::ConflictReport;
use crate::error::ManifestError;
use crate::logging::{Log, Outcome};
use crate::manifest::{ManifestEntry, ManifestWriter};
use crate::resources::directory::DirectoryResource;
use crate::resources::dotfile::DotfileResource;
use crate::resources::file::FileResource;
use crate::resources::helpers::fs::{missing_ancestors, sha256_file, sha256_hex};
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable, Resource, ResourceChange, ResourceState};
use crate::templates;

/// Where a planned artifact's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Nothing; the artifact is a directory.
    Directory,
    /// Embedded fixed content.
    Static(&'static str),
    /// Embedded template rendered against the resolved values.
    Template(&'static str),
    /// Relative link target.
    Link(&'static str),
    /// File in the dotfiles directory.
    Dotfile(PathBuf),
}

/// One artifact the run will try to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedArtifact {
    /// Catalogue entry.
    pub path: CanonicalPath,
    /// Content source.
    pub source: ArtifactSource,
}

/// The subset of the catalogue that applies to one resolved configuration.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
    root: PathBuf,
    project: String,
    artifacts: Vec<PlannedArtifact>,
}

impl ScaffoldPlan {
    /// Build the plan for `catalogue` under `root`.
    ///
    /// Dotfiles are planned only when `dotfiles_dir` is given; with
    /// `defaults.dotfiles_nodot` their source names lack the leading dot.
    #[must_use]
    pub fn new(
        catalogue: &Catalogue,
        config: &ResolvedConfig,
        root: &Path,
        dotfiles_dir: Option<&Path>,
    ) -> Self {
        let nodot = config.get_bool(ConfigKey::DotfilesNodot);
        let artifacts = catalogue
            .iter()
            .filter_map(|entry| {
                let source = match entry.kind {
                    PathKind::Directory => ArtifactSource::Directory,
                    PathKind::File => ArtifactSource::Static(templates::source_for(&entry.path)?),
                    PathKind::TemplateFile => {
                        ArtifactSource::Template(templates::source_for(&entry.path)?)
                    }
                    PathKind::Symlink => ArtifactSource::Link(entry.symlink_target()?),
                    PathKind::Dotfile => {
                        let dir = dotfiles_dir?;
                        let name = entry.path.to_string_lossy();
                        let name: &str = &name;
                        let name = if nodot {
                            name.strip_prefix('.').unwrap_or(name)
                        } else {
                            name
                        };
                        ArtifactSource::Dotfile(dir.join(name))
                    }
                };
                Some(PlannedArtifact {
                    path: entry.clone(),
                    source,
                })
            })
            .collect();
        Self {
            root: root.to_path_buf(),
            project: catalogue.project().to_string(),
            artifacts,
        }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Planned artifacts in creation order.
    #[must_use]
    pub fn artifacts(&self) -> &[PlannedArtifact] {
        &self.artifacts
    }

    /// Catalogue entries of the planned artifacts.
    pub fn paths(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.artifacts.iter().map(|a| &a.path)
    }
}

/// Resolve `~/` in a configured dotfiles directory.
#[must_use]
pub fn dotfiles_dir(config: &ResolvedConfig, home: Option<&Path>) -> Option<PathBuf> {
    let raw = config
        .get_str(ConfigKey::DotfilesDir)
        .filter(|s| !s.is_empty())?;
    match (raw.strip_prefix("~/"), home) {
        (Some(rest), Some(home)) => Some(home.join(rest)),
        _ if raw == "~" => home.map(Path::to_path_buf),
        _ => Some(PathBuf::from(raw)),
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Created and recorded.
    Created,
    /// Would be created (dry run).
    Planned,
    /// Left alone.
    Skipped(String),
    /// Creation failed.
    Failed(String),
}

/// Result for one path (planned artifacts and the parents created for them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Artifact kind.
    pub kind: PathKind,
    /// What happened.
    pub disposition: Disposition,
}

/// Output of [`Scaffolder::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    /// Per-path results in processing order.
    pub outcomes: Vec<ArtifactOutcome>,
    /// Template placeholders left unresolved, across all templates.
    pub unresolved: BTreeSet<String>,
}

impl ScaffoldReport {
    fn count(&self, pred: impl Fn(&Disposition) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.disposition)).count()
    }

    /// Number of created artifacts.
    #[must_use]
    pub fn created(&self) -> usize {
        self.count(|d| *d == Disposition::Created)
    }

    /// Number of skipped artifacts.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Skipped(_)))
    }

    /// Number of failed artifacts.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|d| matches!(d, Disposition::Failed(_)))
    }

    /// Number of artifacts a dry run would create.
    #[must_use]
    pub fn planned(&self) -> usize {
        self.count(|d| *d == Disposition::Planned)
    }
}

/// Creates the artifacts of a [`ScaffoldPlan`].
#[derive(Debug)]
pub struct Scaffolder<'a, L: Log + ?Sized> {
    config: &'a ResolvedConfig,
    conflicts: &'a ConflictReport,
    log: &'a L,
    dry_run: bool,
    year: i32,
}

impl<'a, L: Log + ?Sized> Scaffolder<'a, L> {
    /// New engine.  `year` feeds the `${YEAR}` template variable.
    pub const fn new(
        config: &'a ResolvedConfig,
        conflicts: &'a ConflictReport,
        log: &'a L,
        year: i32,
    ) -> Self {
        Self {
            config,
            conflicts,
            log,
            dry_run: false,
            year,
        }
    }

    /// Plan and report without writing anything.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Create every planned artifact.
    ///
    /// Per-artifact failures are logged, counted and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the manifest cannot be opened or an
    /// entry cannot be recorded; the run stops there so nothing is created
    /// without a record.
    pub fn run(&self, plan: &ScaffoldPlan) -> Result<ScaffoldReport, ManifestError> {
        let mut report = ScaffoldReport::default();
        let mut manifest = if self.dry_run {
            None
        } else {
            Some(ManifestWriter::open(plan.root(), plan.project())?)
        };
        let vars = self.template_vars(plan);

        for artifact in plan.artifacts() {
            let rel = &artifact.path.path;

            if let Some(conflict) = self.conflicts.blocking_for(rel) {
                self.skip(&mut report, rel, artifact.path.kind, &conflict.to_string());
                continue;
            }

            if let ArtifactSource::Dotfile(source) = &artifact.source
                && !source.is_file()
            {
                self.log.debug(&format!(
                    "no {} in dotfiles directory, skipping {}",
                    source.display(),
                    rel.display()
                ));
                continue;
            }

            let (resource, digest) = self.resource_for(&mut report, plan, artifact, &vars);
            if self.dry_run {
                self.plan_one(&mut report, rel, artifact.path.kind, resource.as_ref());
                continue;
            }

            let Some(writer) = manifest.as_mut() else {
                continue;
            };
            if !self.create_parents(&mut report, writer, plan.root(), rel)? {
                self.fail(&mut report, rel, artifact.path.kind, "parent directory missing");
                continue;
            }

            match resource.apply() {
                Ok(ResourceChange::Applied) => {
                    let digest = match (&artifact.source, digest) {
                        (ArtifactSource::Dotfile(_), _) => {
                            sha256_file(&plan.root().join(rel)).ok()
                        }
                        (_, digest) => digest,
                    };
                    writer.record(&ManifestEntry::now(artifact.path.kind, rel, digest))?;
                    self.created(&mut report, rel, artifact.path.kind);
                }
                Ok(ResourceChange::AlreadyCorrect) => {
                    let reason = if artifact.path.kind == PathKind::Symlink {
                        "existing link regenerated"
                    } else {
                        "already exists"
                    };
                    self.skip(&mut report, rel, artifact.path.kind, reason);
                }
                Ok(ResourceChange::Skipped { reason }) => {
                    self.skip(&mut report, rel, artifact.path.kind, &reason);
                }
                Err(e) => self.fail(&mut report, rel, artifact.path.kind, &e.to_string()),
            }
        }
        Ok(report)
    }

    /// Create and record the missing ancestors of `rel`.  Returns `false`
    /// if one of them could not be created.
    fn create_parents(
        &self,
        report: &mut ScaffoldReport,
        writer: &mut ManifestWriter,
        root: &Path,
        rel: &Path,
    ) -> Result<bool, ManifestError> {
        for parent in missing_ancestors(root, rel) {
            match DirectoryResource::new(root.join(&parent)).apply() {
                Ok(ResourceChange::Applied) => {
                    writer.record(&ManifestEntry::now(PathKind::Directory, &parent, None))?;
                    self.created(report, &parent, PathKind::Directory);
                }
                Ok(ResourceChange::AlreadyCorrect) => {}
                Ok(ResourceChange::Skipped { reason }) => {
                    self.skip(report, &parent, PathKind::Directory, &reason);
                    return Ok(false);
                }
                Err(e) => {
                    self.fail(report, &parent, PathKind::Directory, &e.to_string());
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Resolved template variables; the plan's project name fills
    /// `PROJECT_NAME` when the configuration leaves it unset.
    fn template_vars(&self, plan: &ScaffoldPlan) -> BTreeMap<String, String> {
        let mut vars = self.config.template_vars(self.year);
        vars.entry("PROJECT_NAME".to_string())
            .or_insert_with(|| plan.project().to_string());
        vars
    }

    /// Resource that creates `artifact`, with the digest its manifest
    /// entry will carry.  Templates are rendered here.
    fn resource_for(
        &self,
        report: &mut ScaffoldReport,
        plan: &ScaffoldPlan,
        artifact: &PlannedArtifact,
        vars: &BTreeMap<String, String>,
    ) -> (Box<dyn Resource>, Option<String>) {
        let rel = &artifact.path.path;
        let target = plan.root().join(rel);
        match &artifact.source {
            ArtifactSource::Directory => (Box::new(DirectoryResource::new(target)), None),
            ArtifactSource::Static(body) => (
                Box::new(FileResource::new(target, body.as_bytes())),
                Some(sha256_hex(body.as_bytes())),
            ),
            ArtifactSource::Template(body) => {
                let rendered = templates::render(body, vars);
                for name in &rendered.unresolved {
                    self.log.warn(&format!(
                        "{}: unresolved placeholder ${{{name}}} left in place",
                        rel.display()
                    ));
                    report.unresolved.insert(name.clone());
                }
                let digest = sha256_hex(rendered.text.as_bytes());
                (Box::new(FileResource::new(target, rendered.text)), Some(digest))
            }
            ArtifactSource::Link(link) => (
                Box::new(SymlinkResource::new(PathBuf::from(link), target)),
                None,
            ),
            ArtifactSource::Dotfile(source) => (
                Box::new(DotfileResource::new(source.clone(), target)),
                None,
            ),
        }
    }

    fn plan_one(
        &self,
        report: &mut ScaffoldReport,
        rel: &Path,
        kind: PathKind,
        resource: &dyn Resource,
    ) {
        let skip_reason = match resource.current_state() {
            ResourceState::Missing => None,
            ResourceState::Correct | ResourceState::Incorrect { .. }
                if kind == PathKind::Symlink =>
            {
                Some("existing link would be regenerated".to_string())
            }
            ResourceState::Correct => Some("already exists".to_string()),
            ResourceState::Incorrect { current } => Some(format!("already exists ({current})")),
            ResourceState::Invalid { reason } => Some(reason),
        };
        if let Some(reason) = skip_reason {
            self.skip(report, rel, kind, &reason);
            return;
        }
        self.log
            .dry_run(&format!("would create {} {}", kind.label(), rel.display()));
        self.log
            .record(&rel.display().to_string(), Outcome::DryRun, None);
        report.outcomes.push(ArtifactOutcome {
            path: rel.to_path_buf(),
            kind,
            disposition: Disposition::Planned,
        });
    }

    fn created(&self, report: &mut ScaffoldReport, rel: &Path, kind: PathKind) {
        self.log
            .debug(&format!("created {} {}", kind.label(), rel.display()));
        self.log
            .record(&rel.display().to_string(), Outcome::Created, None);
        report.outcomes.push(ArtifactOutcome {
            path: rel.to_path_buf(),
            kind,
            disposition: Disposition::Created,
        });
    }

    fn skip(&self, report: &mut ScaffoldReport, rel: &Path, kind: PathKind, reason: &str) {
        self.log
            .info(&format!("skipping {}: {reason}", rel.display()));
        self.log
            .record(&rel.display().to_string(), Outcome::Skipped, Some(reason));
        report.outcomes.push(ArtifactOutcome {
            path: rel.to_path_buf(),
            kind,
            disposition: Disposition::Skipped(reason.to_string()),
        });
    }

    fn fail(&self, report: &mut ScaffoldReport, rel: &Path, kind: PathKind, reason: &str) {
        self.log
            .error(&format!("{}: {reason}", rel.display()));
        self.log
            .record(&rel.display().to_string(), Outcome::Failed, Some(reason));
        report.outcomes.push(ArtifactOutcome {
            path: rel.to_path_buf(),
            kind,
            disposition: Disposition::Failed(reason.to_string()),
        });
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::{SourceTier, Value, defaults};
    use crate::conflicts;
    use crate::logging::isolated_logger;
    use crate::manifest;
    use crate::resources::helpers::fs::existing_kind;
    use std::fs;

    fn config() -> ResolvedConfig {
        let mut config = defaults::builtin();
        config.set(
            ConfigKey::TeamName,
            Value::Str("acme".to_string()),
            SourceTier::User,
        );
        config.set(
            ConfigKey::AuthorName,
            Value::Str("Ada Lovelace".to_string()),
            SourceTier::User,
        );
        config.set(
            ConfigKey::AuthorEmail,
            Value::Str("ada@example.org".to_string()),
            SourceTier::User,
        );
        config
    }

    fn full_dotfiles_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in crate::catalogue::DOTFILES {
            fs::write(dir.path().join(name), format!("# {name}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn every_planned_path_is_in_the_catalogue() {
        let dots = full_dotfiles_dir();
        let catalogue = Catalogue::compute("demo");
        let plan = ScaffoldPlan::new(&catalogue, &config(), Path::new("/p"), Some(dots.path()));
        assert_eq!(plan.artifacts().len(), catalogue.len());
        for path in plan.paths() {
            assert!(catalogue.contains(&path.path), "{}", path.path.display());
        }
    }

    #[test]
    fn dotfiles_are_planned_only_with_a_directory() {
        let catalogue = Catalogue::compute("demo");
        let plan = ScaffoldPlan::new(&catalogue, &config(), Path::new("/p"), None);
        assert_eq!(plan.paths().filter(|p| p.kind == PathKind::Dotfile).count(), 0);
    }

    #[test]
    fn nodot_strips_leading_dot_from_source_names() {
        let mut config = config();
        config.set(ConfigKey::DotfilesNodot, Value::Bool(true), SourceTier::CommandLine);
        let catalogue = Catalogue::compute("demo");
        let plan = ScaffoldPlan::new(&catalogue, &config, Path::new("/p"), Some(Path::new("/dots")));
        let vimrc = plan
            .artifacts()
            .iter()
            .find(|a| a.path.path == Path::new(".vimrc"))
            .unwrap();
        assert_eq!(
            vimrc.source,
            ArtifactSource::Dotfile(PathBuf::from("/dots/vimrc"))
        );
    }

    #[test]
    fn dotfiles_dir_expands_home() {
        let mut config = config();
        config.set(
            ConfigKey::DotfilesDir,
            Value::Str("~/dots".to_string()),
            SourceTier::User,
        );
        assert_eq!(
            dotfiles_dir(&config, Some(Path::new("/home/ada"))),
            Some(PathBuf::from("/home/ada/dots"))
        );
        assert_eq!(dotfiles_dir(&defaults::builtin(), None), None);
    }

    #[test]
    fn run_creates_every_path_with_one_entry_each() {
        let root = tempfile::tempdir().unwrap();
        let dots = full_dotfiles_dir();
        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let catalogue = Catalogue::compute("demo");
        let plan = ScaffoldPlan::new(&catalogue, &config, root.path(), Some(dots.path()));
        let report = conflicts::detect_paths(plan.paths(), root.path());
        assert!(report.is_empty());

        let result = Scaffolder::new(&config, &report, &log, 2026)
            .run(&plan)
            .unwrap();
        assert_eq!(result.created(), catalogue.len());
        assert_eq!(result.failed(), 0);

        for entry in catalogue.iter() {
            assert!(
                existing_kind(&root.path().join(&entry.path)).is_some(),
                "{} missing",
                entry.path.display()
            );
        }
        let manifest = manifest::read(root.path()).unwrap();
        assert_eq!(manifest.entries.len(), catalogue.len());
        let unique: BTreeSet<_> = manifest.entries.iter().map(|e| &e.path).collect();
        assert_eq!(unique.len(), catalogue.len());
        assert!(
            manifest
                .entries
                .iter()
                .filter(|e| e.kind.is_file_like())
                .all(|e| e.sha256.is_some())
        );
    }

    #[test]
    fn templates_are_rendered() {
        let root = tempfile::tempdir().unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root.path(), None);
        let report = ConflictReport::default();
        Scaffolder::new(&config, &report, &log, 2026)
            .run(&plan)
            .unwrap();

        let description = fs::read_to_string(root.path().join("DESCRIPTION")).unwrap();
        assert!(description.contains("Package: demo"), "{description}");
        let license = fs::read_to_string(root.path().join("LICENSE")).unwrap();
        assert!(license.contains("2026"));
        assert!(root.path().join("demo.Rproj").is_file());
    }

    #[test]
    fn unresolved_placeholders_are_reported() {
        let root = tempfile::tempdir().unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let config = defaults::builtin();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root.path(), None);
        let report = ConflictReport::default();
        let result = Scaffolder::new(&config, &report, &log, 2026)
            .run(&plan)
            .unwrap();
        assert!(result.unresolved.contains("AUTHOR_NAME"));
        let description = fs::read_to_string(root.path().join("DESCRIPTION")).unwrap();
        assert!(description.contains("${AUTHOR_NAME}"));
    }

    #[test]
    fn blocked_path_keeps_its_bytes() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("README.md"), b"my notes\n").unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let catalogue = Catalogue::compute("demo");
        let plan = ScaffoldPlan::new(&catalogue, &config, root.path(), None);
        let conflicts = conflicts::detect_paths(plan.paths(), root.path());
        assert_eq!(conflicts.blocking_count(), 1);

        let result = Scaffolder::new(&config, &conflicts, &log, 2026)
            .run(&plan)
            .unwrap();
        assert_eq!(result.skipped(), 1);
        assert_eq!(result.created(), plan.artifacts().len() - 1);
        assert_eq!(
            fs::read(root.path().join("README.md")).unwrap(),
            b"my notes\n"
        );
        let manifest = manifest::read(root.path()).unwrap();
        assert!(manifest.entries.iter().all(|e| e.path != Path::new("README.md")));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root.path(), None);
        let report = ConflictReport::default();
        let result = Scaffolder::new(&config, &report, &log, 2026)
            .dry_run(true)
            .run(&plan)
            .unwrap();
        assert_eq!(result.planned(), plan.artifacts().len());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn dry_run_reports_existing_objects_as_skipped() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("R")).unwrap();
        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root.path(), None);
        let report = ConflictReport::default();
        let result = Scaffolder::new(&config, &report, &log, 2026)
            .dry_run(true)
            .run(&plan)
            .unwrap();
        assert_eq!(result.skipped(), 1);
        assert_eq!(result.planned(), plan.artifacts().len() - 1);
        assert!(result.outcomes.iter().any(|o| o.path == Path::new("R")
            && o.disposition == Disposition::Skipped("already exists".to_string())));
    }

    #[test]
    fn existing_symlink_is_regenerated_but_not_recorded() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("analysis")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink("elsewhere", root.path().join("a")).unwrap();
        #[cfg(windows)]
        std::os::windows::fs::symlink_dir("elsewhere", root.path().join("a")).unwrap();

        let (log, _tmp, _guard) = isolated_logger();
        let config = config();
        let plan = ScaffoldPlan::new(&Catalogue::compute("demo"), &config, root.path(), None);
        let conflicts = conflicts::detect_paths(plan.paths(), root.path());
        assert!(conflicts.is_empty());
        Scaffolder::new(&config, &conflicts, &log, 2026)
            .run(&plan)
            .unwrap();

        assert_eq!(
            fs::read_link(root.path().join("a")).unwrap(),
            PathBuf::from("analysis")
        );
        let manifest = manifest::read(root.path()).unwrap();
        assert!(manifest.entries.iter().all(|e| e.path != Path::new("a")));
        assert!(manifest.entries.iter().all(|e| e.path != Path::new("analysis")));
    }
}
