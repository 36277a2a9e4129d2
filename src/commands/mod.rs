//! Top-level subcommand orchestration.
pub mod catalogue;
pub mod config;
pub mod create;
pub mod uninstall;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::cli::GlobalOpts;
use crate::config::validation::check_project_name;
use crate::config::{ConfigKey, Environment, Resolution, SourcePaths, Value, resolve};
use crate::error::ScaffoldError;
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
///
/// Locates the target directory and resolves the configuration hierarchy so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical target directory.
    pub root: PathBuf,
    /// Config file locations for each tier.
    pub sources: SourcePaths,
    /// Merged configuration and loader diagnostics.
    pub resolution: Resolution,
}

impl CommandSetup {
    /// Locate the target directory and resolve every configuration tier.
    ///
    /// Loader diagnostics are logged as warnings and never fail the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the target directory cannot be determined.
    pub fn init(
        global: &GlobalOpts,
        env: &Environment,
        overrides: &[(ConfigKey, Value)],
        log: &Logger,
    ) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("target directory: {}", root.display()));

        let sources = SourcePaths::discover(&root, env);
        log.debug(&format!("system config: {}", sources.system.display()));
        if let Some(user) = &sources.user {
            log.debug(&format!("user config: {}", user.display()));
        }
        log.debug(&format!("project config: {}", sources.project.display()));

        let resolution = resolve(&sources, overrides, env.strategy());
        for diagnostic in &resolution.diagnostics {
            log.warn(&diagnostic.to_string());
        }
        for (tier, key) in &resolution.unknown_keys {
            log.debug(&format!("ignoring unknown key '{key}' in {tier} config"));
        }

        Ok(Self {
            root,
            sources,
            resolution,
        })
    }
}

/// Target directory: `--root`, else the current directory.
///
/// # Errors
///
/// Returns an error if the directory does not exist or the current
/// directory cannot be read.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    if !root.is_dir() {
        bail!("target directory {} does not exist", root.display());
    }
    dunce::canonicalize(&root).with_context(|| format!("cannot resolve {}", root.display()))
}

/// Project name: the resolved `defaults.project_name`, else the target
/// directory's name.
///
/// # Errors
///
/// Returns [`ScaffoldError::NoProjectName`] when neither is available and
/// [`ScaffoldError::InvalidProjectName`] when the name is not a valid R
/// package name.
pub fn project_name(configured: Option<&str>, root: &Path) -> Result<String, ScaffoldError> {
    let name = match configured {
        Some(name) => name.to_string(),
        None => root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ScaffoldError::NoProjectName(root.to_path_buf()))?,
    };
    check_project_name(&name).map_err(|reason| ScaffoldError::InvalidProjectName {
        name: name.clone(),
        reason,
    })?;
    Ok(name)
}

/// Print the summary and bail if anything failed.
///
/// # Errors
///
/// Returns an error if one or more artifacts or steps recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        bail!("{count} artifact(s) or step(s) failed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn global(root: &Path) -> GlobalOpts {
        GlobalOpts {
            dry_run: false,
            root: Some(root.to_path_buf()),
        }
    }

    #[test]
    fn resolve_root_uses_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = resolve_root(&global(dir.path())).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn resolve_root_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_root(&global(&dir.path().join("nope"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn project_name_defaults_to_directory_name() {
        assert_eq!(
            project_name(None, Path::new("/work/myStudy")).unwrap(),
            "myStudy"
        );
    }

    #[test]
    fn configured_project_name_wins() {
        assert_eq!(
            project_name(Some("paper2"), Path::new("/work/x")).unwrap(),
            "paper2"
        );
    }

    #[test]
    fn invalid_project_name_is_rejected() {
        let err = project_name(None, Path::new("/work/my-study")).unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidProjectName { .. }));
    }

    #[test]
    fn setup_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment {
            system_config: Some(dir.path().join("none.yaml")),
            user_config: Some(dir.path().join("user.yaml")),
            ..Environment::default()
        };
        std::fs::write(dir.path().join("user.yaml"), "defaults:\n  team_name: acme\n").unwrap();
        let log = Logger::new(None);

        let setup = CommandSetup::init(&global(dir.path()), &env, &[], &log).unwrap();
        assert_eq!(setup.resolution.config.team_name(), Some("acme"));

        let overrides = [(ConfigKey::TeamName, Value::Str("other".to_string()))];
        let setup = CommandSetup::init(&global(dir.path()), &env, &overrides, &log).unwrap();
        assert_eq!(setup.resolution.config.team_name(), Some("other"));
    }
}
