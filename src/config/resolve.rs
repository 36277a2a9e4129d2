//! Hierarchy resolution: defaults, then system, user and project files,
//! then command-line overrides.
use std::path::{Path, PathBuf};

use super::defaults;
use super::keys::{ConfigKey, SourceTier};
use super::loader::{self, Diagnostic, LoadedSource, Strategy};
use super::store::{ResolvedConfig, Value};

/// File name of the per-project configuration source.
pub const PROJECT_FILE: &str = "rscaffold.yaml";

/// Default system-wide configuration path.
pub const SYSTEM_FILE: &str = "/etc/rscaffold/config.yaml";

/// Process environment values that influence resolution.
///
/// Captured once by the binary entry point and passed down; library code
/// never reads the environment itself.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `RSCAFFOLD_SYSTEM_CONFIG`
    pub system_config: Option<PathBuf>,
    /// `RSCAFFOLD_USER_CONFIG`
    pub user_config: Option<PathBuf>,
    /// `XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// `HOME` (or `USERPROFILE`)
    pub home: Option<PathBuf>,
    /// `XDG_CACHE_HOME`
    pub xdg_cache_home: Option<PathBuf>,
    /// `RSCAFFOLD_CONFIG_PARSER=line`
    pub force_line_parser: bool,
}

impl Environment {
    /// Snapshot the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        let path = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            system_config: path("RSCAFFOLD_SYSTEM_CONFIG"),
            user_config: path("RSCAFFOLD_USER_CONFIG"),
            xdg_config_home: path("XDG_CONFIG_HOME"),
            home: path("HOME").or_else(|| path("USERPROFILE")),
            xdg_cache_home: path("XDG_CACHE_HOME"),
            force_line_parser: std::env::var("RSCAFFOLD_CONFIG_PARSER")
                .is_ok_and(|v| v.eq_ignore_ascii_case("line")),
        }
    }

    /// Parser strategy selected by build features and the environment.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        Strategy::detect(self.force_line_parser)
    }

    /// Directory used for log files.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.xdg_cache_home.clone().map_or_else(
            || {
                self.home
                    .clone()
                    .unwrap_or_else(std::env::temp_dir)
                    .join(".cache")
                    .join("rscaffold")
            },
            |dir| dir.join("rscaffold"),
        )
    }
}

/// Locations of the three file-backed tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    /// System-wide file.
    pub system: PathBuf,
    /// Per-user file; `None` when no home directory is known.
    pub user: Option<PathBuf>,
    /// Per-project file in the target directory.
    pub project: PathBuf,
}

impl SourcePaths {
    /// Compute the source locations for a target directory.
    #[must_use]
    pub fn discover(root: &Path, env: &Environment) -> Self {
        let user = env.user_config.clone().or_else(|| {
            env.xdg_config_home
                .clone()
                .or_else(|| env.home.as_ref().map(|h| h.join(".config")))
                .map(|dir| dir.join("rscaffold").join("config.yaml"))
        });
        Self {
            system: env
                .system_config
                .clone()
                .unwrap_or_else(|| PathBuf::from(SYSTEM_FILE)),
            user,
            project: root.join(PROJECT_FILE),
        }
    }

    /// Path of a file-backed tier.
    #[must_use]
    pub fn path_for(&self, tier: SourceTier) -> Option<&Path> {
        match tier {
            SourceTier::System => Some(&self.system),
            SourceTier::User => self.user.as_deref(),
            SourceTier::Project => Some(&self.project),
            SourceTier::Default | SourceTier::CommandLine => None,
        }
    }
}

/// Result of a resolution pass.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The merged store.
    pub config: ResolvedConfig,
    /// Non-fatal problems found while loading sources.
    pub diagnostics: Vec<Diagnostic>,
    /// Keys present in the files that are not recognized, with their tier.
    pub unknown_keys: Vec<(SourceTier, String)>,
}

/// Apply one loaded source on top of `config`.
fn apply_source(config: &mut ResolvedConfig, source: &LoadedSource, tier: SourceTier) {
    for (key, value) in &source.values {
        // A degraded parse cannot express list contents; keep the lower tier.
        if source.degraded() && matches!(value, Value::List(items) if items.is_empty()) {
            continue;
        }
        config.set(*key, value.clone(), tier);
    }
}

/// Resolve the configuration hierarchy.
///
/// Built-in defaults are overwritten by each present file tier in ascending
/// priority, then by every command-line override.  Calling this twice with
/// the same inputs yields identical stores.
#[must_use]
pub fn resolve(
    paths: &SourcePaths,
    overrides: &[(ConfigKey, Value)],
    strategy: Strategy,
) -> Resolution {
    let mut config = defaults::builtin();
    let mut diagnostics = Vec::new();
    let mut unknown_keys = Vec::new();

    for tier in SourceTier::FILES {
        let Some(path) = paths.path_for(tier) else {
            continue;
        };
        let source = loader::load(path, strategy);
        apply_source(&mut config, &source, tier);
        diagnostics.extend(source.diagnostics);
        unknown_keys.extend(source.unknown_keys.into_iter().map(|k| (tier, k)));
    }

    for (key, value) in overrides {
        config.set(*key, value.clone(), SourceTier::CommandLine);
    }

    Resolution {
        config,
        diagnostics,
        unknown_keys,
    }
}
