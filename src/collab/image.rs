//! Container image build.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::config::{ConfigKey, ResolvedConfig};
use crate::exec::Executor;

/// Everything `docker build` needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Image tag (`team/project:latest`, lower-cased).
    pub tag: String,
    /// Build context directory.
    pub context: PathBuf,
    /// `--build-arg` values.
    pub build_args: BTreeMap<String, String>,
}

impl BuildSpec {
    /// Derive the build from resolved values.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig, project: &str, context: &Path) -> Self {
        let name = match config.team_name() {
            Some(team) => format!("{team}/{project}"),
            None => project.to_string(),
        };
        let mut build_args = BTreeMap::new();
        for (arg, key) in [
            ("BASE_IMAGE", ConfigKey::BaseImage),
            ("R_VERSION", ConfigKey::RVersion),
            ("PROFILE", ConfigKey::ProfileName),
        ] {
            if let Some(value) = config.get_str(key).filter(|v| !v.is_empty()) {
                build_args.insert(arg.to_string(), value.to_string());
            }
        }
        Self {
            tag: format!("{}:latest", name.to_ascii_lowercase()),
            context: context.to_path_buf(),
            build_args,
        }
    }

    /// Arguments passed to `docker`.
    #[must_use]
    pub fn docker_args(&self) -> Vec<String> {
        let mut args = vec!["build".to_string(), "-t".to_string(), self.tag.clone()];
        for (key, value) in &self.build_args {
            args.push("--build-arg".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push(".".to_string());
        args
    }
}

/// Run `docker build` for `spec`.
///
/// # Errors
///
/// Returns an error if docker is not installed, its daemon is not
/// reachable, or the build fails.
pub fn build(spec: &BuildSpec, exec: &dyn Executor) -> Result<()> {
    if !exec.which("docker") {
        bail!("docker not found on PATH");
    }
    let probe = exec.run_unchecked("docker", &["info", "--format", "{{.ServerVersion}}"])?;
    if !probe.success {
        bail!("docker daemon is not reachable: {}", probe.stderr.trim());
    }
    let args = spec.docker_args();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    exec.run_in(&spec.context, "docker", &args)?;
    Ok(())
}
