//! Version control and remote repository creation.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::exec::Executor;

/// Commit message for the first commit.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial project scaffold";

/// Where to publish the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingPlan {
    /// Owner of the remote repository.
    pub account: String,
    /// Repository name.
    pub project: String,
    /// Local project root.
    pub root: PathBuf,
}

impl HostingPlan {
    /// Create a plan.
    #[must_use]
    pub fn new(account: &str, project: &str, root: &Path) -> Self {
        Self {
            account: account.to_string(),
            project: project.to_string(),
            root: root.to_path_buf(),
        }
    }

    /// `account/project`
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.account, self.project)
    }
}

/// Initialize a repository, commit everything and create the remote.
///
/// An existing `.git` directory is reused.
///
/// # Errors
///
/// Returns an error naming the first step that failed.
pub fn publish(plan: &HostingPlan, exec: &dyn Executor) -> Result<()> {
    for tool in ["git", "gh"] {
        if !exec.which(tool) {
            bail!("{tool} not found on PATH");
        }
    }

    if !plan.root.join(".git").exists() {
        exec.run_in(&plan.root, "git", &["init"])
            .context("git init")?;
    }
    exec.run_in(&plan.root, "git", &["add", "-A"])
        .context("git add")?;
    exec.run_in(&plan.root, "git", &["commit", "-m", INITIAL_COMMIT_MESSAGE])
        .context("git commit")?;

    let slug = plan.slug();
    exec.run_in(
        &plan.root,
        "gh",
        &["repo", "create", &slug, "--private", "--source", ".", "--push"],
    )
    .with_context(|| format!("gh repo create {slug}"))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    #[test]
    fn publish_runs_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let plan = HostingPlan::new("acme", "demo", dir.path());
        let exec = MockExecutor::ok_times(4);
        publish(&plan, &exec).unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "git init".to_string(),
                "git add -A".to_string(),
                format!("git commit -m {INITIAL_COMMIT_MESSAGE}"),
                "gh repo create acme/demo --private --source . --push".to_string(),
            ]
        );
    }

    #[test]
    fn existing_repository_is_not_reinitialized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let plan = HostingPlan::new("acme", "demo", dir.path());
        let exec = MockExecutor::ok_times(3);
        publish(&plan, &exec).unwrap();
        assert_eq!(exec.calls()[0], "git add -A");
    }

    #[test]
    fn failure_names_the_step() {
        let dir = tempfile::tempdir().unwrap();
        let plan = HostingPlan::new("acme", "demo", dir.path());
        let exec = MockExecutor::with_responses(vec![
            (true, String::new()),
            (true, String::new()),
            (false, String::new()),
        ]);
        let err = publish(&plan, &exec).unwrap_err();
        assert!(err.to_string().contains("git commit"), "{err}");
        assert_eq!(exec.calls().len(), 3);
    }

    #[test]
    fn missing_tool_stops_before_any_command() {
        let dir = tempfile::tempdir().unwrap();
        let plan = HostingPlan::new("acme", "demo", dir.path());
        let exec = MockExecutor::ok_times(4).with_which(false);
        assert!(publish(&plan, &exec).is_err());
        assert!(exec.calls().is_empty());
    }
}
