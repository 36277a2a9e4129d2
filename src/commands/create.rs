//! Create command implementation.
use anyhow::{Context as _, Result};
use chrono::Datelike as _;

use crate::catalogue::Catalogue;
use crate::cli::{CreateOpts, GlobalOpts};
use crate::collab::hosting::{self, HostingPlan};
use crate::collab::image::{self, BuildSpec};
use crate::config::{ConfigKey, Environment};
use crate::conflicts::{self, GateOutcome, Severity};
use crate::exec::Executor;
use crate::logging::{Logger, Outcome};
use crate::prompt::Prompt;
use crate::scaffold::{self, ScaffoldPlan, Scaffolder};

/// External seams used by `create`.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Confirmation prompt for blocking conflicts.
    pub prompt: &'a dyn Prompt,
    /// Subprocess runner for docker, git and gh.
    pub exec: &'a dyn Executor,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Run the create command.
///
/// # Errors
///
/// Returns an error if the project name is invalid, blocking conflicts are
/// not confirmed, the manifest cannot be written, or any artifact or
/// collaborator step failed.
pub fn run(
    global: &GlobalOpts,
    opts: &CreateOpts,
    env: &Environment,
    log: &Logger,
    collab: Collaborators<'_>,
) -> Result<()> {
    log.stage("Resolving configuration");
    let setup = super::CommandSetup::init(global, env, &opts.overrides(), log)?;
    let config = &setup.resolution.config;
    let root = &setup.root;

    let project = super::project_name(config.project_name(), root)?;
    log.info(&format!("project: {project}"));
    log.info(&format!(
        "build mode: {} ({} packages)",
        config.build_mode(),
        config.packages().len()
    ));
    for key in opts.supplied() {
        log.debug(&format!("{key} set on the command line"));
    }

    let catalogue = Catalogue::compute(&project);
    let dotfiles = scaffold::dotfiles_dir(config, env.home.as_deref());
    if let Some(dir) = &dotfiles {
        log.info(&format!("dotfiles: {}", dir.display()));
    }
    let plan = ScaffoldPlan::new(&catalogue, config, root, dotfiles.as_deref());

    log.stage("Checking for conflicts");
    let report = conflicts::detect_paths(plan.paths(), root);
    for entry in &report.entries {
        match entry.severity {
            Severity::Blocking => log.warn(&entry.to_string()),
            Severity::Informational => log.info(&entry.to_string()),
        }
    }
    if report.is_empty() {
        log.info("no conflicts");
    }

    if global.dry_run {
        if report.blocking_count() > 0 {
            log.dry_run(&format!(
                "would ask to continue past {} blocking conflict(s)",
                report.blocking_count()
            ));
        }
    } else {
        let outcome = conflicts::gate(
            &report,
            opts.force,
            config.get_bool(ConfigKey::SkipConfirmation),
            collab.prompt,
        )?;
        match outcome {
            GateOutcome::Clear => {}
            GateOutcome::Forced => log.info("continuing past conflicts (--force)"),
            GateOutcome::SkippedByConfig => {
                log.info("continuing past conflicts (defaults.skip_confirmation)");
            }
            GateOutcome::Confirmed => log.info("continuing past conflicts (confirmed)"),
        }
    }

    log.stage("Scaffolding");
    let year = chrono::Utc::now().year();
    let result = Scaffolder::new(config, &report, log, year)
        .dry_run(global.dry_run)
        .run(&plan)
        .context("writing the manifest")?;
    if !result.unresolved.is_empty() {
        let names: Vec<&str> = result.unresolved.iter().map(String::as_str).collect();
        log.warn(&format!(
            "set these values to fill the remaining placeholders: {}",
            names.join(", ")
        ));
    }

    if opts.build_image {
        log.stage("Building container image");
        let spec = BuildSpec::from_config(config, &project, root);
        let label = format!("docker build {}", spec.tag);
        if global.dry_run {
            log.dry_run(&format!("would run: docker {}", spec.docker_args().join(" ")));
        } else {
            match image::build(&spec, collab.exec) {
                Ok(()) => log.record(&label, Outcome::Created, None),
                Err(e) => {
                    log.error(&format!("{label}: {e:#}"));
                    log.record(&label, Outcome::Failed, Some(&format!("{e:#}")));
                }
            }
        }
    }

    if config.get_bool(ConfigKey::AutoGithub) {
        log.stage("Publishing repository");
        publish(
            config.hosting_account(),
            &project,
            root,
            result.failed(),
            global.dry_run,
            log,
            collab.exec,
        );
    }

    super::finish(log)
}

fn publish(
    account: Option<&str>,
    project: &str,
    root: &std::path::Path,
    failed: usize,
    dry_run: bool,
    log: &Logger,
    exec: &dyn Executor,
) {
    const LABEL: &str = "repository";
    let Some(account) = account else {
        let reason = "no github_account or team_name configured";
        log.error(&format!("cannot publish: {reason}"));
        log.record(LABEL, Outcome::Failed, Some(reason));
        return;
    };
    let plan = HostingPlan::new(account, project, root);
    if failed > 0 {
        let reason = "scaffolding had failures";
        log.warn(&format!("not publishing {}: {reason}", plan.slug()));
        log.record(&plan.slug(), Outcome::Skipped, Some(reason));
        return;
    }
    if dry_run {
        log.dry_run(&format!("would create private repository {} and push", plan.slug()));
        return;
    }
    match hosting::publish(&plan, exec) {
        Ok(()) => {
            log.info(&format!("published {}", plan.slug()));
            log.record(&plan.slug(), Outcome::Created, None);
        }
        Err(e) => {
            log.error(&format!("publishing {}: {e:#}", plan.slug()));
            log.record(&plan.slug(), Outcome::Failed, Some(&format!("{e:#}")));
        }
    }
}
