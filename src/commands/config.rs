//! Config command implementation.
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};

use crate::cli::{ConfigAction, ConfigOpts, GlobalOpts};
use crate::config::loader;
use crate::config::persist;
use crate::config::validation::{
    ConfigValidator, ResolvedValidator, SourceValidator, ValidationWarning, check_value,
    validate_all,
};
use crate::config::{ConfigKey, Environment, SourceTier, Value};
use crate::error::ConfigError;
use crate::logging::Logger;

/// Run the config command.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, an unwritable target
/// file, or when validation finds errors.
pub fn run(global: &GlobalOpts, opts: &ConfigOpts, env: &Environment, log: &Logger) -> Result<()> {
    match &opts.action {
        ConfigAction::Get { key } => get(global, env, log, key, &mut std::io::stdout()),
        ConfigAction::Set {
            key,
            value,
            project,
        } => set(global, env, log, key, value, *project),
        ConfigAction::List { json } => list(global, env, log, *json, &mut std::io::stdout()),
        ConfigAction::Validate => validate(global, env, log),
        ConfigAction::Init { force, project } => init(global, env, log, *force, *project),
    }
}

fn get(
    global: &GlobalOpts,
    env: &Environment,
    log: &Logger,
    key: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let setup = super::CommandSetup::init(global, env, &[], log)?;
    match setup.resolution.config.get(key) {
        Some(entry) => writeln!(out, "{} ({})", entry.value.display(), entry.source)?,
        None => writeln!(out, "{key} is not set")?,
    }
    Ok(())
}

fn set(
    global: &GlobalOpts,
    env: &Environment,
    log: &Logger,
    key: &str,
    raw: &str,
    project: bool,
) -> Result<()> {
    let key: ConfigKey = key.parse()?;
    let value = Value::parse_for(key, raw)?;
    if let Some(reason) = check_value(key, &value) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason,
        }
        .into());
    }
    let path = target_path(global, env, project)?;

    if global.dry_run {
        log.dry_run(&format!(
            "would set {key} = {} in {}",
            value.display(),
            path.display()
        ));
        return Ok(());
    }
    persist::set_value(&path, key, &value)?;
    log.info(&format!("set {key} = {} in {}", value.display(), path.display()));
    Ok(())
}

fn list(
    global: &GlobalOpts,
    env: &Environment,
    log: &Logger,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let setup = super::CommandSetup::init(global, env, &[], log)?;
    let config = &setup.resolution.config;
    if json {
        writeln!(out, "{}", config.to_json())?;
        return Ok(());
    }
    let width = config
        .iter()
        .map(|(key, _)| key.as_str().len())
        .max()
        .unwrap_or(0);
    for (key, entry) in config.iter() {
        writeln!(
            out,
            "{:<width$}  {:<12}  {}",
            key.as_str(),
            entry.source.label(),
            entry.value.display()
        )?;
    }
    Ok(())
}

fn validate(global: &GlobalOpts, env: &Environment, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, env, &[], log)?;
    let strategy = env.strategy();

    let loaded: Vec<(SourceTier, loader::LoadedSource)> = SourceTier::FILES
        .iter()
        .filter_map(|tier| {
            let path = setup.sources.path_for(*tier)?;
            let source = loader::load(path, strategy);
            source.present.then_some((*tier, source))
        })
        .collect();
    for (tier, source) in &loaded {
        log.debug(&format!("validating {tier} config {}", source.path.display()));
    }

    let source_validators: Vec<SourceValidator<'_>> = loaded
        .iter()
        .map(|(tier, source)| SourceValidator::new(*tier, source))
        .collect();
    let resolved = ResolvedValidator::new(&setup.resolution.config);
    let mut validators: Vec<&dyn ConfigValidator> = source_validators
        .iter()
        .map(|v| v as &dyn ConfigValidator)
        .collect();
    validators.push(&resolved);

    let warnings = validate_all(&validators);
    report(&warnings, log)
}

fn report(warnings: &[ValidationWarning], log: &Logger) -> Result<()> {
    if warnings.is_empty() {
        log.info("configuration is valid");
        return Ok(());
    }
    let mut errors = 0usize;
    for warning in warnings {
        let line = format!("[{}] {}: {}", warning.source, warning.item, warning.message);
        if warning.is_error {
            errors += 1;
            log.error(&line);
        } else {
            log.warn(&line);
        }
    }
    if errors > 0 {
        bail!("{errors} configuration error(s)");
    }
    log.info(&format!("{} warning(s), no errors", warnings.len()));
    Ok(())
}

fn init(
    global: &GlobalOpts,
    env: &Environment,
    log: &Logger,
    force: bool,
    project: bool,
) -> Result<()> {
    let path = target_path(global, env, project)?;
    if global.dry_run {
        log.dry_run(&format!("would write starter config to {}", path.display()));
        return Ok(());
    }
    persist::init(&path, force)?;
    log.info(&format!("wrote {}", path.display()));
    Ok(())
}

/// File targeted by `set` and `init`: the user file, or the project file
/// with `--project`.
fn target_path(global: &GlobalOpts, env: &Environment, project: bool) -> Result<PathBuf> {
    let root = super::resolve_root(global)?;
    let sources = crate::config::SourcePaths::discover(&root, env);
    if project {
        return Ok(sources.project);
    }
    sources
        .user
        .context("cannot locate the per-user config file: no home directory")
}
