//! Uninstall command implementation.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::logging::Logger;
use crate::reverse::{self, ReverseOptions};

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the target directory has no readable manifest, the
/// manifest cannot be updated, or any removal failed.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;

    log.stage("Reversing scaffold");
    let options = ReverseOptions {
        force: opts.force,
        dry_run: global.dry_run,
    };
    let report = reverse::reverse(&root, options, log)
        .with_context(|| format!("reversing {}", root.display()))?;

    if report.manifest_removed {
        log.info("manifest removed");
    } else if !global.dry_run {
        log.info("manifest kept with the remaining entries");
        if report.kept() > 0 && !opts.force {
            log.info("run again with --force to also remove modified files");
        }
    }

    super::finish(log)
}
