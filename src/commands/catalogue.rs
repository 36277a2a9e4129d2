//! Command: print the path catalogue.
use std::io::Write as _;

use anyhow::Result;

use crate::catalogue::Catalogue;
use crate::cli::GlobalOpts;
use crate::config::Environment;
use crate::logging::Logger;

/// Print every path `create` can produce for the resolved project name.
///
/// # Errors
///
/// Returns an error if the project name is invalid or stdout cannot be
/// written.
pub fn run(global: &GlobalOpts, env: &Environment, log: &Logger) -> Result<()> {
    let setup = super::CommandSetup::init(global, env, &[], log)?;
    let project = super::project_name(setup.resolution.config.project_name(), &setup.root)?;
    let catalogue = Catalogue::compute(&project);
    std::io::stdout().write_all(catalogue.listing().as_bytes())?;
    Ok(())
}
