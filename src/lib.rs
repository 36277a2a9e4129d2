//! Reversible project scaffolding for reproducible research.
//!
//! Creates the standard layout of a containerised R analysis project in a
//! target directory, records every artifact it made in a manifest, and can
//! later remove exactly those artifacts again.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: the tiered configuration hierarchy (defaults, system,
//!   user, project, command line)
//! - **[`catalogue`]**: every path a scaffold run may produce
//! - **[`resources`]**: idempotent `current_state + apply` primitives
//!   (directories, files, symlinks, dotfiles)
//! - **[`scaffold`]** and **[`reverse`]**: the forward and backward engines,
//!   tied together by the [`manifest`]
//! - **[`commands`]**: top-level subcommand orchestration (`create`,
//!   `uninstall`, `config`, `catalogue`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod catalogue;
pub mod cli;
pub mod collab;
pub mod commands;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod exec;
pub mod logging;
pub mod manifest;
pub mod prompt;
pub mod resources;
pub mod reverse;
pub mod scaffold;
pub mod templates;

/// Version string: the release tag or `git describe` output captured at
/// build time, else `dev-<crate version>`.
pub const VERSION: &str = match option_env!("RSCAFFOLD_VERSION") {
    Some(version) => version,
    None => concat!("dev-", env!("CARGO_PKG_VERSION")),
};
