use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use crate::config::defaults::{BUILD_MODES, FULL_PROFILE, MINIMAL_PROFILE, PROFILES};
use crate::config::{ConfigKey, Value};

/// Top-level CLI entry point for the project scaffolder.
#[derive(Parser, Debug)]
#[command(
    name = "rscaffold",
    about = "Reversible scaffolding for reproducible research projects",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Target project directory (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold a project in the target directory
    Create(CreateOpts),
    /// Remove everything a previous `create` recorded
    Uninstall(UninstallOpts),
    /// Inspect or edit configuration files
    Config(ConfigOpts),
    /// Print every path `create` can produce
    Catalogue,
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `create` subcommand.
#[derive(Parser, Debug, Clone, Default)]
#[command(group(ArgGroup::new("mode_preset").args(["fast", "standard", "comprehensive", "build_mode"])))]
#[command(group(ArgGroup::new("profile_preset").args(["minimal", "full", "profile"])))]
#[command(group(ArgGroup::new("dotfiles_source").args(["dotfiles", "dotfiles_nodot"])))]
pub struct CreateOpts {
    /// Team or organisation name
    #[arg(short, long)]
    pub team: Option<String>,

    /// Project name (default: target directory name)
    #[arg(short, long)]
    pub project_name: Option<String>,

    /// Account that owns the hosted repository
    #[arg(short = 'a', long)]
    pub github_account: Option<String>,

    /// Author name for package metadata
    #[arg(long)]
    pub author_name: Option<String>,

    /// Author e-mail for package metadata
    #[arg(long)]
    pub author_email: Option<String>,

    /// Container base image
    #[arg(short, long)]
    pub base_image: Option<String>,

    /// R version for the container image
    #[arg(short, long)]
    pub r_version: Option<String>,

    /// Use the `fast` package bundle
    #[arg(short = 'F', long)]
    pub fast: bool,

    /// Use the `standard` package bundle
    #[arg(short = 'S', long)]
    pub standard: bool,

    /// Use the `comprehensive` package bundle
    #[arg(short = 'C', long)]
    pub comprehensive: bool,

    /// Package bundle by name
    #[arg(long, value_name = "MODE", value_parser = clap::builder::PossibleValuesParser::new(BUILD_MODES.iter().copied()))]
    pub build_mode: Option<String>,

    /// Smallest image profile
    #[arg(long)]
    pub minimal: bool,

    /// Largest image profile
    #[arg(long)]
    pub full: bool,

    /// Image profile by name
    #[arg(long, value_name = "NAME", value_parser = clap::builder::PossibleValuesParser::new(PROFILES.iter().copied()))]
    pub profile: Option<String>,

    /// Copy personal dotfiles from DIR
    #[arg(long, value_name = "DIR")]
    pub dotfiles: Option<String>,

    /// Copy personal dotfiles from DIR, where they are stored without the leading dot
    #[arg(long, value_name = "DIR")]
    pub dotfiles_nodot: Option<String>,

    /// Create a private remote repository and push the scaffold
    #[arg(short = 'G', long)]
    pub github: bool,

    /// Build the container image after scaffolding
    #[arg(long)]
    pub build_image: bool,

    /// Proceed past blocking conflicts without asking
    #[arg(short, long)]
    pub force: bool,
}

impl CreateOpts {
    /// Configuration overrides for the flags that were given.
    ///
    /// Flags that were not supplied produce nothing, so they never mask a
    /// value from a configuration file.
    #[must_use]
    pub fn overrides(&self) -> Vec<(ConfigKey, Value)> {
        let mut out = Vec::new();
        let mut put_str = |key, value: Option<&str>| {
            if let Some(v) = value {
                out.push((key, Value::Str(v.to_string())));
            }
        };
        put_str(ConfigKey::TeamName, self.team.as_deref());
        put_str(ConfigKey::ProjectName, self.project_name.as_deref());
        put_str(ConfigKey::GithubAccount, self.github_account.as_deref());
        put_str(ConfigKey::AuthorName, self.author_name.as_deref());
        put_str(ConfigKey::AuthorEmail, self.author_email.as_deref());
        put_str(ConfigKey::BaseImage, self.base_image.as_deref());
        put_str(ConfigKey::RVersion, self.r_version.as_deref());
        put_str(ConfigKey::BuildMode, self.selected_build_mode());
        put_str(ConfigKey::ProfileName, self.selected_profile());

        if let Some(dir) = &self.dotfiles {
            out.push((ConfigKey::DotfilesDir, Value::Str(dir.clone())));
            out.push((ConfigKey::DotfilesNodot, Value::Bool(false)));
        }
        if let Some(dir) = &self.dotfiles_nodot {
            out.push((ConfigKey::DotfilesDir, Value::Str(dir.clone())));
            out.push((ConfigKey::DotfilesNodot, Value::Bool(true)));
        }
        if self.github {
            out.push((ConfigKey::AutoGithub, Value::Bool(true)));
        }
        out
    }

    /// Keys that were explicitly supplied on the command line.
    #[must_use]
    pub fn supplied(&self) -> BTreeSet<ConfigKey> {
        self.overrides().into_iter().map(|(key, _)| key).collect()
    }

    fn selected_build_mode(&self) -> Option<&str> {
        if self.fast {
            Some("fast")
        } else if self.standard {
            Some("standard")
        } else if self.comprehensive {
            Some("comprehensive")
        } else {
            self.build_mode.as_deref()
        }
    }

    fn selected_profile(&self) -> Option<&str> {
        if self.minimal {
            Some(MINIMAL_PROFILE)
        } else if self.full {
            Some(FULL_PROFILE)
        } else {
            self.profile.as_deref()
        }
    }
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct UninstallOpts {
    /// Also remove files that were modified since they were created
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `config` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ConfigOpts {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// `config` actions.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the resolved value of KEY and where it came from
    Get {
        /// Key, e.g. `team_name` or `defaults.team_name`
        key: String,
    },
    /// Write KEY = VALUE to the user file (or the project file)
    Set {
        /// Key, e.g. `team_name` or `build_modes.fast`
        key: String,
        /// New value; lists are comma separated
        value: String,
        /// Write to the project file instead of the user file
        #[arg(long)]
        project: bool,
    },
    /// Print every resolved value
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check every configuration file and the resolved values
    Validate,
    /// Write a commented starter file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
        /// Write the project file instead of the user file
        #[arg(long)]
        project: bool,
    },
}
