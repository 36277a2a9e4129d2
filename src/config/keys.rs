//! The closed set of recognized configuration keys and source tiers.
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Shape of the value a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free-form string.
    Str,
    /// `true`/`false` (also `yes`/`no`, `on`/`off`, `1`/`0`).
    Bool,
    /// List of strings (package bundles).
    List,
}

/// A configuration source, ordered by priority (lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceTier {
    /// Built-in defaults compiled into the binary.
    Default,
    /// System-wide file.
    System,
    /// Per-user file.
    User,
    /// Per-project file in the target directory.
    Project,
    /// Explicit command-line flags.
    CommandLine,
}

impl SourceTier {
    /// The three file-backed tiers in ascending priority.
    pub const FILES: [Self; 3] = [Self::System, Self::User, Self::Project];

    /// Lower-case label used in listings and JSON output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::System => "system",
            Self::User => "user",
            Self::Project => "project",
            Self::CommandLine => "command-line",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recognized configuration key.
///
/// Keys are dotted paths (`section.name`).  Anything not listed here is
/// ignored by the loaders and only survives as raw file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// `defaults.team_name`
    TeamName,
    /// `defaults.project_name`
    ProjectName,
    /// `defaults.github_account`
    GithubAccount,
    /// `defaults.author_name`
    AuthorName,
    /// `defaults.author_email`
    AuthorEmail,
    /// `defaults.build_mode`
    BuildMode,
    /// `defaults.profile_name`
    ProfileName,
    /// `defaults.base_image`
    BaseImage,
    /// `defaults.r_version`
    RVersion,
    /// `defaults.dotfiles_dir`
    DotfilesDir,
    /// `defaults.dotfiles_nodot`
    DotfilesNodot,
    /// `defaults.auto_github`
    AutoGithub,
    /// `defaults.skip_confirmation`
    SkipConfirmation,
    /// `build_modes.fast`
    BundleFast,
    /// `build_modes.standard`
    BundleStandard,
    /// `build_modes.comprehensive`
    BundleComprehensive,
}

impl ConfigKey {
    /// Every recognized key, in listing order.
    pub const ALL: [Self; 16] = [
        Self::TeamName,
        Self::ProjectName,
        Self::GithubAccount,
        Self::AuthorName,
        Self::AuthorEmail,
        Self::BuildMode,
        Self::ProfileName,
        Self::BaseImage,
        Self::RVersion,
        Self::DotfilesDir,
        Self::DotfilesNodot,
        Self::AutoGithub,
        Self::SkipConfirmation,
        Self::BundleFast,
        Self::BundleStandard,
        Self::BundleComprehensive,
    ];

    /// Canonical dotted name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TeamName => "defaults.team_name",
            Self::ProjectName => "defaults.project_name",
            Self::GithubAccount => "defaults.github_account",
            Self::AuthorName => "defaults.author_name",
            Self::AuthorEmail => "defaults.author_email",
            Self::BuildMode => "defaults.build_mode",
            Self::ProfileName => "defaults.profile_name",
            Self::BaseImage => "defaults.base_image",
            Self::RVersion => "defaults.r_version",
            Self::DotfilesDir => "defaults.dotfiles_dir",
            Self::DotfilesNodot => "defaults.dotfiles_nodot",
            Self::AutoGithub => "defaults.auto_github",
            Self::SkipConfirmation => "defaults.skip_confirmation",
            Self::BundleFast => "build_modes.fast",
            Self::BundleStandard => "build_modes.standard",
            Self::BundleComprehensive => "build_modes.comprehensive",
        }
    }

    /// `(section, name)` halves of the dotted name.
    #[must_use]
    pub fn split(self) -> (&'static str, &'static str) {
        self.as_str().split_once('.').unwrap_or(("", self.as_str()))
    }

    /// Shape of the value this key holds.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::DotfilesNodot | Self::AutoGithub | Self::SkipConfirmation => ValueKind::Bool,
            Self::BundleFast | Self::BundleStandard | Self::BundleComprehensive => ValueKind::List,
            _ => ValueKind::Str,
        }
    }

    /// Placeholder name used in templates (`${NAME}`), if the key is exposed.
    #[must_use]
    pub const fn template_var(self) -> Option<&'static str> {
        match self {
            Self::TeamName => Some("TEAM_NAME"),
            Self::ProjectName => Some("PROJECT_NAME"),
            Self::GithubAccount => Some("GITHUB_ACCOUNT"),
            Self::AuthorName => Some("AUTHOR_NAME"),
            Self::AuthorEmail => Some("AUTHOR_EMAIL"),
            Self::BuildMode => Some("BUILD_MODE"),
            Self::ProfileName => Some("PROFILE_NAME"),
            Self::BaseImage => Some("BASE_IMAGE"),
            Self::RVersion => Some("R_VERSION"),
            _ => None,
        }
    }

    /// The bundle key holding the package list for a build mode name.
    #[must_use]
    pub fn bundle_for_mode(mode: &str) -> Option<Self> {
        match mode {
            "fast" => Some(Self::BundleFast),
            "standard" => Some(Self::BundleStandard),
            "comprehensive" => Some(Self::BundleComprehensive),
            _ => None,
        }
    }

    /// Look up a key by `section` and `name` as they appear in a file.
    ///
    /// Hyphenated spellings are normalized to underscores.
    #[must_use]
    pub fn lookup(section: &str, name: &str) -> Option<Self> {
        let section = section.trim().replace('-', "_");
        let name = name.trim().replace('-', "_");
        Self::ALL.into_iter().find(|k| k.split() == (section.as_str(), name.as_str()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    /// Parse a user-supplied key.
    ///
    /// Accepts the canonical dotted form, hyphen/underscore synonyms, and a
    /// bare name which is looked up in the `defaults` section.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = match s.split_once('.') {
            Some((section, name)) => Self::lookup(section, name),
            None => Self::lookup("defaults", s),
        };
        found.ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Interpret a boolean spelling.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
