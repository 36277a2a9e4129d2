//! Built-in defaults, the lowest configuration tier.
use super::keys::{ConfigKey, SourceTier};
use super::store::{ResolvedConfig, Value};

/// Package bundle for `fast` builds.
pub const FAST_PACKAGES: &[&str] = &["renv", "here", "usethis"];

/// Packages added on top of [`FAST_PACKAGES`] for `standard` builds.
pub const STANDARD_EXTRA: &[&str] = &["devtools", "testthat", "knitr", "rmarkdown"];

/// Packages added on top of the standard bundle for `comprehensive` builds.
pub const COMPREHENSIVE_EXTRA: &[&str] = &["tidyverse", "targets", "quarto", "pkgdown"];

/// Recognized build modes.
pub const BUILD_MODES: &[&str] = &["fast", "standard", "comprehensive"];

/// Recognized environment profiles, smallest image first.
pub const PROFILES: &[&str] = &["minimal", "analysis", "modeling", "publishing"];

/// Profile selected by `--minimal`.
pub const MINIMAL_PROFILE: &str = "minimal";

/// Profile selected by `--full`.
pub const FULL_PROFILE: &str = "publishing";

fn owned(items: &[&[&str]]) -> Vec<String> {
    items
        .iter()
        .flat_map(|group| group.iter())
        .map(|s| (*s).to_string())
        .collect()
}

/// Build the store seeded with every built-in default (tier `Default`).
#[must_use]
pub fn builtin() -> ResolvedConfig {
    let mut config = ResolvedConfig::new();
    let mut put = |key, value| config.set(key, value, SourceTier::Default);

    put(ConfigKey::BuildMode, Value::Str("standard".to_string()));
    put(ConfigKey::ProfileName, Value::Str(MINIMAL_PROFILE.to_string()));
    put(ConfigKey::BaseImage, Value::Str("rocker/r-ver".to_string()));
    put(ConfigKey::RVersion, Value::Str("4.4.1".to_string()));
    put(ConfigKey::DotfilesNodot, Value::Bool(false));
    put(ConfigKey::AutoGithub, Value::Bool(false));
    put(ConfigKey::SkipConfirmation, Value::Bool(false));
    put(ConfigKey::BundleFast, Value::List(owned(&[FAST_PACKAGES])));
    put(
        ConfigKey::BundleStandard,
        Value::List(owned(&[FAST_PACKAGES, STANDARD_EXTRA])),
    );
    put(
        ConfigKey::BundleComprehensive,
        Value::List(owned(&[FAST_PACKAGES, STANDARD_EXTRA, COMPREHENSIVE_EXTRA])),
    );

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_tagged_with_default_tier() {
        let config = builtin();
        assert!(config.iter().all(|(_, v)| v.source == SourceTier::Default));
    }

    #[test]
    fn identity_keys_have_no_default() {
        let config = builtin();
        assert!(config.team_name().is_none());
        assert!(config.project_name().is_none());
        assert!(config.get(ConfigKey::DotfilesDir).is_none());
    }

    #[test]
    fn bundles_grow_with_build_mode() {
        let config = builtin();
        let fast = config.get_list(ConfigKey::BundleFast).len();
        let standard = config.get_list(ConfigKey::BundleStandard).len();
        let comprehensive = config.get_list(ConfigKey::BundleComprehensive).len();
        assert!(fast < standard && standard < comprehensive);
        assert_eq!(config.build_mode(), "standard");
        assert_eq!(config.packages().len(), standard);
    }
}
