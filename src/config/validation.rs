use super::defaults::{BUILD_MODES, PROFILES};
use super::keys::{ConfigKey, SourceTier};
use super::loader::LoadedSource;
use super::store::{ResolvedConfig, Value};

/// Minimum length of an R package name.
const PACKAGE_NAME_MIN_LEN: usize = 2;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "user", "project").
    pub source: String,
    /// The specific key that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
    /// Whether the problem makes the configuration unusable.
    pub is_error: bool,
}

impl ValidationWarning {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
            is_error: false,
        }
    }

    /// Same as [`ValidationWarning::new`] but marks the problem as an error.
    #[must_use]
    pub fn error(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::new(source, item, message)
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self) -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator.
    fn name(&self) -> &'static str;
}

/// Validator for a single loaded source file.
#[derive(Debug)]
pub struct SourceValidator<'a> {
    tier: SourceTier,
    source: &'a LoadedSource,
}

impl<'a> SourceValidator<'a> {
    #[must_use]
    pub const fn new(tier: SourceTier, source: &'a LoadedSource) -> Self {
        Self { tier, source }
    }
}

impl ConfigValidator for SourceValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let label = self.tier.label();
        let mut warnings = Vec::new();

        for diagnostic in &self.source.diagnostics {
            warnings.push(ValidationWarning::error(
                label,
                self.source.path.display().to_string(),
                &diagnostic.message,
            ));
        }

        for key in &self.source.unknown_keys {
            warnings.push(ValidationWarning::new(label, key, "unknown key, ignored"));
        }

        if self.source.degraded() {
            for (key, value) in &self.source.values {
                if matches!(value, Value::List(_)) {
                    warnings.push(ValidationWarning::new(
                        label,
                        key.as_str(),
                        "list values are not read by the line parser",
                    ));
                }
            }
        }

        for (key, value) in &self.source.values {
            if let Some(message) = check_value(*key, value) {
                warnings.push(ValidationWarning::error(label, key.as_str(), message));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "source"
    }
}

/// Validator for the merged configuration.
#[derive(Debug)]
pub struct ResolvedValidator<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> ResolvedValidator<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolvedConfig) -> Self {
        Self { config }
    }
}

impl ConfigValidator for ResolvedValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(name) = self.config.project_name()
            && let Err(reason) = check_project_name(name)
        {
            warnings.push(ValidationWarning::error(
                tier_label(self.config, ConfigKey::ProjectName),
                ConfigKey::ProjectName.as_str(),
                reason,
            ));
        }

        if self.config.packages().is_empty() {
            warnings.push(ValidationWarning::new(
                "resolved",
                ConfigKey::bundle_for_mode(self.config.build_mode())
                    .map_or("build_modes", ConfigKey::as_str),
                "package bundle for the active build mode is empty",
            ));
        }

        if self.config.get_bool(ConfigKey::AutoGithub) && self.config.hosting_account().is_none() {
            warnings.push(ValidationWarning::new(
                tier_label(self.config, ConfigKey::AutoGithub),
                ConfigKey::AutoGithub.as_str(),
                "auto_github is set but neither github_account nor team_name is configured",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "resolved"
    }
}

fn tier_label(config: &ResolvedConfig, key: ConfigKey) -> &'static str {
    config.source_of(key).map_or("resolved", SourceTier::label)
}

/// Check a single value against the constraints of its key.
#[must_use]
pub fn check_value(key: ConfigKey, value: &Value) -> Option<String> {
    let Value::Str(s) = value else {
        return None;
    };
    match key {
        ConfigKey::BuildMode if !BUILD_MODES.contains(&s.as_str()) => Some(format!(
            "unknown build mode '{s}' (expected one of: {})",
            BUILD_MODES.join(", ")
        )),
        ConfigKey::ProfileName if !PROFILES.contains(&s.as_str()) => Some(format!(
            "unknown profile '{s}' (expected one of: {})",
            PROFILES.join(", ")
        )),
        ConfigKey::ProjectName if !s.is_empty() => check_project_name(s).err(),
        _ => None,
    }
}

/// Check that `name` is usable as an R package name.
///
/// Package names contain only ASCII letters, digits and `.`, start with a
/// letter, do not end with `.` and have at least two characters.
///
/// # Errors
///
/// Returns the reason the name was rejected.
pub fn check_project_name(name: &str) -> Result<(), String> {
    if name.chars().count() < PACKAGE_NAME_MIN_LEN {
        return Err(format!(
            "must have at least {PACKAGE_NAME_MIN_LEN} characters"
        ));
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err("must start with a letter".to_string());
    }
    if name.ends_with('.') {
        return Err("must not end with '.'".to_string());
    }
    if let Some(bad) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '.') {
        return Err(format!("contains '{bad}'; only letters, digits and '.' are allowed"));
    }
    Ok(())
}

/// Run every validator and collect their warnings.
#[must_use]
pub fn validate_all(validators: &[&dyn ConfigValidator]) -> Vec<ValidationWarning> {
    validators.iter().flat_map(|v| v.validate()).collect()
}
