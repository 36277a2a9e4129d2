//! Resolved configuration values with provenance.
use std::collections::BTreeMap;

use serde::Serialize;

use super::keys::{ConfigKey, SourceTier, ValueKind, parse_bool};
use crate::error::ConfigError;

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Scalar string.
    Str(String),
    /// Boolean flag.
    Bool(bool),
    /// List of strings.
    List(Vec<String>),
}

impl Value {
    /// Parse a raw command-line or `config set` string for `key`.
    ///
    /// Lists are comma separated; surrounding whitespace on each element is
    /// trimmed and empty elements are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a boolean key receives a
    /// value that is not a recognized boolean spelling.
    pub fn parse_for(key: ConfigKey, raw: &str) -> Result<Self, ConfigError> {
        match key.kind() {
            ValueKind::Str => Ok(Self::Str(raw.to_string())),
            ValueKind::Bool => parse_bool(raw).map(Self::Bool).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: "expected a boolean (true/false, yes/no, on/off, 1/0)".to_string(),
                }
            }),
            ValueKind::List => Ok(Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
        }
    }

    /// Human-readable rendering used by `config get` and `config list`.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items.join(", "),
        }
    }
}

/// A resolved value together with the tier that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigValue {
    /// The value itself.
    pub value: Value,
    /// Which tier supplied it.
    #[serde(serialize_with = "serialize_tier")]
    pub source: SourceTier,
}

fn serialize_tier<S: serde::Serializer>(tier: &SourceTier, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(tier.label())
}

/// The resolved configuration store.
///
/// Holds at most one live value per key.  Writes overwrite wholesale; list
/// values are replaced, never concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<ConfigKey, ConfigValue>,
}

impl ResolvedConfig {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `key` with `value` from `source`.
    pub fn set(&mut self, key: ConfigKey, value: Value, source: SourceTier) {
        self.values.insert(key, ConfigValue { value, source });
    }

    /// Remove `key` entirely.
    pub fn unset(&mut self, key: ConfigKey) {
        self.values.remove(&key);
    }

    /// The live value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> Option<&ConfigValue> {
        self.values.get(&key)
    }

    /// The tier that supplied `key`, if set.
    #[must_use]
    pub fn source_of(&self, key: ConfigKey) -> Option<SourceTier> {
        self.get(key).map(|v| v.source)
    }

    /// Typed string accessor.  Empty strings are returned as `Some("")`.
    #[must_use]
    pub fn get_str(&self, key: ConfigKey) -> Option<&str> {
        match self.get(key).map(|v| &v.value) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Typed boolean accessor; unset reads as `false`.
    #[must_use]
    pub fn get_bool(&self, key: ConfigKey) -> bool {
        matches!(self.get(key).map(|v| &v.value), Some(Value::Bool(true)))
    }

    /// Typed list accessor; unset reads as empty.
    #[must_use]
    pub fn get_list(&self, key: ConfigKey) -> &[String] {
        match self.get(key).map(|v| &v.value) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    /// Iterate over all live values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Number of live values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when no value is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolved team name, if any.
    #[must_use]
    pub fn team_name(&self) -> Option<&str> {
        self.get_str(ConfigKey::TeamName).filter(|s| !s.is_empty())
    }

    /// Resolved project name, if any.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.get_str(ConfigKey::ProjectName).filter(|s| !s.is_empty())
    }

    /// Resolved build mode (falls back to `standard`).
    #[must_use]
    pub fn build_mode(&self) -> &str {
        self.get_str(ConfigKey::BuildMode)
            .filter(|s| !s.is_empty())
            .unwrap_or("standard")
    }

    /// Package bundle for the resolved build mode.
    #[must_use]
    pub fn packages(&self) -> &[String] {
        match ConfigKey::bundle_for_mode(self.build_mode()) {
            Some(key) => self.get_list(key),
            None => &[],
        }
    }

    /// Account that owns the hosted repository: the GitHub account, else the team.
    #[must_use]
    pub fn hosting_account(&self) -> Option<&str> {
        self.get_str(ConfigKey::GithubAccount)
            .filter(|s| !s.is_empty())
            .or_else(|| self.team_name())
    }

    /// Template variables exposed by the resolved values.
    ///
    /// Unset keys are absent from the map; `R_PACKAGES` is derived from the
    /// active bundle and `YEAR` is supplied by the caller so rendering stays
    /// deterministic.
    #[must_use]
    pub fn template_vars(&self, year: i32) -> BTreeMap<String, String> {
        let mut vars: BTreeMap<String, String> = ConfigKey::ALL
            .into_iter()
            .filter_map(|key| {
                let name = key.template_var()?;
                let value = self.get_str(key)?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        let packages = self
            .packages()
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        vars.insert("R_PACKAGES".to_string(), packages);
        vars.insert("YEAR".to_string(), year.to_string());
        vars
    }

    /// Stable JSON rendering (`{ "section.key": { "value": …, "source": … } }`).
    ///
    /// Key order is fixed, so identical stores render byte-identically.
    #[must_use]
    pub fn to_json(&self) -> String {
        let map: BTreeMap<&str, &ConfigValue> =
            self.values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        serde_json::to_string_pretty(&map).unwrap_or_default()
    }
}
