//! Configuration source loading.
//!
//! A source is a YAML file with a `defaults:` section and an optional
//! `build_modes:` section.  Two strategies read it:
//!
//! - [`Strategy::Structured`] parses the document with `serde_yaml` and
//!   understands arbitrary nesting and lists.  It is only available with the
//!   `yaml` feature.
//! - [`Strategy::Line`] matches `key: value` lines at the top two nesting
//!   levels.  It does not understand lists: every list-valued key it sees
//!   yields an empty list.  A repeated key keeps its last occurrence.
//!
//! The structured parser rejects a document with a repeated mapping key.
//! Such a file is re-read with the line strategy, so the last occurrence
//! wins but every `build_modes` list in the file comes back empty; a
//! "malformed YAML" [`Diagnostic`] records the downgrade.
//!
//! Both strategies strip surrounding quotes from scalars and treat `null`,
//! `~` or an empty value as "not set".  Loading never fails: a missing file
//! yields an empty source, an unreadable or malformed file yields whatever
//! could be parsed plus [`Diagnostic`]s.
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::keys::{ConfigKey, ValueKind, parse_bool};
use super::store::Value;

/// How a source file is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Full structural YAML parse.
    Structured,
    /// Line-oriented fallback.
    Line,
}

impl Strategy {
    /// Pick the best strategy this build supports.
    ///
    /// `force_line` selects the fallback even when the structured parser is
    /// compiled in.
    #[must_use]
    pub const fn detect(force_line: bool) -> Self {
        if force_line || !cfg!(feature = "yaml") {
            Self::Line
        } else {
            Self::Structured
        }
    }
}

/// A non-fatal problem found while loading a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the problem was found in.
    pub path: PathBuf,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// The recognized keys read from one source file.
#[derive(Debug, Clone, Default)]
pub struct LoadedSource {
    /// File that was read.
    pub path: PathBuf,
    /// Whether the file existed.
    pub present: bool,
    /// Recognized, non-null keys.
    pub values: BTreeMap<ConfigKey, Value>,
    /// Dotted names of keys that were present but not recognized.
    pub unknown_keys: Vec<String>,
    /// Strategy that produced `values`; `None` when nothing was parsed.
    pub strategy: Option<Strategy>,
    /// Non-fatal problems.
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedSource {
    /// `true` when the values came from the line-oriented fallback.
    #[must_use]
    pub fn degraded(&self) -> bool {
        self.strategy == Some(Strategy::Line)
    }
}

/// Raw value shape before it is matched against a key's type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Raw {
    Null,
    Scalar(String),
    List(Vec<String>),
    Nested,
}

#[derive(Debug, Clone)]
struct RawEntry {
    section: String,
    name: Option<String>,
    value: Raw,
}

/// Load `path` with `strategy`.
#[must_use]
pub fn load(path: &Path, strategy: Strategy) -> LoadedSource {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let mut source = parse_str(&content, path, strategy);
            source.present = true;
            source
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => LoadedSource {
            path: path.to_path_buf(),
            ..LoadedSource::default()
        },
        Err(e) => LoadedSource {
            path: path.to_path_buf(),
            present: true,
            diagnostics: vec![Diagnostic {
                path: path.to_path_buf(),
                message: format!("unreadable, skipped: {e}"),
            }],
            ..LoadedSource::default()
        },
    }
}

/// Parse source text that was read from `path`.
#[must_use]
pub fn parse_str(content: &str, path: &Path, strategy: Strategy) -> LoadedSource {
    let mut diagnostics = Vec::new();
    let (entries, used) = match strategy {
        Strategy::Structured => match structured_entries(content) {
            Ok(entries) => (entries, Strategy::Structured),
            Err(message) => {
                diagnostics.push(Diagnostic {
                    path: path.to_path_buf(),
                    message: format!("malformed YAML, recovered line by line: {message}"),
                });
                (line_entries(content, path, &mut diagnostics), Strategy::Line)
            }
        },
        Strategy::Line => (line_entries(content, path, &mut diagnostics), Strategy::Line),
    };

    let mut source = LoadedSource {
        path: path.to_path_buf(),
        present: true,
        strategy: Some(used),
        ..LoadedSource::default()
    };
    for entry in entries {
        interpret(entry, used, &mut source, &mut diagnostics);
    }
    source.diagnostics = diagnostics;
    source
}

/// Match a raw entry against the key space and store it.
fn interpret(
    entry: RawEntry,
    strategy: Strategy,
    source: &mut LoadedSource,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(name) = entry.name else {
        source.unknown_keys.push(entry.section);
        return;
    };
    let Some(key) = ConfigKey::lookup(&entry.section, &name) else {
        source.unknown_keys.push(format!("{}.{name}", entry.section));
        return;
    };

    let value = match (key.kind(), entry.value) {
        (ValueKind::List, _) if strategy == Strategy::Line => Value::List(Vec::new()),
        (_, Raw::Null) => {
            source.values.remove(&key);
            return;
        }
        (ValueKind::List, Raw::List(items)) => Value::List(items),
        (ValueKind::List, Raw::Scalar(s)) => Value::List(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        (ValueKind::Str, Raw::Scalar(s)) => Value::Str(s),
        (ValueKind::Bool, Raw::Scalar(s)) => {
            if let Some(b) = parse_bool(&s) {
                Value::Bool(b)
            } else {
                diagnostics.push(Diagnostic {
                    path: source.path.clone(),
                    message: format!("{key}: '{s}' is not a boolean, ignored"),
                });
                return;
            }
        }
        (_, _) => {
            diagnostics.push(Diagnostic {
                path: source.path.clone(),
                message: format!("{key}: expected a single value, ignored"),
            });
            return;
        }
    };
    source.values.insert(key, value);
}

#[cfg(feature = "yaml")]
fn structured_entries(content: &str) -> Result<Vec<RawEntry>, String> {
    use serde_yaml::Value as Yaml;

    fn scalar(value: &Yaml) -> Option<String> {
        match value {
            Yaml::Bool(b) => Some(b.to_string()),
            Yaml::Number(n) => Some(n.to_string()),
            Yaml::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn raw(value: &Yaml) -> Raw {
        match value {
            Yaml::Null => Raw::Null,
            Yaml::Sequence(items) => Raw::List(items.iter().filter_map(scalar).collect()),
            Yaml::Mapping(_) | Yaml::Tagged(_) => Raw::Nested,
            other => scalar(other).map_or(Raw::Null, Raw::Scalar),
        }
    }

    let doc: Yaml = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let root = match doc {
        Yaml::Null => return Ok(Vec::new()),
        Yaml::Mapping(root) => root,
        _ => return Err("top level is not a mapping".to_string()),
    };

    let mut entries = Vec::new();
    for (section, body) in &root {
        let Some(section) = scalar(section) else {
            continue;
        };
        match body {
            Yaml::Mapping(children) => {
                for (name, value) in children {
                    if let Some(name) = scalar(name) {
                        entries.push(RawEntry {
                            section: section.clone(),
                            name: Some(name),
                            value: raw(value),
                        });
                    }
                }
            }
            Yaml::Null => {}
            _ => entries.push(RawEntry {
                section,
                name: None,
                value: raw(body),
            }),
        }
    }
    Ok(entries)
}

#[cfg(not(feature = "yaml"))]
fn structured_entries(_content: &str) -> Result<Vec<RawEntry>, String> {
    Err("structured parser not available in this build".to_string())
}

/// Remove one pair of matching surrounding quotes.
pub(crate) fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if s.len() >= 2
            && let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}

/// Cut a trailing ` # comment` that is not inside a quoted value.
fn strip_inline_comment(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote) {
            return rest
                .find(quote)
                .and_then(|end| value.get(..end + 2))
                .unwrap_or(value);
        }
    }
    value
        .find(" #")
        .map_or(value, |idx| value.get(..idx).unwrap_or(value))
        .trim_end()
}

/// Split `key: rest` on the first colon followed by whitespace or end of line.
pub(crate) fn split_key(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    let mut search = 0;
    while let Some(rel) = line.get(search..).and_then(|s| s.find(':')) {
        let idx = search + rel;
        let next = bytes.get(idx + 1).copied();
        if next.is_none() || next.is_some_and(|b| b == b' ' || b == b'\t') {
            let key = strip_quotes(line.get(..idx)?);
            let rest = line.get(idx + 1..).unwrap_or("");
            return Some((key, rest));
        }
        search = idx + 1;
    }
    None
}

fn line_raw(rest: &str) -> Raw {
    let rest = strip_inline_comment(rest);
    match rest {
        "" | "null" | "~" => Raw::Null,
        r if r.starts_with('[') => Raw::List(Vec::new()),
        r if r.starts_with('{') => Raw::Nested,
        r => Raw::Scalar(strip_quotes(r).to_string()),
    }
}

fn line_entries(content: &str, path: &Path, diagnostics: &mut Vec<Diagnostic>) -> Vec<RawEntry> {
    let mut entries = Vec::new();
    let mut section: Option<String> = None;
    let mut child_indent: Option<usize> = None;
    let mut warn = |line_no: usize, message: &str| {
        diagnostics.push(Diagnostic {
            path: path.to_path_buf(),
            message: format!("line {line_no}: {message}"),
        });
    };

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" {
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        if trimmed.starts_with("- ") || trimmed == "-" {
            // Sequence items belong to the preceding key; lists are not
            // supported here.
            continue;
        }

        let Some((key, rest)) = split_key(trimmed) else {
            warn(line_no, "expected 'key: value'");
            continue;
        };

        if indent == 0 {
            child_indent = None;
            if strip_inline_comment(rest).is_empty() {
                section = Some(key.to_string());
            } else {
                section = None;
                entries.push(RawEntry {
                    section: key.to_string(),
                    name: None,
                    value: line_raw(rest),
                });
            }
            continue;
        }

        let Some(current) = section.as_ref() else {
            warn(line_no, "indented key outside of any section");
            continue;
        };
        let level = *child_indent.get_or_insert(indent);
        if indent > level {
            // Third nesting level and deeper is ignored.
            continue;
        }
        if indent < level {
            warn(line_no, "inconsistent indentation");
            continue;
        }
        entries.push(RawEntry {
            section: current.clone(),
            name: Some(key.to_string()),
            value: line_raw(rest),
        });
    }
    entries
}
