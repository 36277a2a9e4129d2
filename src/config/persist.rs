//! Writing configuration files: `config set` and `config init`.
//!
//! Edits are line-wise so comments, ordering and unknown keys survive.
use std::fs;
use std::path::Path;

use super::keys::ConfigKey;
use super::loader::split_key;
use super::store::Value;
use crate::error::ConfigError;

/// Commented starter file written by `config init`.
pub const STARTER: &str = "\
# rscaffold configuration
#
# Per-project settings live in rscaffold.yaml in the project root and take
# precedence over this file. Command-line flags take precedence over both.
defaults:
  # team_name: \"my-team\"
  # github_account: \"my-account\"
  # author_name: \"Jane Doe\"
  # author_email: \"jane@example.org\"
  # build_mode: \"standard\"         # fast | standard | comprehensive
  # profile_name: \"minimal\"        # minimal | analysis | modeling | publishing
  # base_image: \"rocker/r-ver\"
  # r_version: \"4.4.1\"
  # dotfiles_dir: \"~/dotfiles\"
  # dotfiles_nodot: false
  # auto_github: false
  # skip_confirmation: false

# Package bundles installed for each build mode.
build_modes:
  # fast: [renv, here, usethis]
";

/// Render a value the way it is written to a file.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| {
                    if !item.is_empty()
                        && item
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
                    {
                        item.clone()
                    } else {
                        quote(item)
                    }
                })
                .collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    if s.contains('"') || s.contains('\\') {
        format!("'{}'", s.replace('\'', "''"))
    } else {
        format!("\"{s}\"")
    }
}

/// Indentation and normalized key of a `key:` line, if it is one.
fn line_key(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
        return None;
    }
    let (key, _) = split_key(trimmed)?;
    Some((line.len() - trimmed.len(), key.replace('-', "_")))
}

fn is_section_header(line: &str, section: &str) -> bool {
    let Some((0, key)) = line_key(line) else {
        return false;
    };
    let rest = split_key(line).map_or("", |(_, rest)| rest).trim();
    key == section && (rest.is_empty() || rest.starts_with('#'))
}

/// Return `content` with `key` set to `value`.
///
/// An existing entry is replaced in place (including any block list below
/// it); otherwise the entry is added at the end of its section, and the
/// section is appended when absent.  Everything else is left untouched.
#[must_use]
pub fn edit(content: &str, key: ConfigKey, value: &Value) -> String {
    let (section, name) = key.split();
    let entry = format!("{name}: {}", render_value(value));
    let lines: Vec<&str> = content.lines().collect();

    let Some(header) = lines.iter().position(|l| is_section_header(l, section)) else {
        let mut out: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
        while out.last().is_some_and(|l| l.trim().is_empty()) {
            out.pop();
        }
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push(format!("{section}:"));
        out.push(format!("  {entry}"));
        return join(&out);
    };

    let end = lines
        .iter()
        .enumerate()
        .skip(header + 1)
        .find(|(_, l)| {
            let t = l.trim_start();
            !t.is_empty() && !t.starts_with('#') && t.len() == l.len()
        })
        .map_or(lines.len(), |(i, _)| i);

    let child_indent = lines
        .iter()
        .take(end)
        .skip(header + 1)
        .filter_map(|l| line_key(l))
        .map(|(indent, _)| indent)
        .find(|indent| *indent > 0)
        .unwrap_or(2);
    let replacement = format!("{}{entry}", " ".repeat(child_indent));

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
    let mut replaced = false;
    let mut last_child = header;
    let mut skipping = false;
    for (i, line) in lines.iter().enumerate() {
        if i <= header || i >= end {
            out.push((*line).to_string());
            continue;
        }
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if skipping {
            let nested = indent > child_indent || (indent == child_indent && trimmed.starts_with('-'));
            if !trimmed.is_empty() && nested {
                continue;
            }
            skipping = false;
        }
        if let Some((found, k)) = line_key(line)
            && found == child_indent
            && k == name
        {
            out.push(replacement.clone());
            replaced = true;
            skipping = true;
            last_child = out.len() - 1;
            continue;
        }
        out.push((*line).to_string());
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            last_child = out.len() - 1;
        }
    }
    if !replaced {
        out.insert(last_child + 1, replacement);
    }
    join(&out)
}

fn join(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Set `key` to `value` in the file at `path`, creating it if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Unreadable`] if the existing file cannot be read and
/// [`ConfigError::Unwritable`] if the file or its directory cannot be
/// written.
pub fn set_value(path: &Path, key: ConfigKey, value: &Value) -> Result<(), ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    write_atomic(path, &edit(&content, key, value))
}

/// Write the commented starter file to `path`.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] if the file exists and `force` is
/// not set, or [`ConfigError::Unwritable`] if it cannot be written.
pub fn init(path: &Path, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    write_atomic(path, STARTER)
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let unwritable = |source| ConfigError::Unwritable {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, content).map_err(unwritable)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        unwritable(e)
    })
}
