//! Log file location, ANSI stripping and timestamps.
use std::fs;
use std::path::{Path, PathBuf};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement and erase codes
/// are also stripped without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Log file for `command` inside `cache_dir`, creating the directory.
///
/// Returns `None` when the directory cannot be created; logging then goes
/// to the console only.
#[must_use]
pub fn log_file_path(cache_dir: &Path, command: &str) -> Option<PathBuf> {
    fs::create_dir_all(cache_dir).ok()?;
    Some(cache_dir.join(format!("{command}.log")))
}

/// Current UTC time in the RFC 3339 form the manifest uses for
/// `created_at`, so log lines and manifest entries can be matched up.
pub(super) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }

    #[test]
    fn strip_ansi_handles_csi_sequences() {
        assert_eq!(strip_ansi("\x1b[2;5Htext"), "text");
        assert_eq!(strip_ansi("\x1b[Kworld"), "world");
        assert_eq!(strip_ansi("\x1bMtext"), "text");
    }

    #[test]
    fn log_file_path_creates_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("rscaffold");
        let path = log_file_path(&cache, "create").unwrap();
        assert!(cache.is_dir());
        assert_eq!(path, cache.join("create.log"));
    }

    #[test]
    fn timestamp_parses_as_utc() {
        let s = timestamp();
        assert!(s.ends_with('Z'), "{s}");
        let parsed = chrono::DateTime::parse_from_rfc3339(&s).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }
}
