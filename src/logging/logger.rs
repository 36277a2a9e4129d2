//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, Outcome, OutcomeEntry};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Console and file output both go through the global [`tracing`]
/// subscriber set up by [`init_subscriber`](super::subscriber::init_subscriber);
/// the logger itself only remembers the log path for the summary.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<OutcomeEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<OutcomeEntry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record an artifact result for the summary.
    pub fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(OutcomeEntry {
                name: name.to_string(),
                outcome,
                message: message.map(String::from),
            });
        }
    }

    /// Number of entries with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard.iter().filter(|e| e.outcome == outcome).count()
        })
    }

    /// Count the number of failed entries.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(Outcome::Failed)
    }

    /// Print the end-of-run summary.
    ///
    /// Skipped and failed entries are listed with their reasons; created,
    /// removed and dry-run entries are only counted.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in &entries {
            let (icon, color) = match entry.outcome {
                Outcome::Skipped => ("○", "\x1b[33m"),
                Outcome::Failed => ("✗", "\x1b[31m"),
                Outcome::Created | Outcome::Removed | Outcome::DryRun => continue,
            };
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let mut parts = Vec::new();
        for (outcome, color) in [
            (Outcome::Created, "\x1b[32m"),
            (Outcome::Removed, "\x1b[32m"),
            (Outcome::DryRun, "\x1b[37m"),
            (Outcome::Skipped, "\x1b[33m"),
            (Outcome::Failed, "\x1b[31m"),
        ] {
            let n = entries.iter().filter(|e| e.outcome == outcome).count();
            let always = matches!(outcome, Outcome::Skipped | Outcome::Failed);
            if n > 0 || always {
                parts.push(format!("{color}{n} {}\x1b[0m", outcome.label()));
            }
        }
        self.info(&format!("{} artifacts: {}", entries.len(), parts.join(", ")));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, outcome: Outcome, message: Option<&str>) {
        self.record(name, outcome, message);
    }
}
