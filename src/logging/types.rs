//! Core logging types: artifact outcomes and the [`Log`] trait.

/// One artifact (or collaborator step) result for summary reporting.
#[derive(Debug, Clone)]
pub struct OutcomeEntry {
    /// Path or step name.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// Skip reason or error description.
    pub message: Option<String>,
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Created (or, for a collaborator, completed).
    Created,
    /// Removed by reversal.
    Removed,
    /// Left alone: it already existed, was blocked, or must be kept.
    Skipped,
    /// Would be created or removed; dry run.
    DryRun,
    /// The operation failed.
    Failed,
}

impl Outcome {
    /// Summary label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Removed => "removed",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// The scaffolding and reversal engines log through this trait so tests
/// can inspect what was recorded.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an artifact result for the summary.
    fn record(&self, name: &str, outcome: Outcome, message: Option<&str>);
}
