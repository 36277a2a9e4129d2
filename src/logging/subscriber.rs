//! Tracing subscriber setup: console formatter, file layer, and initialisation.
//!
//! Every console line goes to stderr so that stdout carries only command
//! output (`config get`, `config list --json`, `catalogue`, completions).
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{strip_ansi, timestamp};

/// Target for stage headers.
pub(super) const STAGE_TARGET: &str = "rscaffold::stage";
/// Target for dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "rscaffold::dry_run";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Line {
    fn classify(level: Level, target: &str) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if target == STAGE_TARGET => Self::Stage,
            Level::INFO if target == DRY_RUN_TARGET => Self::DryRun,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Plain-text prefix used in the log file.
    const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "==> ",
            Self::DryRun => "    [dry run] ",
            Self::Error => "    [error] ",
            Self::Warn => "    [warn] ",
            Self::Info => "    ",
            Self::Debug => "    [debug] ",
        }
    }
}

/// Classify `event` and pull out its `message` field.
fn read_event(event: &tracing::Event<'_>) -> (Line, String) {
    let metadata = event.metadata();
    let mut visitor = MessageVisitor::default();
    event.record(&mut visitor);
    (
        Line::classify(*metadata.level(), metadata.target()),
        visitor.0,
    )
}

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

/// Appends every event to the per-command log file, timestamped and with
/// ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path`, write the run header and open it for appending.
    ///
    /// Returns `None` if the file cannot be written.
    pub(super) fn new(path: &Path) -> Option<Self> {
        let header = format!("# rscaffold {} started {}\n", crate::VERSION, timestamp());
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        let (line, msg) = read_event(event);
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{} {}{}", timestamp(), line.file_tag(), strip_ansi(&msg)).ok();
        }
    }
}

/// Console formatter: coloured `==>` stage headers, indented info lines and
/// `WARN`/`ERROR` prefixes.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let (line, msg) = read_event(event);
        match line {
            Line::Error => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Line::Warn => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Line::Stage => writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
            Line::DryRun => writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
            Line::Info => writeln!(writer, "  {msg}"),
            Line::Debug => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console shows `info` and above (`debug` too with `verbose`); the log
/// file, when given, receives everything from `debug` up.  Call once, before
/// any logging.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(std::io::stderr)
        .with_filter(console_level);

    let file_layer = log_file
        .and_then(FileLayer::new)
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
