// Shared helpers for integration tests.
//
// Provides a temporary project directory with its own isolated configuration
// files and dotfiles directory, plus scripted stand-ins for the prompt and
// process executor, so each test can drive a command end to end without
// touching the real home directory or spawning tools.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rscaffold_cli::catalogue::DOTFILES;
use rscaffold_cli::cli::GlobalOpts;
use rscaffold_cli::commands::create::Collaborators;
use rscaffold_cli::config::Environment;
use rscaffold_cli::exec::{CommandOutput, Executor};
use rscaffold_cli::logging::Logger;
use rscaffold_cli::manifest;
use rscaffold_cli::prompt::Prompt;

/// Project directory name; a valid R package name.
pub const PROJECT: &str = "demo";

/// An isolated test workspace backed by a [`tempfile::TempDir`].
///
/// Layout:
/// - `demo/`          the target directory
/// - `system.yaml`    system tier (absent unless written)
/// - `user.yaml`      user tier (absent unless written)
/// - `dotfiles/`      populated by [`TestContextBuilder::with_dotfiles`]
pub struct IntegrationTestContext {
    /// Temporary directory holding everything.
    pub dir: tempfile::TempDir,
    /// Captured environment pointing at the files above.
    pub env: Environment,
}

impl IntegrationTestContext {
    /// Create a context with an empty target directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(dir.path().join(PROJECT)).expect("create project dir");
        let env = Environment {
            system_config: Some(dir.path().join("system.yaml")),
            user_config: Some(dir.path().join("user.yaml")),
            home: Some(dir.path().join("home")),
            xdg_cache_home: Some(dir.path().join("cache")),
            ..Environment::default()
        };
        Self { dir, env }
    }

    /// Path to the target directory.
    pub fn root(&self) -> PathBuf {
        self.dir.path().join(PROJECT)
    }

    /// Path to the dotfiles directory.
    pub fn dotfiles_dir(&self) -> PathBuf {
        self.dir.path().join("dotfiles")
    }

    /// Path to the user-tier config file.
    pub fn user_config(&self) -> PathBuf {
        self.dir.path().join("user.yaml")
    }

    /// Global options targeting the project directory.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            dry_run: false,
            root: Some(self.root()),
        }
    }

    /// Global options for a dry run.
    pub fn dry_run(&self) -> GlobalOpts {
        GlobalOpts {
            dry_run: true,
            root: Some(self.root()),
        }
    }

    /// Every path below the target directory, relative and sorted.
    pub fn tree(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        walk(&self.root(), &self.root(), &mut out);
        out.sort();
        out
    }

    /// Manifest entries currently on disk.
    pub fn manifest_entries(&self) -> Vec<manifest::ManifestEntry> {
        manifest::read(&self.root()).expect("read manifest").entries
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        out.push(path.strip_prefix(root).expect("under root").to_path_buf());
        let is_real_dir = std::fs::symlink_metadata(&path)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_real_dir {
            walk(root, &path, out);
        }
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with an empty target directory.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write the user-tier config file.
    pub fn with_user_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.user_config(), content).expect("write user config");
        self
    }

    /// Write the project-tier config file.
    pub fn with_project_config(self, content: &str) -> Self {
        std::fs::write(self.ctx.root().join("rscaffold.yaml"), content)
            .expect("write project config");
        self
    }

    /// Create a file at `relative` below the target directory.
    pub fn with_existing_file(self, relative: &str, content: &str) -> Self {
        let path = self.ctx.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, content).expect("write existing file");
        self
    }

    /// Populate the dotfiles directory with every catalogue dotfile.
    pub fn with_dotfiles(self) -> Self {
        let dir = self.ctx.dotfiles_dir();
        std::fs::create_dir_all(&dir).expect("create dotfiles dir");
        for name in DOTFILES {
            std::fs::write(dir.join(name), format!("# {name}\n")).expect("write dotfile");
        }
        self
    }

    /// Finish building.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

/// A logger that writes no file.
pub fn logger() -> Logger {
    Logger::new(None)
}

/// Prompt with a fixed answer that remembers every question.
pub struct ScriptedPrompt {
    answer: bool,
    questions: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    /// Always answer `answer`.
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            questions: RefCell::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> Vec<String> {
        self.questions.borrow().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        self.questions.borrow_mut().push(question.to_string());
        Ok(self.answer)
    }
}

/// Executor that records commands and reports every tool as missing.
#[derive(Default)]
pub struct NoToolsExecutor {
    calls: Mutex<Vec<String>>,
}

impl NoToolsExecutor {
    /// Commands attempted so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{program} {}", args.join(" ")));
        }
        anyhow::bail!("{program} is not available in tests")
    }
}

impl Executor for NoToolsExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        self.record(program, args)
    }

    fn run_in(&self, _: &Path, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        self.record(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<CommandOutput> {
        self.record(program, args)
    }

    fn which(&self, _: &str) -> bool {
        false
    }
}

/// Bundle a prompt and executor for `create`.
pub fn collaborators<'a>(prompt: &'a ScriptedPrompt, exec: &'a NoToolsExecutor) -> Collaborators<'a> {
    Collaborators { prompt, exec }
}
