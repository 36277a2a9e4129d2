//! Subprocess seam for docker, git and gh.
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Output};

/// Captured output of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Successful, empty output.
    #[must_use]
    pub const fn empty_success() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs on behalf of the collaborators.
pub trait Executor {
    /// Run `program` in the current directory.
    ///
    /// # Errors
    ///
    /// Fails if the program cannot be started or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run `program` with `dir` as its working directory.
    ///
    /// # Errors
    ///
    /// Fails if the program cannot be started or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Run `program` and hand back its output whatever the exit status.
    ///
    /// # Errors
    ///
    /// Fails only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;

    /// Whether `program` resolves on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn spawn(program: &str, args: &[&str], dir: Option<&Path>) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = cmd
        .output()
        .with_context(|| format!("cannot start {program}"))?;
    Ok(CommandOutput::from(output))
}

fn require_success(output: CommandOutput, program: &str, args: &[&str]) -> Result<CommandOutput> {
    if output.success {
        return Ok(output);
    }
    let status = output
        .code
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    bail!(
        "`{program} {}` exited with {status}: {}",
        args.join(" "),
        output.stderr.trim()
    )
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        require_success(spawn(program, args, None)?, program, args)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        require_success(spawn(program, args, Some(dir))?, program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        spawn(program, args, None)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
