//! Interactive yes/no confirmation.
use std::io::{BufRead, IsTerminal, Write};

use anyhow::{Context as _, Result};

/// Asks the user a yes/no question.
#[cfg_attr(test, mockall::automock)]
pub trait Prompt {
    /// Ask `question`; `Ok(true)` means the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Prompt on the controlling terminal.
///
/// When stdin is not a terminal nothing is asked and the answer is "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return Ok(false);
        }
        let mut stderr = std::io::stderr().lock();
        write!(stderr, "{question} [y/N] ").context("writing prompt")?;
        stderr.flush().context("flushing prompt")?;

        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .context("reading answer")?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
