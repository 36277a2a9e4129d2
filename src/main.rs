use std::io::Write as _;

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use rscaffold_cli::cli::{Cli, Command};
use rscaffold_cli::commands;
use rscaffold_cli::commands::create::Collaborators;
use rscaffold_cli::config::Environment;
use rscaffold_cli::exec::SystemExecutor;
use rscaffold_cli::logging::{self, Logger};
use rscaffold_cli::prompt::TerminalPrompt;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let env = Environment::capture();

    let log_file = match &args.command {
        Command::Create(_) => logging::log_file_path(&env.cache_dir(), "create"),
        Command::Uninstall(_) => logging::log_file_path(&env.cache_dir(), "uninstall"),
        _ => None,
    };
    logging::init_subscriber(args.verbose, log_file.as_deref());
    let log = Logger::new(log_file);

    match &args.command {
        Command::Create(opts) => {
            let collab = Collaborators {
                prompt: &TerminalPrompt,
                exec: &SystemExecutor,
            };
            commands::create::run(&args.global, opts, &env, &log, collab)
        }
        Command::Uninstall(opts) => commands::uninstall::run(&args.global, opts, &log),
        Command::Config(opts) => commands::config::run(&args.global, opts, &env, &log),
        Command::Catalogue => commands::catalogue::run(&args.global, &env, &log),
        Command::Completions { shell } => {
            let mut stdout = std::io::stdout();
            clap_complete::generate(*shell, &mut Cli::command(), "rscaffold", &mut stdout);
            stdout.flush()?;
            Ok(())
        }
        Command::Version => commands::version::run(),
    }
}
