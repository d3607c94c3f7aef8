//! argshell - argparse-style tab completion shell
//!
//! An interactive shell whose commands are declared in a TOML schema.
//! Tab completes flags, choices and subcommands; `help` renders usage.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode with the built-in demo commands
//! argshell
//!
//! # Interactive mode with your own commands
//! argshell --schema commands.toml
//!
//! # One-shot completion
//! argshell complete "music create --genre "
//! ```

use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use argshell::cli::CliInterface;
use argshell::error::Result;
use argshell::repl::ReplEngine;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive shell
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let commands = Arc::new(cli.load_commands()?);
    cli.print_banner(&commands);

    let mut repl = ReplEngine::new(commands, cli.config())?;
    repl.run()?;

    if !cli.args().quiet {
        println!("Goodbye!");
    }
    Ok(())
}

/// Initialize logging system based on configuration and verbosity
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
