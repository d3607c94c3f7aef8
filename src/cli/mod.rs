//! Command-line interface for argshell
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Loading the command schema
//! - One-shot subcommands (completion, help, config inspection)

mod completion;
mod providers;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::completion::CompletionHost;
use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::repl::{self, CommandSet, TerminalHost};

pub use completion::{generate_completion, print_completion};
pub use providers::{complete_path_in, default_loader};

/// Schema used when no `--schema` file is given
pub const DEMO_SCHEMA: &str = include_str!("../../demos/shell.toml");

/// argshell - argparse-style tab completion for interactive shells
#[derive(Parser, Debug)]
#[command(
    name = "argshell",
    version,
    disable_help_subcommand = true,
    about = "Interactive shell with argparse-style tab completion",
    long_about = "An interactive shell whose commands are described by a TOML schema.
Tab completes flags, choices and subcommands the way argparse would parse them."
)]
pub struct CliArgs {
    /// Command schema file (TOML)
    #[arg(short = 's', long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for argshell
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Print the completions for a line, one per line
    Complete {
        /// Input line; completion happens at its end
        #[arg(value_name = "LINE")]
        line: String,
    },

    /// Print help for a command or subcommand
    Help {
        /// Command followed by subcommand names
        #[arg(value_name = "WORDS")]
        words: Vec<String>,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    /// Apply CLI arguments to override config values
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }

        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Get parsed arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Get effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the command set from `--schema` or the built-in demo schema
    pub fn load_commands(&self) -> Result<CommandSet> {
        let loader = default_loader();
        let grammars = match &self.args.schema {
            Some(path) => {
                debug!("Loading schema from {}", path.display());
                loader.load_file(path)?
            }
            None => loader.parse(DEMO_SCHEMA)?,
        };
        Ok(CommandSet::from_grammars(grammars)?)
    }

    /// Host used for one-shot completion and help
    pub fn terminal_host(&self) -> TerminalHost {
        TerminalHost::new(
            self.config.completion.clone(),
            self.config.display.color_output,
        )
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                print_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            Some(Commands::Complete { line }) => {
                let commands = self.load_commands()?;
                print!("{}", complete_line(&commands, &self.terminal_host(), line));
                Ok(true)
            }
            Some(Commands::Help { words }) => {
                let commands = self.load_commands()?;
                let host = self.terminal_host();
                let text = commands.help_text(words, &host);
                println!("{}", text.trim_end());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("argshell version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist");
            return;
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => println!("Configuration validation failed: {}", e),
            },
            Err(e) => println!("Failed to load configuration: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .as_deref()
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_path)
    }

    /// Print banner with version and available commands
    pub fn print_banner(&self, commands: &CommandSet) {
        if !self.args.quiet {
            println!("argshell {}", env!("CARGO_PKG_VERSION"));
            let names: Vec<&str> = commands.names().collect();
            println!(
                "Commands: {} (type 'help', press Tab to complete, Ctrl-D to quit)",
                names.join(", ")
            );
        }
    }
}

/// Completions for a line as printed by `argshell complete`.
///
/// The descriptive table is printed when the engine built one, otherwise
/// one candidate per line.
pub fn complete_line(commands: &CommandSet, host: &dyn CompletionHost, line: &str) -> String {
    let mut result = commands.complete(line, line.len(), host);
    repl::display_order(&mut result.completions);

    let mut out = String::new();
    match &result.completions.display {
        Some(display) => {
            out.push_str(display.header.trim_start_matches('\n'));
            out.push('\n');
            for entry in &display.entries {
                out.push_str(entry.trim_end());
                out.push('\n');
            }
        }
        None => {
            for value in result.matches() {
                out.push_str(&value);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::RecordingHost;

    fn demo_commands() -> CommandSet {
        CommandSet::from_grammars(default_loader().parse(DEMO_SCHEMA).unwrap()).unwrap()
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(vec!["argshell"]).unwrap();
        assert!(args.schema.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_with_flags() {
        let args =
            CliArgs::try_parse_from(vec!["argshell", "--no-color", "--quiet", "-s", "x.toml"])
                .unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
        assert_eq!(args.schema, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_cli_complete_subcommand() {
        let args = CliArgs::try_parse_from(vec!["argshell", "complete", "music cr"]).unwrap();
        match args.command {
            Some(Commands::Complete { line }) => assert_eq!(line, "music cr"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_help_subcommand_takes_words() {
        let args =
            CliArgs::try_parse_from(vec!["argshell", "help", "music", "create"]).unwrap();
        match args.command {
            Some(Commands::Help { words }) => assert_eq!(words, vec!["music", "create"]),
            other => panic!("unexpected command: {other:?}"),
        }

        let args = CliArgs::try_parse_from(vec!["argshell", "help"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Help { words }) if words.is_empty()));
    }

    #[test]
    fn test_args_override_config() {
        let mut config = Config::default();
        let args = CliArgs::try_parse_from(vec!["argshell", "--no-color", "--vv"]).unwrap();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert!(!config.display.color_output);
        assert_eq!(config.logging.level, LogLevel::Trace);

        let mut config = Config::default();
        let args = CliArgs::try_parse_from(vec!["argshell", "-q"]).unwrap();
        CliInterface::apply_args_to_config(&mut config, &args);
        assert_eq!(config.logging.level, LogLevel::Error);
    }

    #[test]
    fn test_complete_line_plain() {
        let host = RecordingHost::new();
        assert_eq!(complete_line(&demo_commands(), &host, "music cr"), "create\n");
        assert_eq!(
            complete_line(&demo_commands(), &host, "music play --volume 1"),
            "1\n10\n11\n"
        );
    }

    #[test]
    fn test_complete_line_descriptive() {
        let host = RecordingHost::new();
        let out = complete_line(&demo_commands(), &host, "music create --genre ");
        let lines: Vec<&str> = out.lines().collect();
        // widest value "classical" sets the value column to 11
        assert_eq!(lines[0], "GENRE      Style");
        assert_eq!(lines[1], "ambient    Background textures");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_complete_line_mutex_conflict() {
        let host = RecordingHost::new();
        let out = complete_line(&demo_commands(), &host, "copy --json --quiet ");
        assert_eq!(out, "");
        assert_eq!(
            host.errors(),
            vec!["\nError: argument --quiet: not allowed with argument --json\n".to_string()]
        );
    }
}
