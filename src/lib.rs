//! argshell Library
//!
//! Grammar-driven tab completion and contextual help for interactive
//! command shells. Commands are described as argparse-style grammars (in
//! code or in a TOML schema); the completion engine replays the tokens
//! before the cursor the way the parser would consume them and offers the
//! flags, values or subcommands that may come next.
//!
//! # Modules
//!
//! - `grammar`: Command grammar model, builders, help rendering and the TOML schema
//! - `completion`: The completion engine and its host interface
//! - `repl`: Interactive shell built on reedline
//! - `cli`: Command-line interface of the `argshell` binary
//! - `config`: Configuration management
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```no_run
//! use argshell::config::Config;
//! use argshell::grammar::{Arg, Grammar};
//! use argshell::repl::{CommandSet, TerminalHost};
//!
//! let deploy = Grammar::builder("deploy")
//!     .arg(Arg::flag(["-e", "--env"]).choices(["staging", "production"]))
//!     .build()?;
//! let commands = CommandSet::from_grammars(vec![deploy])?;
//!
//! let config = Config::default();
//! let host = TerminalHost::new(config.completion.clone(), true);
//! let result = commands.complete("deploy --env p", 14, &host);
//! assert_eq!(result.matches(), vec!["production"]);
//! # Ok::<(), argshell::error::SchemaError>(())
//! ```

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod grammar;
pub mod repl;

// Re-export commonly used types
pub use completion::{ArgCompleter, CompletionHost, Completions, MessageKind};
pub use config::Config;
pub use error::{Result, ShellError};
pub use grammar::{Arg, Grammar};
pub use repl::{CommandSet, ReplEngine};
