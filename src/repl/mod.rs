//! Interactive shell for argshell
//!
//! This module wires the completion engine into a terminal line editor:
//! - Command registry with a built-in `help` command
//! - Shell-style line splitting for completion
//! - Tab completion through a reedline columnar menu
//! - Command history management
//! - Hints and errors printed through a terminal host

mod commands;
mod completer;
mod engine;
mod host;
mod line;
mod prompt;

#[cfg(test)]
mod tests;

pub use commands::{CommandSet, HELP_COMMAND, LineCompletion, display_order};
pub use completer::ShellCompleter;
pub use engine::{ReplEngine, respond};
pub use host::TerminalHost;
pub use line::{SplitLine, quote_candidate, split_for_completion};
pub use prompt::ShellPrompt;
