//! Completer for reedline - bridges the line editor to the command set

use std::sync::Arc;

use reedline::{Completer, Span, Suggestion};

use super::commands::{self, CommandSet};
use super::host::TerminalHost;

/// reedline completer backed by a [`CommandSet`]
pub struct ShellCompleter {
    commands: Arc<CommandSet>,
    host: TerminalHost,
}

impl ShellCompleter {
    /// Create a new completer
    ///
    /// # Arguments
    /// * `commands` - Commands shared with the REPL
    /// * `host` - Host receiving hints and errors
    pub fn new(commands: Arc<CommandSet>, host: TerminalHost) -> Self {
        Self { commands, host }
    }
}

impl Completer for ShellCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - List of completion suggestions
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let mut result = self.commands.complete(line, pos, &self.host);
        commands::display_order(&mut result.completions);

        let single = result.completions.len() == 1;
        result
            .completions
            .items
            .into_iter()
            .map(|item| Suggestion {
                value: item.value,
                description: item.description,
                style: None,
                extra: None,
                span: Span::new(result.start, pos),
                append_whitespace: single,
                match_indices: None,
            })
            .collect()
    }
}
