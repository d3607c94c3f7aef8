//! Top-level command registry and line-level completion

use indexmap::IndexMap;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

use super::line::{self, SplitLine};
use crate::completion::{ArgCompleter, CompletionHost, CompletionItem, Completions, basic_complete};
use crate::error::SchemaError;
use crate::grammar::{CompletionRequest, Grammar};

/// Name of the built-in help command
pub const HELP_COMMAND: &str = "help";

/// Completions for a whole input line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCompletion {
    /// Byte offset the candidates replace from
    pub start: usize,
    pub completions: Completions,
}

/// Ordered set of the commands a shell understands
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: IndexMap<String, Grammar>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a command set, rejecting duplicate names
    pub fn from_grammars(grammars: Vec<Grammar>) -> Result<Self, SchemaError> {
        let mut set = Self::new();
        for grammar in grammars {
            set.insert(grammar)?;
        }
        Ok(set)
    }

    /// Register a command under its program name
    pub fn insert(&mut self, grammar: Grammar) -> Result<(), SchemaError> {
        let name = grammar.prog().to_string();
        if name == HELP_COMMAND || self.commands.contains_key(&name) {
            return Err(SchemaError::DuplicateSubcommand(name));
        }
        self.commands.insert(name, grammar);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Grammar> {
        self.commands.get(name)
    }

    /// Command names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Complete the word under the cursor
    ///
    /// # Arguments
    /// * `line` - Full input line
    /// * `pos` - Cursor position (byte index)
    /// * `host` - Host receiving hints and errors
    ///
    /// # Returns
    /// * `LineCompletion` - Replacement start and the candidates
    pub fn complete(&self, line: &str, pos: usize, host: &dyn CompletionHost) -> LineCompletion {
        let head = line.get(..pos).unwrap_or(line);
        let split = line::split_for_completion(head);
        let request = CompletionRequest {
            text: split.text(),
            line,
            begidx: split.begidx,
            endidx: head.len(),
        };

        let mut completions = self.complete_tokens(&split, &request, host);
        for item in &mut completions.items {
            let quoted = line::quote_candidate(&item.value).into_owned();
            item.value = quoted;
        }

        LineCompletion {
            start: split.begidx,
            completions,
        }
    }

    fn complete_tokens(
        &self,
        split: &SplitLine,
        request: &CompletionRequest<'_>,
        host: &dyn CompletionHost,
    ) -> Completions {
        let tokens = &split.tokens;
        if tokens.len() < 2 {
            return Completions::from_values(self.complete_command_name(request.text));
        }

        let command = tokens[0].as_str();
        if command == HELP_COMMAND {
            return self.complete_help(&tokens[1..], request, host);
        }

        match self.get(command) {
            Some(grammar) => ArgCompleter::new(grammar, host).resolve(tokens, request),
            None => {
                debug!("No completion for unknown command '{}'", command);
                Completions::default()
            }
        }
    }

    fn complete_command_name(&self, text: &str) -> Vec<String> {
        basic_complete(text, self.names().chain(std::iter::once(HELP_COMMAND)))
    }

    /// `help` completes a command name, then that command's subcommands
    fn complete_help(
        &self,
        tokens: &[String],
        request: &CompletionRequest<'_>,
        host: &dyn CompletionHost,
    ) -> Completions {
        if tokens.len() == 1 {
            return Completions::from_values(basic_complete(request.text, self.names()));
        }
        match self.get(&tokens[0]) {
            Some(grammar) => Completions::from_values(
                ArgCompleter::new(grammar, host).complete_subcommand_help(tokens, request),
            ),
            None => Completions::default(),
        }
    }

    /// Help text for `help [command [subcommand ...]]`
    ///
    /// # Arguments
    /// * `words` - Words after `help`
    pub fn help_text(&self, words: &[String], host: &dyn CompletionHost) -> String {
        let Some(command) = words.first() else {
            return self.command_list();
        };
        match self.get(command) {
            Some(grammar) => ArgCompleter::new(grammar, host).format_help(words),
            None => format!("No help on {command}"),
        }
    }

    /// Listing of every command with its description
    fn command_list(&self) -> String {
        let width = self
            .names()
            .chain(std::iter::once(HELP_COMMAND))
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            + 2;

        let mut out = String::from("Documented commands (use 'help <command>'):\n");
        for (name, grammar) in &self.commands {
            let description = grammar.description().unwrap_or_default();
            push_row(&mut out, name, first_line(description), width);
        }
        push_row(&mut out, HELP_COMMAND, "List commands or show help for one", width);
        out
    }
}

fn push_row(out: &mut String, name: &str, description: &str, width: usize) {
    out.push_str("  ");
    out.push_str(name);
    out.push_str(&" ".repeat(width.saturating_sub(name.width())));
    out.push_str(description);
    out.push('\n');
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

impl LineCompletion {
    pub fn matches(&self) -> Vec<String> {
        self.completions.matches()
    }
}

/// Sort candidates for display unless the engine already ordered them
pub fn display_order(completions: &mut Completions) {
    if !completions.matches_sorted {
        completions
            .items
            .sort_by_cached_key(|item: &CompletionItem| item.value.to_lowercase());
        completions.matches_sorted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::RecordingHost;
    use crate::grammar::Arg;

    fn command_set() -> CommandSet {
        let create = Grammar::builder("create")
            .description("Create an album")
            .arg(Arg::flag(["--title"]).choices(["Abbey Road", "Help!"]))
            .build()
            .unwrap();
        let music = Grammar::builder("music")
            .description("Manage music")
            .subcommand("create", create)
            .build()
            .unwrap();
        let play = Grammar::builder("play")
            .arg(Arg::positional("track").choices(["one", "two"]))
            .build()
            .unwrap();
        CommandSet::from_grammars(vec![music, play]).unwrap()
    }

    #[test]
    fn test_complete_command_names() {
        let set = command_set();
        let host = RecordingHost::new();
        let result = set.complete("", 0, &host);
        assert_eq!(result.start, 0);
        assert_eq!(result.matches(), vec!["music", "play", "help"]);

        let result = set.complete("pl", 2, &host);
        assert_eq!(result.matches(), vec!["play"]);
    }

    #[test]
    fn test_complete_arguments() {
        let set = command_set();
        let host = RecordingHost::new();
        let result = set.complete("play t", 6, &host);
        assert_eq!(result.start, 5);
        assert_eq!(result.matches(), vec!["two"]);
    }

    #[test]
    fn test_complete_uses_cursor_not_line_end() {
        let set = command_set();
        let host = RecordingHost::new();
        let result = set.complete("play o trailing", 6, &host);
        assert_eq!(result.matches(), vec!["one"]);
    }

    #[test]
    fn test_candidates_with_spaces_are_quoted() {
        let set = command_set();
        let host = RecordingHost::new();
        let line = "music create --title Ab";
        let result = set.complete(line, line.len(), &host);
        assert_eq!(result.matches(), vec!["'Abbey Road'"]);
        assert_eq!(result.start, 21);
    }

    #[test]
    fn test_complete_help_command() {
        let set = command_set();
        let host = RecordingHost::new();
        assert_eq!(set.complete("help m", 6, &host).matches(), vec!["music"]);
        assert_eq!(set.complete("help music ", 11, &host).matches(), vec!["create"]);
        assert!(set.complete("help play ", 10, &host).matches().is_empty());
    }

    #[test]
    fn test_unknown_command_is_silent() {
        let set = command_set();
        let host = RecordingHost::new();
        assert!(set.complete("nope ", 5, &host).matches().is_empty());
        assert!(host.messages().is_empty());
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let mut set = command_set();
        let again = Grammar::builder("play").build().unwrap();
        assert_eq!(
            set.insert(again),
            Err(SchemaError::DuplicateSubcommand("play".to_string()))
        );
        let help = Grammar::builder(HELP_COMMAND).build().unwrap();
        assert!(set.insert(help).is_err());
    }

    #[test]
    fn test_help_text() {
        let set = command_set();
        let host = RecordingHost::new();

        let listing = set.help_text(&[], &host);
        assert!(listing.contains("  music  Manage music"));
        assert!(listing.contains("  help   List commands"));

        let words = vec!["music".to_string(), "create".to_string()];
        assert!(set.help_text(&words, &host).starts_with("usage: create"));

        let words = vec!["nope".to_string()];
        assert_eq!(set.help_text(&words, &host), "No help on nope");
    }

    #[test]
    fn test_display_order() {
        let mut completions = Completions::from_values(["b", "A", "c"]);
        display_order(&mut completions);
        assert_eq!(completions.matches(), vec!["A", "b", "c"]);
        assert!(completions.matches_sorted);

        let mut presorted = Completions::from_values(["10", "9"]);
        presorted.matches_sorted = true;
        display_order(&mut presorted);
        assert_eq!(presorted.matches(), vec!["10", "9"]);
    }
}
