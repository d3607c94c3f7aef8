//! Argument completer
//!
//! Replays every token except the last against a grammar to rebuild the
//! state a real parser would be in, then completes the last token from
//! that state. Subcommands are handled by recursing into the nested
//! grammar with the tokens gathered so far passed down as parent context.
//!
//! Problems found along the way (an unfinished flag, a mutually exclusive
//! conflict, a failing choice source) are reported through the host and
//! end the request with no completions.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use super::format::{self, CompletionItem, Completions};
use super::host::{CompletionHost, MessageKind};
use super::matching::{basic_complete, is_single_prefix_char, looks_like_flag};
use super::state::ArgumentState;
use crate::error::ResolveError;
use crate::grammar::{
    ArgDef, ArgId, ArgTokens, Choice, ChoiceSource, CompletionRequest, Grammar, GroupId, help,
};

/// End-of-options marker
const END_OF_OPTIONS: &str = "--";

/// Completes command lines for one grammar
pub struct ArgCompleter<'a> {
    grammar: &'a Grammar,
    host: &'a dyn CompletionHost,
    parent_tokens: ArgTokens,
}

/// Parser state rebuilt from the tokens before the cursor
struct Replay<'g> {
    grammar: &'g Grammar,
    remaining_positionals: VecDeque<ArgId>,
    skip_remaining_flags: bool,
    pos_state: Option<ArgumentState<'g>>,
    flag_state: Option<ArgumentState<'g>>,
    matched_flags: HashSet<&'g str>,
    consumed: ArgTokens,
    completed_groups: HashMap<GroupId, ArgId>,
}

impl<'a> ArgCompleter<'a> {
    /// Create a completer for a top-level command
    pub fn new(grammar: &'a Grammar, host: &'a dyn CompletionHost) -> Self {
        Self::with_parent_tokens(grammar, host, ArgTokens::new())
    }

    /// Create a completer for a subcommand, carrying its ancestors' tokens
    pub fn with_parent_tokens(
        grammar: &'a Grammar,
        host: &'a dyn CompletionHost,
        parent_tokens: ArgTokens,
    ) -> Self {
        Self {
            grammar,
            host,
            parent_tokens,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        self.grammar
    }

    /// Complete the last token of a command line
    ///
    /// # Arguments
    /// * `tokens` - Command line tokens, with the command word first
    /// * `request` - Fragment under the cursor, the full line and cursor bounds
    ///
    /// # Returns
    /// * `Vec<String>` - Candidate completions, empty when none apply
    pub fn complete(&self, tokens: &[String], request: &CompletionRequest<'_>) -> Vec<String> {
        self.resolve(tokens, request).matches()
    }

    /// Like [`complete`](Self::complete) but keeps sort state and the
    /// descriptive display for the host
    pub fn resolve(&self, tokens: &[String], request: &CompletionRequest<'_>) -> Completions {
        match self.try_resolve(tokens, request) {
            Ok(completions) => completions,
            Err(err) => {
                debug!("Completion aborted: {:?}", err);
                if err.is_reported() {
                    self.host
                        .print_message(MessageKind::Error, &format!("\n{err}\n"));
                }
                Completions::default()
            }
        }
    }

    /// Resolve completions, returning the condition that ended the request
    /// early instead of reporting it
    pub fn try_resolve(
        &self,
        tokens: &[String],
        request: &CompletionRequest<'_>,
    ) -> Result<Completions, ResolveError> {
        let Some(tokens) = normalize_tokens(tokens, request.text) else {
            return Ok(Completions::default());
        };

        let mut replay = Replay::new(self.grammar);
        let last = tokens.len() - 1;

        for (index, token) in tokens.iter().enumerate().take(last).skip(1) {
            if let Some(child) = replay.feed(token)? {
                debug!("Delegating to subcommand '{}'", token);
                let parent_tokens = self.child_parent_tokens(&replay.consumed, token);
                let completer = ArgCompleter::with_parent_tokens(child, self.host, parent_tokens);
                return completer.try_resolve(&tokens[index..], request);
            }
        }

        self.resolve_last(replay, request)
    }

    /// Complete a subcommand name for the shell's `help` command
    ///
    /// # Arguments
    /// * `tokens` - Tokens after `help`, starting with the command word
    /// * `request` - Fragment under the cursor, the full line and cursor bounds
    pub fn complete_subcommand_help(
        &self,
        tokens: &[String],
        request: &CompletionRequest<'_>,
    ) -> Vec<String> {
        let Some(tokens) = normalize_tokens(tokens, request.text) else {
            return Vec::new();
        };
        let Some(subcommands) = self
            .grammar
            .dispatch()
            .and_then(|id| self.grammar.arg(id).subcommands())
        else {
            return Vec::new();
        };

        let last = tokens.len() - 1;
        for (index, token) in tokens.iter().enumerate().skip(1) {
            if let Some(child) = subcommands.get(token) {
                return ArgCompleter::new(child, self.host)
                    .complete_subcommand_help(&tokens[index..], request);
            } else if index == last {
                return basic_complete(request.text, subcommands.keys());
            } else {
                break;
            }
        }
        Vec::new()
    }

    /// Help text of the most specific subcommand named by the tokens
    pub fn format_help(&self, tokens: &[String]) -> String {
        if let Some(child) = tokens.get(1).and_then(|token| self.grammar.subcommand(token)) {
            return ArgCompleter::new(child, self.host).format_help(&tokens[1..]);
        }
        self.grammar.format_help()
    }

    /// Ancestor tokens plus everything consumed here, plus the subcommand
    /// name when the dispatch positional records it
    fn child_parent_tokens(&self, consumed: &ArgTokens, subcommand: &str) -> ArgTokens {
        let mut merged = self.parent_tokens.clone();
        for (dest, values) in consumed {
            merged.insert(dest.clone(), values.clone());
        }
        if let Some(dispatch) = self.grammar.dispatch().map(|id| self.grammar.arg(id))
            && dispatch.records_dest()
        {
            merged.insert(dispatch.dest().to_string(), vec![subcommand.to_string()]);
        }
        merged
    }

    fn resolve_last(
        &self,
        mut replay: Replay<'a>,
        request: &CompletionRequest<'_>,
    ) -> Result<Completions, ResolveError> {
        let text = request.text;
        let skip = replay.skip_remaining_flags;

        // A lone prefix character is left for the end since it may start a
        // negative number that is a valid value
        if looks_like_flag(text, self.grammar) && !skip {
            replay.check_unfinished_flag()?;
            return Ok(self.complete_flags(text, &replay.matched_flags));
        }

        let mut results = Completions::default();

        if let Some(flag) = &replay.flag_state {
            results = self.complete_for_arg(flag.def, request, &replay.consumed)?;
            if !results.is_empty() {
                return Ok(results);
            }
            if flag.is_unfinished() || !is_single_prefix_char(text, self.grammar) || skip {
                self.print_arg_hint(flag.def);
                return Ok(Completions::default());
            }
        } else if let Some(state) = replay.take_positional() {
            results = self.complete_for_arg(state.def, request, &replay.consumed)?;
            if !results.is_empty() {
                return Ok(results);
            }
            if !is_single_prefix_char(text, self.grammar) || skip {
                self.print_arg_hint(state.def);
                return Ok(Completions::default());
            }
        }

        if is_single_prefix_char(text, self.grammar) && !skip {
            return Ok(self.complete_flags(text, &replay.matched_flags));
        }

        Ok(results)
    }

    /// Unused, visible flag aliases starting with `text`
    fn complete_flags(&self, text: &str, matched_flags: &HashSet<&str>) -> Completions {
        let candidates = self
            .grammar
            .flags()
            .filter(|(alias, _)| !matched_flags.contains(alias))
            .filter(|(_, id)| !self.grammar.arg(*id).is_hidden())
            .map(|(alias, _)| alias);
        Completions::from_values(basic_complete(text, candidates))
    }

    fn complete_for_arg(
        &self,
        def: &ArgDef,
        request: &CompletionRequest<'_>,
        consumed: &ArgTokens,
    ) -> Result<Completions, ResolveError> {
        let mut completions = Completions::default();

        let choices: Vec<Choice> = if let Some(subcommands) = def.subcommands() {
            let names = subcommands.keys().map(|name| Choice::new(name.as_str()));
            self.filter_choices(def, names.collect(), request.text, consumed, &mut completions)
        } else {
            let Some(source) = def.choices() else {
                return Ok(completions);
            };

            let arg_tokens = source
                .wants_arg_tokens()
                .then(|| self.arg_tokens(def, request.text, consumed));
            let source_error = |error| ResolveError::ChoiceSource {
                name: help::display_name(def),
                error,
            };

            match source {
                ChoiceSource::Completer { completer, .. } => completer
                    .complete(request, arg_tokens.as_ref())
                    .map_err(source_error)?,
                ChoiceSource::Choices { provider, .. } => {
                    let provided = provider
                        .choices(arg_tokens.as_ref())
                        .map_err(source_error)?;
                    self.filter_choices(def, provided, request.text, consumed, &mut completions)
                }
                ChoiceSource::Static(fixed) => {
                    self.filter_choices(def, fixed.clone(), request.text, consumed, &mut completions)
                }
            }
        };

        completions.items = choices
            .into_iter()
            .map(|choice| CompletionItem {
                value: choice.value.to_string(),
                description: choice.description,
            })
            .collect();
        self.format_completions(def, &mut completions);
        Ok(completions)
    }

    /// Numeric pre-sort, used-value filtering and prefix matching
    fn filter_choices(
        &self,
        def: &ArgDef,
        mut choices: Vec<Choice>,
        text: &str,
        consumed: &ArgTokens,
        completions: &mut Completions,
    ) -> Vec<Choice> {
        if !completions.matches_sorted && choices.iter().all(Choice::is_numeric) {
            choices.sort_by(|a, b| {
                a.value
                    .as_f64()
                    .partial_cmp(&b.value.as_f64())
                    .unwrap_or(Ordering::Equal)
            });
            completions.matches_sorted = true;
        }

        let used = consumed.get(def.dest());
        choices
            .into_iter()
            .filter(|choice| {
                let value = choice.value.to_string();
                let already_used = used.is_some_and(|used| used.contains(&value));
                !already_used && value.starts_with(text)
            })
            .collect()
    }

    /// Tokens handed to a choice source that asked for them
    fn arg_tokens(&self, def: &ArgDef, text: &str, consumed: &ArgTokens) -> ArgTokens {
        let mut tokens = self.parent_tokens.clone();
        for (dest, values) in consumed {
            tokens.insert(dest.clone(), values.clone());
        }
        tokens
            .entry(def.dest().to_string())
            .or_default()
            .push(text.to_string());
        tokens
    }

    /// Stage the two-column display when candidates carry descriptions
    fn format_completions(&self, def: &ArgDef, completions: &mut Completions) {
        let settings = self.host.settings();
        let count = completions.items.len();
        if count <= 1 || count > settings.max_completion_items {
            return;
        }
        if completions.items[0].description.is_none() {
            return;
        }

        if !completions.matches_sorted {
            completions
                .items
                .sort_by_cached_key(|item| item.value.to_lowercase());
            completions.matches_sorted = true;
        }

        let header = def
            .descriptive_header()
            .unwrap_or(&settings.descriptive_header);
        completions.display = Some(format::describe(
            &completions.items,
            def.dest(),
            header,
            self.host.terminal_width(),
        ));
    }

    fn print_arg_hint(&self, def: &ArgDef) {
        if !self.host.settings().hints || def.is_hidden() || def.suppress_tab_hint() {
            return;
        }
        let hint = help::format_arg_hint(def);
        self.host
            .print_message(MessageKind::Hint, &format!("\n{hint}"));
    }
}

impl<'g> Replay<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            remaining_positionals: grammar.positionals().iter().copied().collect(),
            skip_remaining_flags: false,
            pos_state: None,
            flag_state: None,
            matched_flags: HashSet::new(),
            consumed: ArgTokens::new(),
            completed_groups: HashMap::new(),
        }
    }

    /// Apply one token. Returns the nested grammar when the token selects
    /// a subcommand, at which point the caller hands everything over.
    fn feed(&mut self, token: &str) -> Result<Option<&'g Grammar>, ResolveError> {
        if let Some(state) = self.pos_state.as_mut()
            && state.is_remainder
        {
            state.consume(token, &mut self.consumed);
            return Ok(None);
        }

        if let Some(state) = self.flag_state.as_mut()
            && state.is_remainder
        {
            if token == END_OF_OPTIONS {
                self.flag_state = None;
            } else {
                state.consume(token, &mut self.consumed);
            }
            return Ok(None);
        }

        if token == END_OF_OPTIONS && !self.skip_remaining_flags {
            self.check_unfinished_flag()?;
            self.flag_state = None;
            self.skip_remaining_flags = true;
            return Ok(None);
        }

        if looks_like_flag(token, self.grammar) && !self.skip_remaining_flags {
            self.check_unfinished_flag()?;
            self.flag_state = None;
            self.start_flag(token)?;
            return Ok(None);
        }

        if let Some(state) = self.flag_state.as_mut() {
            state.consume(token, &mut self.consumed);
            if state.is_full() {
                self.flag_state = None;
            }
            return Ok(None);
        }

        self.feed_positional(token)
    }

    fn start_flag(&mut self, token: &str) -> Result<(), ResolveError> {
        let Some(id) = self.grammar.match_flag(token) else {
            debug!("Ignoring unrecognized flag '{}'", token);
            return Ok(());
        };

        self.update_mutex_groups(id)?;

        let def = self.grammar.arg(id);
        if def.is_reusable() {
            self.consumed.entry(def.dest().to_string()).or_default();
        } else {
            self.matched_flags
                .extend(def.aliases().iter().map(String::as_str));
            self.consumed.insert(def.dest().to_string(), Vec::new());
        }

        let state = ArgumentState::new(id, def);
        if !state.arity.takes_no_values() {
            self.skip_remaining_flags = state.is_remainder;
            self.flag_state = Some(state);
        }
        Ok(())
    }

    fn feed_positional(&mut self, token: &str) -> Result<Option<&'g Grammar>, ResolveError> {
        if self.pos_state.is_none() {
            let Some(id) = self.remaining_positionals.pop_front() else {
                debug!("No positional left for '{}'", token);
                return Ok(None);
            };
            let def = self.grammar.arg(id);
            if let Some(subcommands) = def.subcommands() {
                return match subcommands.get(token) {
                    Some(child) => Ok(Some(child)),
                    None => Err(ResolveError::UnknownSubcommand(token.to_string())),
                };
            }
            self.pos_state = Some(ArgumentState::new(id, def));
        }

        let Some(id) = self.pos_state.as_ref().map(|state| state.id) else {
            return Ok(None);
        };
        // Members of a completed group were dropped from the pending
        // positionals, so this cannot conflict
        self.update_mutex_groups(id)?;

        let Some(state) = self.pos_state.as_mut() else {
            return Ok(None);
        };
        state.consume(token, &mut self.consumed);

        if state.is_remainder {
            self.skip_remaining_flags = true;
        } else if state.is_full() {
            self.pos_state = None;
            if let Some(next) = self.remaining_positionals.front()
                && self.grammar.arg(*next).is_remainder()
            {
                self.skip_remaining_flags = true;
            }
        }
        Ok(None)
    }

    /// Mark the argument's group as completed, or fail if another member
    /// already completed it
    fn update_mutex_groups(&mut self, id: ArgId) -> Result<(), ResolveError> {
        let def = self.grammar.arg(id);
        let Some(group) = def.group() else {
            return Ok(());
        };

        if let Some(&completer) = self.completed_groups.get(&group) {
            if completer == id {
                return Ok(());
            }
            return Err(ResolveError::MutexConflict {
                name: help::display_name(def),
                other: help::display_name(self.grammar.arg(completer)),
            });
        }

        self.completed_groups.insert(group, id);
        for &member in self.grammar.mutex_group(group).members() {
            if member == id {
                continue;
            }
            let member_def = self.grammar.arg(member);
            if member_def.is_flag() {
                self.matched_flags
                    .extend(member_def.aliases().iter().map(String::as_str));
            } else {
                self.remaining_positionals.retain(|pending| *pending != member);
            }
        }
        Ok(())
    }

    fn check_unfinished_flag(&self) -> Result<(), ResolveError> {
        match &self.flag_state {
            Some(state) if state.is_unfinished() => Err(state.unfinished_error()),
            _ => Ok(()),
        }
    }

    /// The active positional, or the next pending one
    fn take_positional(&mut self) -> Option<ArgumentState<'g>> {
        if let Some(state) = self.pos_state.take() {
            return Some(state);
        }
        let id = self.remaining_positionals.pop_front()?;
        Some(ArgumentState::new(id, self.grammar.arg(id)))
    }
}

/// The host may leave out the empty token under the cursor; put it back so
/// the last token is always the one being completed
fn normalize_tokens<'t>(tokens: &'t [String], text: &str) -> Option<Cow<'t, [String]>> {
    let last = tokens.last()?;
    if text.is_empty() && !last.is_empty() {
        let mut owned = tokens.to_vec();
        owned.push(String::new());
        Some(Cow::Owned(owned))
    } else {
        Some(Cow::Borrowed(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_appends_empty_token() {
        let tokens = strings(&["cmd", "--count"]);
        let normalized = normalize_tokens(&tokens, "").unwrap();
        assert_eq!(normalized.as_ref(), strings(&["cmd", "--count", ""]).as_slice());
    }

    #[test]
    fn test_normalize_keeps_tokens_with_fragment() {
        let tokens = strings(&["cmd", "al"]);
        let normalized = normalize_tokens(&tokens, "al").unwrap();
        assert!(matches!(normalized, Cow::Borrowed(_)));

        let tokens = strings(&["cmd", ""]);
        let normalized = normalize_tokens(&tokens, "").unwrap();
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_tokens(&[], "").is_none());
    }
}
