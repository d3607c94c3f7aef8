//! Grammar model
//!
//! A `Grammar` is the immutable description of one command's arguments:
//! flags with their aliases, positionals in declaration order, at most one
//! dispatch positional selecting a nested grammar, and mutually exclusive
//! groups. It is built once, either through [`GrammarBuilder`] or from a
//! declarative schema (see [`schema`]), and never mutated afterwards.
//!
//! # Examples
//!
//! ```
//! use argshell::grammar::{Arg, ArgAction, Grammar, Nargs};
//!
//! let grammar = Grammar::builder("greet")
//!     .arg(Arg::flag(["--verbose"]).action(ArgAction::StoreTrue))
//!     .arg(Arg::flag(["--count"]).nargs(Nargs::Single).choices([1, 2, 3]))
//!     .arg(Arg::positional("name").choices(["alice", "bob"]))
//!     .build()
//!     .unwrap();
//!
//! assert!(grammar.flag("--count").is_some());
//! assert_eq!(grammar.positionals().len(), 1);
//! ```

mod choices;
pub mod help;
mod nargs;
pub mod schema;

pub use choices::{
    ArgTokens, Choice, ChoiceSource, ChoiceValue, ChoicesProvider, CompleterProvider,
    CompletionRequest,
};
pub use nargs::{Arity, Nargs};
pub use schema::SchemaLoader;

use indexmap::IndexMap;

use crate::error::SchemaError;

/// Index of an argument inside its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgId(usize);

/// Index of a mutually exclusive group inside its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

/// What an argument does with the tokens it receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgAction {
    Store,
    StoreConst,
    StoreTrue,
    StoreFalse,
    Append,
    AppendConst,
    Count,
    Help,
}

/// Tagged argument variants
#[derive(Debug, Clone)]
pub enum ArgKind {
    /// Option-style argument with one or more alias spellings
    Flag { aliases: Vec<String> },
    /// Plain positional argument
    Positional,
    /// Positional whose value selects a nested grammar
    Dispatch {
        subcommands: IndexMap<String, Grammar>,
        dest_suppressed: bool,
    },
}

/// One argument definition
#[derive(Debug, Clone)]
pub struct ArgDef {
    kind: ArgKind,
    dest: String,
    action: ArgAction,
    nargs: Nargs,
    choices: Option<ChoiceSource>,
    help: Option<String>,
    hidden: bool,
    metavar: Option<String>,
    required: bool,
    suppress_tab_hint: bool,
    descriptive_header: Option<String>,
    group: Option<GroupId>,
}

/// Set of arguments of which at most one may supply a value
#[derive(Debug, Clone)]
pub struct MutexGroup {
    members: Vec<ArgId>,
    required: bool,
}

/// Immutable description of one command or subcommand
#[derive(Debug, Clone)]
pub struct Grammar {
    prog: String,
    description: Option<String>,
    epilog: Option<String>,
    prefix_chars: String,
    allow_abbrev: bool,
    args: Vec<ArgDef>,
    flags: IndexMap<String, ArgId>,
    positionals: Vec<ArgId>,
    dispatch: Option<ArgId>,
    groups: Vec<MutexGroup>,
    has_negative_number_flags: bool,
}

impl ArgAction {
    /// Reusable flags keep accumulating values when repeated
    pub fn is_reusable(&self) -> bool {
        matches!(
            self,
            ArgAction::Append | ArgAction::AppendConst | ArgAction::Count
        )
    }

    fn default_nargs(&self) -> Nargs {
        match self {
            ArgAction::Store | ArgAction::Append => Nargs::Single,
            _ => Nargs::Exactly(0),
        }
    }

    fn allowed_on_positional(&self) -> bool {
        matches!(self, ArgAction::Store | ArgAction::Append)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArgAction::Store => "store",
            ArgAction::StoreConst => "store_const",
            ArgAction::StoreTrue => "store_true",
            ArgAction::StoreFalse => "store_false",
            ArgAction::Append => "append",
            ArgAction::AppendConst => "append_const",
            ArgAction::Count => "count",
            ArgAction::Help => "help",
        }
    }

    /// Parse the schema spelling of an action
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "store" => ArgAction::Store,
            "store_const" => ArgAction::StoreConst,
            "store_true" => ArgAction::StoreTrue,
            "store_false" => ArgAction::StoreFalse,
            "append" => ArgAction::Append,
            "append_const" => ArgAction::AppendConst,
            "count" => ArgAction::Count,
            "help" => ArgAction::Help,
            _ => return None,
        };
        Some(action)
    }
}

impl ArgDef {
    pub fn kind(&self) -> &ArgKind {
        &self.kind
    }

    /// Flag spellings; empty for positionals
    pub fn aliases(&self) -> &[String] {
        match &self.kind {
            ArgKind::Flag { aliases } => aliases,
            _ => &[],
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, ArgKind::Flag { .. })
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self.kind, ArgKind::Dispatch { .. })
    }

    /// Subcommand grammars, for the dispatch positional
    pub fn subcommands(&self) -> Option<&IndexMap<String, Grammar>> {
        match &self.kind {
            ArgKind::Dispatch { subcommands, .. } => Some(subcommands),
            _ => None,
        }
    }

    /// Whether tokens for this argument are recorded under its destination
    pub fn records_dest(&self) -> bool {
        !matches!(
            self.kind,
            ArgKind::Dispatch {
                dest_suppressed: true,
                ..
            }
        )
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn action(&self) -> ArgAction {
        self.action
    }

    pub fn nargs(&self) -> Nargs {
        self.nargs
    }

    pub fn arity(&self) -> Arity {
        self.nargs.arity()
    }

    pub fn is_remainder(&self) -> bool {
        self.nargs.is_remainder()
    }

    pub fn is_reusable(&self) -> bool {
        self.action.is_reusable()
    }

    pub fn choices(&self) -> Option<&ChoiceSource> {
        self.choices.as_ref()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Hidden arguments are left out of help output and flag completion
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn metavar(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn suppress_tab_hint(&self) -> bool {
        self.suppress_tab_hint
    }

    pub fn descriptive_header(&self) -> Option<&str> {
        self.descriptive_header.as_deref()
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }
}

impl MutexGroup {
    pub fn members(&self) -> &[ArgId] {
        &self.members
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl Grammar {
    /// Start building a grammar for the given program name
    pub fn builder(prog: impl Into<String>) -> GrammarBuilder {
        GrammarBuilder::new(prog)
    }

    pub fn prog(&self) -> &str {
        &self.prog
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    pub fn prefix_chars(&self) -> &str {
        &self.prefix_chars
    }

    pub fn is_prefix_char(&self, c: char) -> bool {
        self.prefix_chars.contains(c)
    }

    /// Whether unambiguous flag prefixes resolve to their flag
    pub fn allow_abbrev(&self) -> bool {
        self.allow_abbrev
    }

    /// Whether any flag alias itself looks like a negative number
    pub fn has_negative_number_flags(&self) -> bool {
        self.has_negative_number_flags
    }

    pub fn arg(&self, id: ArgId) -> &ArgDef {
        &self.args[id.0]
    }

    /// All arguments in declaration order
    pub fn args(&self) -> impl Iterator<Item = (ArgId, &ArgDef)> {
        self.args.iter().enumerate().map(|(i, def)| (ArgId(i), def))
    }

    /// Flag aliases in declaration order
    pub fn flags(&self) -> impl Iterator<Item = (&str, ArgId)> {
        self.flags.iter().map(|(alias, id)| (alias.as_str(), *id))
    }

    /// Exact alias lookup
    pub fn flag(&self, alias: &str) -> Option<ArgId> {
        self.flags.get(alias).copied()
    }

    /// Resolve a flag token by exact alias, or by unique prefix when
    /// abbreviation is enabled. Ambiguous prefixes resolve to nothing.
    pub fn match_flag(&self, token: &str) -> Option<ArgId> {
        if let Some(id) = self.flag(token) {
            return Some(id);
        }
        if !self.allow_abbrev {
            return None;
        }

        let mut candidates = self
            .flags
            .iter()
            .filter(|(alias, _)| alias.starts_with(token));
        match (candidates.next(), candidates.next()) {
            (Some((_, id)), None) => Some(*id),
            _ => None,
        }
    }

    /// Positional arguments in declaration order, dispatch included
    pub fn positionals(&self) -> &[ArgId] {
        &self.positionals
    }

    pub fn dispatch(&self) -> Option<ArgId> {
        self.dispatch
    }

    /// Nested grammar for a subcommand name
    pub fn subcommand(&self, name: &str) -> Option<&Grammar> {
        let id = self.dispatch?;
        self.arg(id).subcommands()?.get(name)
    }

    /// Subcommand names in declaration order
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.dispatch
            .and_then(|id| self.arg(id).subcommands())
            .map(|subs| subs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn mutex_groups(&self) -> &[MutexGroup] {
        &self.groups
    }

    pub fn mutex_group(&self, id: GroupId) -> &MutexGroup {
        &self.groups[id.0]
    }

    fn push(&mut self, def: ArgDef) -> Result<ArgId, SchemaError> {
        let id = ArgId(self.args.len());

        if !def.nargs.is_valid() {
            return Err(SchemaError::InvalidNargs(format!(
                "{} for '{}'",
                def.arity(),
                def.dest
            )));
        }

        match &def.kind {
            ArgKind::Flag { aliases } => {
                for alias in aliases {
                    if !alias.starts_with(|c| self.is_prefix_char(c)) {
                        return Err(SchemaError::InvalidFlag(alias.clone()));
                    }
                    if self.flags.contains_key(alias) {
                        return Err(SchemaError::DuplicateFlag(alias.clone()));
                    }
                }

                let shares_dest = self
                    .args
                    .iter()
                    .filter(|other| other.is_flag() && other.dest == def.dest)
                    .any(|other| !(other.is_reusable() && def.is_reusable()));
                if shares_dest {
                    return Err(SchemaError::DestConflict(def.dest.clone()));
                }

                for alias in aliases {
                    if is_negative_number(alias) {
                        self.has_negative_number_flags = true;
                    }
                    self.flags.insert(alias.clone(), id);
                }
            }
            ArgKind::Positional => {
                if def.dest.starts_with(|c| self.is_prefix_char(c)) {
                    return Err(SchemaError::InvalidPositional(def.dest.clone()));
                }
                if !def.action.allowed_on_positional() {
                    return Err(SchemaError::InvalidAction {
                        arg: def.dest.clone(),
                        action: def.action.name().to_string(),
                    });
                }
                self.positionals.push(id);
            }
            ArgKind::Dispatch { .. } => {
                self.positionals.push(id);
                self.dispatch = Some(id);
            }
        }

        self.args.push(def);
        Ok(id)
    }
}

/// Whether a token reads as a negative number (`-1`, `-2.5`, `-.5`)
pub fn is_negative_number(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return false;
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match frac_part {
        None => !int_part.is_empty() && all_digits(int_part),
        Some(frac) => !frac.is_empty() && all_digits(frac) && all_digits(int_part),
    }
}

/// Argument under construction
#[derive(Debug, Clone)]
pub struct Arg {
    aliases: Vec<String>,
    name: Option<String>,
    dest: Option<String>,
    action: ArgAction,
    nargs: Option<Nargs>,
    choices: Option<ChoiceSource>,
    help: Option<String>,
    hidden: bool,
    metavar: Option<String>,
    required: bool,
    suppress_tab_hint: bool,
    descriptive_header: Option<String>,
}

impl Arg {
    /// A flag with one or more alias spellings
    pub fn flag<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::blank(aliases.into_iter().map(Into::into).collect(), None)
    }

    /// A positional argument; its name doubles as its destination
    pub fn positional(name: impl Into<String>) -> Self {
        Self::blank(Vec::new(), Some(name.into()))
    }

    fn blank(aliases: Vec<String>, name: Option<String>) -> Self {
        Self {
            aliases,
            name,
            dest: None,
            action: ArgAction::Store,
            nargs: None,
            choices: None,
            help: None,
            hidden: false,
            metavar: None,
            required: false,
            suppress_tab_hint: false,
            descriptive_header: None,
        }
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn action(mut self, action: ArgAction) -> Self {
        self.action = action;
        self
    }

    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    /// Static choices
    pub fn choices<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Choice>,
    {
        self.choices = Some(ChoiceSource::fixed(values));
        self
    }

    /// Choices computed at completion time
    pub fn choices_provider(mut self, provider: impl ChoicesProvider + 'static) -> Self {
        self.choices = Some(ChoiceSource::provider(provider));
        self
    }

    /// A completer that matches the fragment itself
    pub fn completer(mut self, completer: impl CompleterProvider + 'static) -> Self {
        self.choices = Some(ChoiceSource::completer(completer));
        self
    }

    /// Any choice source, static or dynamic
    pub fn choice_source(mut self, source: ChoiceSource) -> Self {
        self.choices = Some(source);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn suppress_tab_hint(mut self, suppress: bool) -> Self {
        self.suppress_tab_hint = suppress;
        self
    }

    pub fn descriptive_header(mut self, header: impl Into<String>) -> Self {
        self.descriptive_header = Some(header.into());
        self
    }

    fn into_def(self, prefix_chars: &str) -> ArgDef {
        let nargs = self.nargs.unwrap_or_else(|| self.action.default_nargs());
        let (kind, default_dest) = match self.name {
            Some(name) => (ArgKind::Positional, name),
            None => {
                let dest = default_flag_dest(&self.aliases, prefix_chars);
                (
                    ArgKind::Flag {
                        aliases: self.aliases,
                    },
                    dest,
                )
            }
        };

        ArgDef {
            kind,
            dest: self.dest.unwrap_or(default_dest),
            action: self.action,
            nargs,
            choices: self.choices,
            help: self.help,
            hidden: self.hidden,
            metavar: self.metavar,
            required: self.required,
            suppress_tab_hint: self.suppress_tab_hint,
            descriptive_header: self.descriptive_header,
            group: None,
        }
    }
}

/// `--dry-run` becomes `dry_run`; long spellings win over short ones
fn default_flag_dest(aliases: &[String], prefix_chars: &str) -> String {
    let is_long = |alias: &&String| {
        let mut chars = alias.chars();
        matches!(
            (chars.next(), chars.next()),
            (Some(a), Some(b)) if prefix_chars.contains(a) && prefix_chars.contains(b)
        )
    };
    let chosen = aliases
        .iter()
        .find(is_long)
        .or_else(|| aliases.first())
        .map(String::as_str)
        .unwrap_or_default();
    chosen
        .trim_start_matches(|c| prefix_chars.contains(c))
        .replace('-', "_")
}

#[derive(Debug)]
enum PendingItem {
    Arg { arg: Arg, group: Option<usize> },
    Dispatch,
}

/// Builder for [`Grammar`]
#[derive(Debug)]
pub struct GrammarBuilder {
    prog: String,
    description: Option<String>,
    epilog: Option<String>,
    prefix_chars: String,
    allow_abbrev: bool,
    add_help: bool,
    items: Vec<PendingItem>,
    groups: Vec<bool>,
    subcommands: IndexMap<String, Grammar>,
    subcommands_dest: Option<String>,
    subcommands_help: Option<String>,
    subcommands_metavar: Option<String>,
    error: Option<SchemaError>,
}

impl GrammarBuilder {
    fn new(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            description: None,
            epilog: None,
            prefix_chars: "-".to_string(),
            allow_abbrev: true,
            add_help: false,
            items: Vec::new(),
            groups: Vec::new(),
            subcommands: IndexMap::new(),
            subcommands_dest: None,
            subcommands_help: None,
            subcommands_metavar: None,
            error: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.epilog = Some(epilog.into());
        self
    }

    pub fn prefix_chars(mut self, prefix_chars: impl Into<String>) -> Self {
        self.prefix_chars = prefix_chars.into();
        self
    }

    pub fn allow_abbrev(mut self, allow: bool) -> Self {
        self.allow_abbrev = allow;
        self
    }

    /// Add a `-h/--help` flag ahead of every other argument
    pub fn add_help(mut self, add: bool) -> Self {
        self.add_help = add;
        self
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.items.push(PendingItem::Arg { arg, group: None });
        self
    }

    /// Add a mutually exclusive group of arguments
    pub fn exclusive_group<I>(mut self, required: bool, args: I) -> Self
    where
        I: IntoIterator<Item = Arg>,
    {
        let group = self.groups.len();
        self.groups.push(required);
        for arg in args {
            self.items.push(PendingItem::Arg {
                arg,
                group: Some(group),
            });
        }
        self
    }

    /// Record the selected subcommand name under this destination
    pub fn subcommands_dest(mut self, dest: impl Into<String>) -> Self {
        self.subcommands_dest = Some(dest.into());
        self
    }

    pub fn subcommands_help(mut self, help: impl Into<String>) -> Self {
        self.subcommands_help = Some(help.into());
        self
    }

    pub fn subcommands_metavar(mut self, metavar: impl Into<String>) -> Self {
        self.subcommands_metavar = Some(metavar.into());
        self
    }

    /// Register a subcommand. The dispatch positional takes the position
    /// of the first registered subcommand.
    pub fn subcommand(mut self, name: impl Into<String>, grammar: Grammar) -> Self {
        let name = name.into();
        if self.subcommands.is_empty() {
            self.items.push(PendingItem::Dispatch);
        }
        if self.subcommands.contains_key(&name) {
            self.error.get_or_insert(SchemaError::DuplicateSubcommand(name));
            return self;
        }
        self.subcommands.insert(name, grammar);
        self
    }

    pub fn build(mut self) -> Result<Grammar, SchemaError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let mut grammar = Grammar {
            prog: self.prog,
            description: self.description,
            epilog: self.epilog,
            prefix_chars: self.prefix_chars,
            allow_abbrev: self.allow_abbrev,
            args: Vec::new(),
            flags: IndexMap::new(),
            positionals: Vec::new(),
            dispatch: None,
            groups: self
                .groups
                .iter()
                .map(|&required| MutexGroup {
                    members: Vec::new(),
                    required,
                })
                .collect(),
            has_negative_number_flags: false,
        };

        if self.add_help {
            let help = Arg::flag(["-h", "--help"])
                .action(ArgAction::Help)
                .help("show this help message and exit");
            self.items
                .insert(0, PendingItem::Arg { arg: help, group: None });
        }

        let mut subcommands = Some(std::mem::take(&mut self.subcommands));
        for item in self.items {
            match item {
                PendingItem::Arg { arg, group } => {
                    let def = arg.into_def(&grammar.prefix_chars);
                    let id = grammar.push(def)?;
                    if let Some(group) = group {
                        grammar.args[id.0].group = Some(GroupId(group));
                        grammar.groups[group].members.push(id);
                    }
                }
                PendingItem::Dispatch => {
                    let def = ArgDef {
                        kind: ArgKind::Dispatch {
                            subcommands: subcommands.take().unwrap_or_default(),
                            dest_suppressed: self.subcommands_dest.is_none(),
                        },
                        dest: self.subcommands_dest.clone().unwrap_or_default(),
                        action: ArgAction::Store,
                        nargs: Nargs::Single,
                        choices: None,
                        help: self.subcommands_help.clone(),
                        hidden: false,
                        metavar: self.subcommands_metavar.clone(),
                        required: false,
                        suppress_tab_hint: false,
                        descriptive_header: None,
                        group: None,
                    };
                    grammar.push(def)?;
                }
            }
        }

        Ok(grammar)
    }
}
