//! Usage and help rendering
//!
//! Output follows the familiar argparse layout: a `usage:` line, the
//! description, one section per argument kind with invocations padded to a
//! shared help column, then the epilog.

use unicode_width::UnicodeWidthStr;

use super::{ArgDef, ArgKind, Grammar};

/// Upper bound of the column where help text starts
const MAX_HELP_POSITION: usize = 24;

/// Indentation of entries inside a section
const INDENT: usize = 2;

/// Name used for an argument in messages: aliases joined by `/`, else the
/// metavar, else the destination.
pub fn display_name(def: &ArgDef) -> String {
    if def.is_flag() {
        return def.aliases().join("/");
    }
    if let Some(metavar) = def.metavar() {
        return metavar.to_string();
    }
    match def.kind() {
        ArgKind::Dispatch {
            subcommands,
            dest_suppressed: true,
        } => braced(subcommands.keys()),
        _ => def.dest().to_string(),
    }
}

/// Help for a single argument, shown when completion finds nothing
pub fn format_arg_hint(def: &ArgDef) -> String {
    let mut out = String::from("Hint:\n");
    let entries = vec![entry(def)];
    render_entries(&mut out, &entries, help_position(&entries));
    out
}

impl Grammar {
    /// One-line usage summary
    pub fn format_usage(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut rendered_groups = Vec::new();

        for (_, def) in self.args().filter(|(_, def)| def.is_flag() && !def.is_hidden()) {
            match def.group() {
                Some(group) if !rendered_groups.contains(&group) => {
                    rendered_groups.push(group);
                    let mutex = self.mutex_group(group);
                    let members: Vec<String> = mutex
                        .members()
                        .iter()
                        .map(|id| self.arg(*id))
                        .filter(|member| member.is_flag() && !member.is_hidden())
                        .map(usage_part)
                        .collect();
                    let joined = members.join(" | ");
                    if mutex.is_required() {
                        parts.push(format!("({joined})"));
                    } else {
                        parts.push(format!("[{joined}]"));
                    }
                }
                Some(_) => {}
                None if def.is_required() => parts.push(usage_part(def)),
                None => parts.push(format!("[{}]", usage_part(def))),
            }
        }

        for id in self.positionals() {
            let def = self.arg(*id);
            if !def.is_hidden() {
                parts.push(format_values(def));
            }
        }

        if parts.is_empty() {
            format!("usage: {}", self.prog())
        } else {
            format!("usage: {} {}", self.prog(), parts.join(" "))
        }
    }

    /// Full help text
    pub fn format_help(&self) -> String {
        let mut out = self.format_usage();
        out.push_str("\n\n");

        if let Some(description) = self.description() {
            out.push_str(description);
            out.push_str("\n\n");
        }

        let positionals: Vec<Entry> = self
            .positionals()
            .iter()
            .map(|id| self.arg(*id))
            .filter(|def| !def.is_hidden())
            .flat_map(positional_entries)
            .collect();
        let optionals: Vec<Entry> = self
            .args()
            .map(|(_, def)| def)
            .filter(|def| def.is_flag() && !def.is_hidden())
            .map(entry)
            .collect();

        let column = help_position(positionals.iter().chain(&optionals));
        if !positionals.is_empty() {
            out.push_str("positional arguments:\n");
            render_entries(&mut out, &positionals, column);
            out.push('\n');
        }
        if !optionals.is_empty() {
            out.push_str("optional arguments:\n");
            render_entries(&mut out, &optionals, column);
            out.push('\n');
        }

        if let Some(epilog) = self.epilog() {
            out.push_str(epilog);
            out.push('\n');
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        out
    }
}

struct Entry {
    indent: usize,
    invocation: String,
    help: Option<String>,
}

fn entry(def: &ArgDef) -> Entry {
    Entry {
        indent: INDENT,
        invocation: invocation(def),
        help: def.help().map(str::to_string),
    }
}

/// The dispatch positional lists each subcommand beneath itself
fn positional_entries(def: &ArgDef) -> Vec<Entry> {
    let mut entries = vec![entry(def)];
    if let Some(subcommands) = def.subcommands() {
        for (name, grammar) in subcommands {
            entries.push(Entry {
                indent: INDENT * 2,
                invocation: name.clone(),
                help: grammar.description().map(str::to_string),
            });
        }
    }
    entries
}

/// Column shared by every section of one help page
fn help_position<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> usize {
    let longest = entries
        .into_iter()
        .map(|e| e.indent + e.invocation.width())
        .max()
        .unwrap_or(0);
    (longest + 2).min(MAX_HELP_POSITION)
}

fn render_entries(out: &mut String, entries: &[Entry], help_position: usize) {
    for e in entries {
        let header = format!("{}{}", " ".repeat(e.indent), e.invocation);
        let width = header.width();
        match &e.help {
            None => {
                out.push_str(&header);
                out.push('\n');
            }
            Some(help) if width + 2 <= help_position => {
                out.push_str(&header);
                out.push_str(&" ".repeat(help_position - width));
                out.push_str(help);
                out.push('\n');
            }
            Some(help) => {
                out.push_str(&header);
                out.push('\n');
                out.push_str(&" ".repeat(help_position));
                out.push_str(help);
                out.push('\n');
            }
        }
    }
}

/// Invocation column of the help listing: `-c N, --count N`
fn invocation(def: &ArgDef) -> String {
    if !def.is_flag() {
        return metavar(def);
    }
    if def.arity().takes_no_values() {
        return def.aliases().join(", ");
    }
    let values = format_values(def);
    def.aliases()
        .iter()
        .map(|alias| format!("{alias} {values}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn usage_part(def: &ArgDef) -> String {
    let alias = def.aliases().first().map(String::as_str).unwrap_or_default();
    if def.arity().takes_no_values() {
        alias.to_string()
    } else {
        format!("{alias} {}", format_values(def))
    }
}

fn format_values(def: &ArgDef) -> String {
    if def.is_dispatch() {
        return format!("{} ...", metavar(def));
    }
    def.nargs().format(&metavar(def))
}

fn metavar(def: &ArgDef) -> String {
    if let Some(metavar) = def.metavar() {
        return metavar.to_string();
    }
    if let Some(subcommands) = def.subcommands() {
        return braced(subcommands.keys());
    }
    if let Some(choices) = def.choices().and_then(|c| c.static_choices()) {
        return braced(choices.iter().map(|c| c.value.to_string()));
    }
    if def.is_flag() {
        def.dest().to_uppercase()
    } else {
        def.dest().to_string()
    }
}

fn braced<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    format!("{{{}}}", names.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Arg, ArgAction, Nargs};

    fn sample() -> Grammar {
        Grammar::builder("cmd")
            .description("Greets people")
            .add_help(true)
            .arg(
                Arg::flag(["-v", "--verbose"])
                    .action(ArgAction::StoreTrue)
                    .help("talk more"),
            )
            .arg(Arg::flag(["--count"]).choices([1, 2, 3]).help("how many"))
            .arg(Arg::positional("name").help("who to greet"))
            .arg(Arg::flag(["--secret"]).hidden(true))
            .build()
            .unwrap()
    }

    #[test]
    fn test_usage() {
        assert_eq!(
            sample().format_usage(),
            "usage: cmd [-h] [-v] [--count {1,2,3}] name"
        );
    }

    #[test]
    fn test_usage_with_groups_and_nargs() {
        let grammar = Grammar::builder("ls")
            .exclusive_group(
                true,
                [
                    Arg::flag(["--json"]).action(ArgAction::StoreTrue),
                    Arg::flag(["--table"]).action(ArgAction::StoreTrue),
                ],
            )
            .arg(Arg::flag(["--pair"]).nargs(Nargs::Exactly(2)).metavar("P"))
            .arg(Arg::positional("paths").nargs(Nargs::ZeroOrMore))
            .build()
            .unwrap();
        assert_eq!(
            grammar.format_usage(),
            "usage: ls (--json | --table) [--pair P P] [paths [paths ...]]"
        );
    }

    #[test]
    fn test_usage_with_subcommands() {
        let child = Grammar::builder("add").description("add a thing").build().unwrap();
        let grammar = Grammar::builder("tool")
            .subcommand("add", child.clone())
            .subcommand("rm", child)
            .build()
            .unwrap();
        assert_eq!(grammar.format_usage(), "usage: tool {add,rm} ...");
        let help = grammar.format_help();
        assert!(help.contains("positional arguments:\n  {add,rm}\n    add"));
    }

    #[test]
    fn test_help_layout() {
        let help = sample().format_help();
        let expected = "\
usage: cmd [-h] [-v] [--count {1,2,3}] name

Greets people

positional arguments:
  name             who to greet

optional arguments:
  -h, --help       show this help message and exit
  -v, --verbose    talk more
  --count {1,2,3}  how many
";
        assert_eq!(help, expected);
        assert!(!help.contains("--secret"));
    }

    #[test]
    fn test_help_column_uses_display_width() {
        let grammar = Grammar::builder("trip")
            .arg(Arg::flag(["--verbose"]).action(ArgAction::StoreTrue).help("talk more"))
            .arg(Arg::positional("city").metavar("都市").help("where to go"))
            .build()
            .unwrap();
        let help = grammar.format_help();
        // "都市" is two wide characters, four columns
        assert!(help.contains("\n  都市       where to go\n"));
        assert!(help.contains("\n  --verbose  talk more\n"));
    }

    #[test]
    fn test_arg_hint() {
        let grammar = sample();
        let count = grammar.arg(grammar.flag("--count").unwrap());
        assert_eq!(
            format_arg_hint(count),
            "Hint:\n  --count {1,2,3}  how many\n"
        );
    }

    #[test]
    fn test_display_names() {
        let grammar = sample();
        let verbose = grammar.arg(grammar.flag("--verbose").unwrap());
        assert_eq!(display_name(verbose), "-v/--verbose");
        let name = grammar.arg(grammar.positionals()[0]);
        assert_eq!(display_name(name), "name");
    }
}
