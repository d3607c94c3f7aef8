//! Declarative command schema
//!
//! Commands can be described in TOML instead of through the builder:
//!
//! ```toml
//! [[commands]]
//! name = "greet"
//! description = "Say hello"
//!
//! [[commands.args]]
//! flags = ["-c", "--count"]
//! nargs = 1
//! choices = [1, 2, 3]
//!
//! [[commands.args]]
//! name = "who"
//! provider = "users"
//! ```
//!
//! Dynamic sources cannot be written in TOML, so they are registered on the
//! [`SchemaLoader`] by name and referenced through `provider`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use super::{Arg, ArgAction, Choice, ChoiceSource, ChoiceValue, Grammar, Nargs};
use crate::error::{ConfigError, Result, SchemaError};

/// Root of a schema document
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub commands: Vec<CommandSchema>,
}

/// One command or subcommand
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSchema {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub epilog: Option<String>,

    #[serde(default)]
    pub add_help: bool,

    #[serde(default = "default_allow_abbrev")]
    pub allow_abbrev: bool,

    #[serde(default = "default_prefix_chars")]
    pub prefix_chars: String,

    #[serde(default)]
    pub subcommand_dest: Option<String>,

    #[serde(default)]
    pub subcommand_help: Option<String>,

    #[serde(default)]
    pub subcommand_metavar: Option<String>,

    #[serde(default)]
    pub args: Vec<ArgSchema>,

    #[serde(default)]
    pub groups: BTreeMap<String, GroupSchema>,

    #[serde(default)]
    pub subcommands: Vec<CommandSchema>,
}

/// Mutually exclusive group settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupSchema {
    #[serde(default)]
    pub required: bool,
}

/// One argument; exactly one of `flags` or `name` must be set
#[derive(Debug, Clone, Deserialize)]
pub struct ArgSchema {
    #[serde(default)]
    pub flags: Option<Vec<String>>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub dest: Option<String>,

    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub nargs: Option<NargsSchema>,

    #[serde(default)]
    pub choices: Option<Vec<ChoiceSchema>>,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub help: Option<String>,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub metavar: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub group: Option<String>,

    #[serde(default)]
    pub descriptive_header: Option<String>,

    #[serde(default)]
    pub suppress_tab_hint: bool,
}

/// `nargs = 2`, `nargs = "+"`, `nargs = [1, 3]` or `nargs = [2]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NargsSchema {
    Count(usize),
    Symbol(String),
    Range(Vec<usize>),
}

/// A bare scalar or a `{ value, description }` table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChoiceSchema {
    Plain(ScalarSchema),
    Described {
        value: ScalarSchema,
        description: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarSchema {
    Int(i64),
    Float(f64),
    Text(String),
}

fn default_allow_abbrev() -> bool {
    true
}

fn default_prefix_chars() -> String {
    "-".to_string()
}

impl NargsSchema {
    pub fn to_nargs(&self) -> std::result::Result<Nargs, SchemaError> {
        match self {
            NargsSchema::Count(n) => Ok(Nargs::Exactly(*n)),
            NargsSchema::Symbol(symbol) => match symbol.as_str() {
                "?" => Ok(Nargs::Optional),
                "*" => Ok(Nargs::ZeroOrMore),
                "+" => Ok(Nargs::OneOrMore),
                "..." => Ok(Nargs::Remainder),
                other => Err(SchemaError::InvalidNargs(format!("unknown symbol '{other}'"))),
            },
            NargsSchema::Range(bounds) => match bounds.as_slice() {
                [min] => Ok(Nargs::Range {
                    min: *min,
                    max: None,
                }),
                [min, max] => Ok(Nargs::Range {
                    min: *min,
                    max: Some(*max),
                }),
                _ => Err(SchemaError::InvalidNargs(format!(
                    "range must have one or two bounds, got {}",
                    bounds.len()
                ))),
            },
        }
    }
}

impl From<&ScalarSchema> for ChoiceValue {
    fn from(scalar: &ScalarSchema) -> Self {
        match scalar {
            ScalarSchema::Int(i) => ChoiceValue::Int(*i),
            ScalarSchema::Float(f) => ChoiceValue::Float(*f),
            ScalarSchema::Text(s) => ChoiceValue::Text(s.clone()),
        }
    }
}

impl From<&ChoiceSchema> for Choice {
    fn from(choice: &ChoiceSchema) -> Self {
        match choice {
            ChoiceSchema::Plain(value) => Choice::new(ChoiceValue::from(value)),
            ChoiceSchema::Described { value, description } => {
                Choice::described(ChoiceValue::from(value), description.clone())
            }
        }
    }
}

/// Builds grammars from schema documents
#[derive(Debug, Default)]
pub struct SchemaLoader {
    providers: HashMap<String, ChoiceSource>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a dynamic choice source available to `provider = "<name>"`
    pub fn register(&mut self, name: impl Into<String>, source: ChoiceSource) -> &mut Self {
        self.providers.insert(name.into(), source);
        self
    }

    /// Load and build every command in a schema file
    pub fn load_file(&self, path: &Path) -> Result<Vec<Grammar>> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse(&content)?)
    }

    /// Parse a schema document and build its commands in declaration order
    pub fn parse(&self, content: &str) -> std::result::Result<Vec<Grammar>, SchemaError> {
        let file: SchemaFile =
            toml::from_str(content).map_err(|e| SchemaError::InvalidFormat(e.to_string()))?;
        file.commands.iter().map(|cmd| self.build(cmd)).collect()
    }

    /// Build one command, recursing into its subcommands
    pub fn build(&self, command: &CommandSchema) -> std::result::Result<Grammar, SchemaError> {
        let mut builder = Grammar::builder(&command.name)
            .add_help(command.add_help)
            .allow_abbrev(command.allow_abbrev)
            .prefix_chars(&command.prefix_chars);
        if let Some(description) = &command.description {
            builder = builder.description(description);
        }
        if let Some(epilog) = &command.epilog {
            builder = builder.epilog(epilog);
        }
        if let Some(dest) = &command.subcommand_dest {
            builder = builder.subcommands_dest(dest);
        }
        if let Some(help) = &command.subcommand_help {
            builder = builder.subcommands_help(help);
        }
        if let Some(metavar) = &command.subcommand_metavar {
            builder = builder.subcommands_metavar(metavar);
        }

        // A group is added where its first member appears
        let mut added_groups: Vec<&str> = Vec::new();
        for arg in &command.args {
            match &arg.group {
                None => builder = builder.arg(self.build_arg(arg)?),
                Some(group) if added_groups.contains(&group.as_str()) => {}
                Some(group) => {
                    added_groups.push(group);
                    let required = command
                        .groups
                        .get(group)
                        .map(|g| g.required)
                        .unwrap_or(false);
                    let members = command
                        .args
                        .iter()
                        .filter(|a| a.group.as_deref() == Some(group.as_str()))
                        .map(|a| self.build_arg(a))
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    builder = builder.exclusive_group(required, members);
                }
            }
        }

        for sub in &command.subcommands {
            builder = builder.subcommand(&sub.name, self.build(sub)?);
        }

        builder.build()
    }

    fn build_arg(&self, schema: &ArgSchema) -> std::result::Result<Arg, SchemaError> {
        let mut arg = match (&schema.flags, &schema.name) {
            (Some(flags), None) if !flags.is_empty() => Arg::flag(flags.iter().cloned()),
            (None, Some(name)) => Arg::positional(name),
            _ => {
                return Err(SchemaError::InvalidFormat(
                    "each argument needs either 'flags' or 'name'".to_string(),
                ));
            }
        };

        if let Some(action) = &schema.action {
            let action = ArgAction::from_name(action).ok_or_else(|| SchemaError::InvalidAction {
                arg: schema
                    .name
                    .clone()
                    .or_else(|| schema.flags.as_ref().and_then(|f| f.first().cloned()))
                    .unwrap_or_default(),
                action: action.clone(),
            })?;
            arg = arg.action(action);
        }
        if let Some(nargs) = &schema.nargs {
            arg = arg.nargs(nargs.to_nargs()?);
        }

        match (&schema.choices, &schema.provider) {
            (Some(_), Some(provider)) => {
                return Err(SchemaError::InvalidFormat(format!(
                    "argument declares both 'choices' and 'provider' ({provider})"
                )));
            }
            (Some(choices), None) => {
                arg = arg.choices(choices.iter().map(Choice::from));
            }
            (None, Some(provider)) => {
                let source = self
                    .providers
                    .get(provider)
                    .cloned()
                    .ok_or_else(|| SchemaError::UnknownProvider(provider.clone()))?;
                arg = arg.choice_source(source);
            }
            (None, None) => {}
        }

        if let Some(dest) = &schema.dest {
            arg = arg.dest(dest);
        }
        if let Some(help) = &schema.help {
            arg = arg.help(help);
        }
        if let Some(metavar) = &schema.metavar {
            arg = arg.metavar(metavar);
        }
        if let Some(header) = &schema.descriptive_header {
            arg = arg.descriptive_header(header);
        }

        Ok(arg
            .hidden(schema.hidden)
            .required(schema.required)
            .suppress_tab_hint(schema.suppress_tab_hint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Arity;
    use std::io::Write;

    const SCHEMA: &str = r#"
[[commands]]
name = "greet"
description = "Say hello"

[[commands.args]]
flags = ["-c", "--count"]
nargs = 1
choices = [1, 2, 3]

[[commands.args]]
flags = ["--json"]
action = "store_true"
group = "format"

[[commands.args]]
flags = ["--table"]
action = "store_true"
group = "format"

[[commands.args]]
name = "who"
nargs = "+"
choices = [
    { value = "alice", description = "Admin" },
    { value = "bob", description = "Guest" },
]

[commands.groups.format]
required = true

[[commands]]
name = "repo"

[[commands.subcommands]]
name = "clone"

[[commands.subcommands.args]]
name = "url"
provider = "urls"
"#;

    fn loader() -> SchemaLoader {
        let mut loader = SchemaLoader::new();
        loader.register(
            "urls",
            ChoiceSource::provider(|_: Option<&crate::grammar::ArgTokens>| {
                Ok(vec![Choice::from("https://example.com/a.git")])
            }),
        );
        loader
    }

    #[test]
    fn test_parse_commands() {
        let grammars = loader().parse(SCHEMA).unwrap();
        assert_eq!(grammars.len(), 2);

        let greet = &grammars[0];
        assert_eq!(greet.prog(), "greet");
        assert_eq!(greet.description(), Some("Say hello"));
        let count = greet.arg(greet.flag("--count").unwrap());
        assert_eq!(count.arity(), Arity::exactly(1));
        assert_eq!(count.choices().unwrap().static_choices().unwrap().len(), 3);

        let json = greet.arg(greet.flag("--json").unwrap());
        let group = json.group().unwrap();
        assert!(greet.mutex_group(group).is_required());
        assert_eq!(greet.mutex_group(group).members().len(), 2);

        let who = greet.arg(greet.positionals()[0]);
        assert_eq!(who.arity(), Arity::new(1, None));
        let choices = who.choices().unwrap().static_choices().unwrap();
        assert_eq!(choices[0].description.as_deref(), Some("Admin"));
    }

    #[test]
    fn test_subcommands_and_providers() {
        let grammars = loader().parse(SCHEMA).unwrap();
        let repo = &grammars[1];
        let clone = repo.subcommand("clone").unwrap();
        let url = clone.arg(clone.positionals()[0]);
        assert!(matches!(url.choices(), Some(ChoiceSource::Choices { .. })));
    }

    #[test]
    fn test_unknown_provider() {
        let err = SchemaLoader::new().parse(SCHEMA).unwrap_err();
        assert_eq!(err, SchemaError::UnknownProvider("urls".to_string()));
    }

    #[test]
    fn test_nargs_forms() {
        assert_eq!(NargsSchema::Count(0).to_nargs().unwrap(), Nargs::Exactly(0));
        assert_eq!(
            NargsSchema::Symbol("...".into()).to_nargs().unwrap(),
            Nargs::Remainder
        );
        assert_eq!(
            NargsSchema::Range(vec![2]).to_nargs().unwrap(),
            Nargs::Range { min: 2, max: None }
        );
        assert!(NargsSchema::Symbol("++".into()).to_nargs().is_err());
        assert!(NargsSchema::Range(vec![1, 2, 3]).to_nargs().is_err());
    }

    #[test]
    fn test_invalid_documents() {
        let err = SchemaLoader::new()
            .parse("[[commands]]\nname = \"x\"\n[[commands.args]]\nhelp = \"nothing\"\n")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFormat(_)));

        let err = SchemaLoader::new().parse("commands = 3").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFormat(_)));

        let err = SchemaLoader::new()
            .parse("[[commands]]\nname = \"x\"\n[[commands.args]]\nflags = [\"--a\"]\naction = \"explode\"\n")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAction { .. }));
    }

    #[test]
    fn test_choices_and_provider_conflict() {
        let doc = r#"
[[commands]]
name = "fetch"

[[commands.args]]
name = "url"
choices = ["a", "b"]
provider = "urls"
"#;
        let err = loader().parse(doc).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidFormat(msg) if msg.contains("provider")));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();
        let grammars = loader().load_file(file.path()).unwrap();
        assert_eq!(grammars.len(), 2);

        let missing = loader().load_file(Path::new("/nonexistent/schema.toml"));
        assert!(missing.is_err());
    }
}
