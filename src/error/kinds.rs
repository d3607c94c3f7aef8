use std::{fmt, io};

use crate::grammar::Arity;

/// Crate-wide `Result` type using [`ShellError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Top-level error type for argshell operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum ShellError {
    /// Configuration errors.
    Config(ConfigError),

    /// Grammar or schema construction errors.
    Schema(SchemaError),

    /// I/O errors.
    Io(io::Error),

    /// Line editor errors.
    Readline(String),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Errors raised while building a grammar from a declared schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A flag alias does not start with one of the grammar's prefix characters.
    InvalidFlag(String),

    /// The same flag alias was declared twice.
    DuplicateFlag(String),

    /// A positional argument name looks like a flag.
    InvalidPositional(String),

    /// Two non-reusable flags write to the same destination.
    DestConflict(String),

    /// The same subcommand name was declared twice.
    DuplicateSubcommand(String),

    /// An arity range with a minimum above its maximum, or an unknown nargs spelling.
    InvalidNargs(String),

    /// An action that only makes sense for flags was given to a positional.
    InvalidAction { arg: String, action: String },

    /// A schema referenced a dynamic choice source that was never registered.
    UnknownProvider(String),

    /// The schema document could not be parsed.
    InvalidFormat(String),
}

/// Failure reported by a dynamic choice source.
///
/// Providers return this when they cannot compute their choices at all
/// (an unreachable resource, a missing file), as opposed to simply having
/// no matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionError {
    message: String,
}

/// Conditions that end a completion request early.
///
/// These never cross the public completion boundary: the engine reports
/// them through the host's message channel and returns no completions.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// A flag has not reached its minimum arity at a boundary token.
    UnfinishedArgument {
        name: String,
        arity: Arity,
        entered: usize,
    },

    /// A second member of a completed mutually exclusive group received a value.
    MutexConflict { name: String, other: String },

    /// The dispatch positional received a token that names no subcommand.
    UnknownSubcommand(String),

    /// A dynamic choice source failed while completing an argument.
    ChoiceSource {
        name: String,
        error: CompletionError,
    },
}

impl CompletionError {
    /// Create a completion error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The provider's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ResolveError {
    /// Whether this condition should be shown to the user.
    ///
    /// An unknown subcommand is most likely input still being typed, so it
    /// stays silent.
    pub fn is_reported(&self) -> bool {
        !matches!(self, ResolveError::UnknownSubcommand(_))
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Config(e) => write!(f, "Configuration error: {e}"),
            ShellError::Schema(e) => write!(f, "Schema error: {e}"),
            ShellError::Io(e) => write!(f, "I/O error: {e}"),
            ShellError::Readline(msg) => write!(f, "Readline error: {msg}"),
            ShellError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidFlag(alias) => {
                write!(f, "Flag '{alias}' must start with a prefix character")
            }
            SchemaError::DuplicateFlag(alias) => write!(f, "Flag '{alias}' declared twice"),
            SchemaError::InvalidPositional(name) => {
                write!(f, "Positional argument '{name}' looks like a flag")
            }
            SchemaError::DestConflict(dest) => {
                write!(f, "Destination '{dest}' is shared by non-reusable flags")
            }
            SchemaError::DuplicateSubcommand(name) => {
                write!(f, "Subcommand '{name}' declared twice")
            }
            SchemaError::InvalidNargs(msg) => write!(f, "Invalid nargs: {msg}"),
            SchemaError::InvalidAction { arg, action } => {
                write!(f, "Action '{action}' is not valid for positional '{arg}'")
            }
            SchemaError::UnknownProvider(name) => write!(f, "Unknown choice provider: {name}"),
            SchemaError::InvalidFormat(msg) => write!(f, "Invalid schema format: {msg}"),
        }
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnfinishedArgument {
                name,
                arity,
                entered,
            } => write!(
                f,
                "Error: argument {name}: {} ({entered} entered)",
                arity.range_error()
            ),
            ResolveError::MutexConflict { name, other } => {
                write!(f, "Error: argument {name}: not allowed with argument {other}")
            }
            ResolveError::UnknownSubcommand(token) => write!(f, "Unknown subcommand: {token}"),
            ResolveError::ChoiceSource { name, error } => {
                let indented: Vec<String> = error
                    .message()
                    .lines()
                    .map(|line| {
                        if line.trim().is_empty() {
                            line.to_string()
                        } else {
                            format!("  {line}")
                        }
                    })
                    .collect();
                write!(f, "Error tab completing {name}:\n{}", indented.join("\n"))
            }
        }
    }
}

impl std::error::Error for ShellError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for SchemaError {}
impl std::error::Error for CompletionError {}
impl std::error::Error for ResolveError {}

/* ========================= Conversions to ShellError ========================= */

impl From<io::Error> for ShellError {
    fn from(err: io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl From<SchemaError> for ShellError {
    fn from(err: SchemaError) -> Self {
        ShellError::Schema(err)
    }
}

impl From<String> for ShellError {
    fn from(msg: String) -> Self {
        ShellError::Generic(msg)
    }
}

impl From<&str> for ShellError {
    fn from(msg: &str) -> Self {
        ShellError::Generic(msg.to_owned())
    }
}

impl From<reedline::ReedlineError> for ShellError {
    fn from(err: reedline::ReedlineError) -> Self {
        ShellError::Readline(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfinished_argument_message() {
        let err = ResolveError::UnfinishedArgument {
            name: "--pair".to_string(),
            arity: Arity::exactly(2),
            entered: 1,
        };
        assert_eq!(
            err.to_string(),
            "Error: argument --pair: expected 2 arguments (1 entered)"
        );
        assert!(err.is_reported());
    }

    #[test]
    fn test_mutex_conflict_message() {
        let err = ResolveError::MutexConflict {
            name: "--json".to_string(),
            other: "--table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error: argument --json: not allowed with argument --table"
        );
    }

    #[test]
    fn test_choice_source_message_is_indented() {
        let err = ResolveError::ChoiceSource {
            name: "host".to_string(),
            error: CompletionError::new("server down\nretry later"),
        };
        assert_eq!(
            err.to_string(),
            "Error tab completing host:\n  server down\n  retry later"
        );
    }

    #[test]
    fn test_unknown_subcommand_is_silent() {
        assert!(!ResolveError::UnknownSubcommand("nope".to_string()).is_reported());
    }

    #[test]
    fn test_conversions() {
        let err: ShellError = SchemaError::DuplicateFlag("--x".to_string()).into();
        assert_eq!(err.to_string(), "Schema error: Flag '--x' declared twice");

        let err: ShellError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
