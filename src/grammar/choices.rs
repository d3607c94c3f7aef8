//! Choice sources for argument values
//!
//! An argument's completion candidates come from one of three places:
//! - a static set fixed when the grammar is built
//! - a choices provider, a function producing the full candidate set which
//!   the engine then filters and prefix-matches
//! - a completer, a function that receives the fragment, line and cursor
//!   bounds and does its own matching
//!
//! Whether a provider is handed the accumulated `ArgTokens` map is decided
//! when the source is constructed.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::CompletionError;

/// Tokens consumed so far, keyed by argument destination.
///
/// Includes ancestor grammars' tokens when completing inside a subcommand.
pub type ArgTokens = IndexMap<String, Vec<String>>;

/// A single candidate value
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceValue {
    Text(String),
    Int(i64),
    Float(f64),
}

/// A candidate value with an optional description shown beside it
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: ChoiceValue,
    pub description: Option<String>,
}

/// Cursor context passed to completers
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Fragment under the cursor
    pub text: &'a str,
    /// Full input line
    pub line: &'a str,
    /// Start offset of the fragment in `line`
    pub begidx: usize,
    /// End offset of the fragment in `line`
    pub endidx: usize,
}

/// Produces the full candidate set for an argument
pub trait ChoicesProvider: Send + Sync {
    fn choices(&self, arg_tokens: Option<&ArgTokens>) -> Result<Vec<Choice>, CompletionError>;
}

/// Performs its own matching against the fragment under the cursor
pub trait CompleterProvider: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest<'_>,
        arg_tokens: Option<&ArgTokens>,
    ) -> Result<Vec<Choice>, CompletionError>;
}

impl<F> ChoicesProvider for F
where
    F: Fn(Option<&ArgTokens>) -> Result<Vec<Choice>, CompletionError> + Send + Sync,
{
    fn choices(&self, arg_tokens: Option<&ArgTokens>) -> Result<Vec<Choice>, CompletionError> {
        self(arg_tokens)
    }
}

impl<F> CompleterProvider for F
where
    F: Fn(&CompletionRequest<'_>, Option<&ArgTokens>) -> Result<Vec<Choice>, CompletionError>
        + Send
        + Sync,
{
    fn complete(
        &self,
        request: &CompletionRequest<'_>,
        arg_tokens: Option<&ArgTokens>,
    ) -> Result<Vec<Choice>, CompletionError> {
        self(request, arg_tokens)
    }
}

/// Where an argument's candidates come from
#[derive(Clone)]
pub enum ChoiceSource {
    Static(Vec<Choice>),
    Choices {
        provider: Arc<dyn ChoicesProvider>,
        wants_arg_tokens: bool,
    },
    Completer {
        completer: Arc<dyn CompleterProvider>,
        wants_arg_tokens: bool,
    },
}

impl ChoiceSource {
    /// Static choices
    pub fn fixed<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Choice>,
    {
        ChoiceSource::Static(values.into_iter().map(Into::into).collect())
    }

    /// A choices provider that does not need consumed tokens
    pub fn provider(provider: impl ChoicesProvider + 'static) -> Self {
        ChoiceSource::Choices {
            provider: Arc::new(provider),
            wants_arg_tokens: false,
        }
    }

    /// A choices provider that is handed the consumed tokens map
    pub fn provider_with_tokens(provider: impl ChoicesProvider + 'static) -> Self {
        ChoiceSource::Choices {
            provider: Arc::new(provider),
            wants_arg_tokens: true,
        }
    }

    /// A completer that does not need consumed tokens
    pub fn completer(completer: impl CompleterProvider + 'static) -> Self {
        ChoiceSource::Completer {
            completer: Arc::new(completer),
            wants_arg_tokens: false,
        }
    }

    /// A completer that is handed the consumed tokens map
    pub fn completer_with_tokens(completer: impl CompleterProvider + 'static) -> Self {
        ChoiceSource::Completer {
            completer: Arc::new(completer),
            wants_arg_tokens: true,
        }
    }

    pub fn wants_arg_tokens(&self) -> bool {
        match self {
            ChoiceSource::Static(_) => false,
            ChoiceSource::Choices {
                wants_arg_tokens, ..
            }
            | ChoiceSource::Completer {
                wants_arg_tokens, ..
            } => *wants_arg_tokens,
        }
    }

    /// Static choices, if this source has them
    pub fn static_choices(&self) -> Option<&[Choice]> {
        match self {
            ChoiceSource::Static(choices) => Some(choices),
            _ => None,
        }
    }
}

impl fmt::Debug for ChoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceSource::Static(choices) => f.debug_tuple("Static").field(choices).finish(),
            ChoiceSource::Choices {
                wants_arg_tokens, ..
            } => f
                .debug_struct("Choices")
                .field("wants_arg_tokens", wants_arg_tokens)
                .finish_non_exhaustive(),
            ChoiceSource::Completer {
                wants_arg_tokens, ..
            } => f
                .debug_struct("Completer")
                .field("wants_arg_tokens", wants_arg_tokens)
                .finish_non_exhaustive(),
        }
    }
}

impl Choice {
    pub fn new(value: impl Into<ChoiceValue>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }

    /// A choice with a description column
    pub fn described(value: impl Into<ChoiceValue>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: Some(description.into()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.value.is_numeric()
    }
}

impl ChoiceValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ChoiceValue::Int(_) | ChoiceValue::Float(_))
    }

    /// Numeric value used for ordering
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            ChoiceValue::Int(i) => Some(i as f64),
            ChoiceValue::Float(f) => Some(f),
            ChoiceValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceValue::Text(s) => write!(f, "{s}"),
            ChoiceValue::Int(i) => write!(f, "{i}"),
            // Whole floats keep their ".0" so they never look like integers
            ChoiceValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            ChoiceValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        ChoiceValue::Text(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        ChoiceValue::Text(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        ChoiceValue::Int(value)
    }
}

impl From<i32> for ChoiceValue {
    fn from(value: i32) -> Self {
        ChoiceValue::Int(value.into())
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        ChoiceValue::Float(value)
    }
}

macro_rules! choice_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Choice {
                fn from(value: $ty) -> Self {
                    Choice::new(value)
                }
            }
        )*
    };
}

choice_from!(&str, String, i64, i32, f64);
