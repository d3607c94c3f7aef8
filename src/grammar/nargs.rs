//! Argument arity
//!
//! `Nargs` is what a schema declares; `Arity` is the resolved
//! `(min, max)` pair the replay engine counts against.

use std::fmt;

/// Declared number of values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly one value, rendered without repetition (`X`)
    Single,
    /// Zero or one value (`?`)
    Optional,
    /// Any number of values (`*`)
    ZeroOrMore,
    /// At least one value (`+`)
    OneOrMore,
    /// Everything that follows, flag-like or not (`...`)
    Remainder,
    /// A fixed count
    Exactly(usize),
    /// An explicit range; `max: None` is unbounded
    Range { min: usize, max: Option<usize> },
}

/// Resolved minimum/maximum value count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means unbounded
    pub max: Option<usize>,
}

impl Nargs {
    /// Resolve into a `(min, max)` arity
    pub fn arity(&self) -> Arity {
        match *self {
            Nargs::Single => Arity::exactly(1),
            Nargs::Optional => Arity::new(0, Some(1)),
            Nargs::ZeroOrMore | Nargs::Remainder => Arity::new(0, None),
            Nargs::OneOrMore => Arity::new(1, None),
            Nargs::Exactly(n) => Arity::exactly(n),
            Nargs::Range { min, max } => Arity::new(min, max),
        }
    }

    /// Whether this argument swallows every following token
    pub fn is_remainder(&self) -> bool {
        matches!(self, Nargs::Remainder)
    }

    /// Check that a range is well formed
    pub fn is_valid(&self) -> bool {
        match *self {
            Nargs::Range { min, max: Some(max) } => min <= max,
            _ => true,
        }
    }

    /// Render the value part of an invocation for the given metavar
    pub fn format(&self, metavar: &str) -> String {
        match *self {
            Nargs::Single => metavar.to_string(),
            Nargs::Optional => format!("[{metavar}]"),
            Nargs::ZeroOrMore => format!("[{metavar} [{metavar} ...]]"),
            Nargs::OneOrMore => format!("{metavar} [{metavar} ...]"),
            Nargs::Remainder => "...".to_string(),
            Nargs::Exactly(n) => vec![metavar; n].join(" "),
            Nargs::Range { min, max: None } => format!("{metavar}{{{min}+}}"),
            Nargs::Range { min, max: Some(max) } => format!("{metavar}{{{min}..{max}}}"),
        }
    }
}

impl Arity {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Self::new(n, Some(n))
    }

    /// Whether `count` values satisfy the maximum
    pub fn is_full(&self, count: usize) -> bool {
        self.max.is_some_and(|max| count >= max)
    }

    /// Whether the argument takes no values at all
    pub fn takes_no_values(&self) -> bool {
        self.max == Some(0)
    }

    /// Human readable description of the expected count
    pub fn range_error(&self) -> String {
        let mut err = String::from("expected ");
        match self.max {
            None => {
                err.push_str(&format!("at least {} argument", self.min));
                if self.min != 1 {
                    err.push('s');
                }
            }
            Some(max) => {
                if self.min == max {
                    err.push_str(&format!("{} argument", self.min));
                } else {
                    err.push_str(&format!("{} to {} argument", self.min, max));
                }
                if max != 1 {
                    err.push('s');
                }
            }
        }
        err
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_of_symbols() {
        assert_eq!(Nargs::Single.arity(), Arity::exactly(1));
        assert_eq!(Nargs::Optional.arity(), Arity::new(0, Some(1)));
        assert_eq!(Nargs::ZeroOrMore.arity(), Arity::new(0, None));
        assert_eq!(Nargs::OneOrMore.arity(), Arity::new(1, None));
        assert_eq!(Nargs::Remainder.arity(), Arity::new(0, None));
        assert_eq!(Nargs::Exactly(0).arity(), Arity::exactly(0));
        assert!(Nargs::Remainder.is_remainder());
        assert!(!Nargs::ZeroOrMore.is_remainder());
    }

    #[test]
    fn test_range_validation() {
        assert!(Nargs::Range { min: 1, max: Some(3) }.is_valid());
        assert!(Nargs::Range { min: 2, max: None }.is_valid());
        assert!(!Nargs::Range { min: 3, max: Some(1) }.is_valid());
    }

    #[test]
    fn test_is_full() {
        let arity = Arity::new(1, Some(2));
        assert!(!arity.is_full(1));
        assert!(arity.is_full(2));
        assert!(!Arity::new(0, None).is_full(100));
        assert!(Arity::exactly(0).takes_no_values());
    }

    #[test]
    fn test_range_error_wording() {
        assert_eq!(Arity::exactly(1).range_error(), "expected 1 argument");
        assert_eq!(Arity::exactly(2).range_error(), "expected 2 arguments");
        assert_eq!(Arity::new(1, Some(3)).range_error(), "expected 1 to 3 arguments");
        assert_eq!(Arity::new(1, None).range_error(), "expected at least 1 argument");
        assert_eq!(Arity::new(2, None).range_error(), "expected at least 2 arguments");
    }

    #[test]
    fn test_format() {
        assert_eq!(Nargs::Single.format("N"), "N");
        assert_eq!(Nargs::Optional.format("N"), "[N]");
        assert_eq!(Nargs::ZeroOrMore.format("N"), "[N [N ...]]");
        assert_eq!(Nargs::OneOrMore.format("N"), "N [N ...]");
        assert_eq!(Nargs::Remainder.format("N"), "...");
        assert_eq!(Nargs::Exactly(2).format("N"), "N N");
        assert_eq!(Nargs::Range { min: 1, max: Some(3) }.format("N"), "N{1..3}");
        assert_eq!(Nargs::Range { min: 2, max: None }.format("N"), "N{2+}");
    }
}
