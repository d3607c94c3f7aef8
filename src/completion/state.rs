//! Per-argument consumption tracking during replay

use crate::error::ResolveError;
use crate::grammar::{ArgDef, ArgId, ArgTokens, Arity, help};

/// How far an argument has got towards its arity
#[derive(Debug, Clone)]
pub struct ArgumentState<'g> {
    pub id: ArgId,
    pub def: &'g ArgDef,
    pub arity: Arity,
    pub count: usize,
    pub is_remainder: bool,
}

impl<'g> ArgumentState<'g> {
    pub fn new(id: ArgId, def: &'g ArgDef) -> Self {
        Self {
            id,
            def,
            arity: def.arity(),
            count: 0,
            is_remainder: def.is_remainder(),
        }
    }

    /// Record one token for this argument
    pub fn consume(&mut self, token: &str, consumed: &mut ArgTokens) {
        self.count += 1;
        consumed
            .entry(self.def.dest().to_string())
            .or_default()
            .push(token.to_string());
    }

    /// Below the minimum number of values
    pub fn is_unfinished(&self) -> bool {
        self.count < self.arity.min
    }

    /// At the maximum number of values
    pub fn is_full(&self) -> bool {
        self.arity.is_full(self.count)
    }

    pub fn unfinished_error(&self) -> ResolveError {
        ResolveError::UnfinishedArgument {
            name: help::display_name(self.def),
            arity: self.arity,
            entered: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Arg, Grammar, Nargs};

    #[test]
    fn test_consume_until_full() {
        let grammar = Grammar::builder("cmd")
            .arg(Arg::flag(["--pair"]).nargs(Nargs::Exactly(2)))
            .build()
            .unwrap();
        let id = grammar.flag("--pair").unwrap();
        let mut state = ArgumentState::new(id, grammar.arg(id));
        let mut consumed = ArgTokens::new();

        assert!(state.is_unfinished());
        state.consume("a", &mut consumed);
        assert!(state.is_unfinished());
        assert!(!state.is_full());
        state.consume("b", &mut consumed);
        assert!(!state.is_unfinished());
        assert!(state.is_full());
        assert_eq!(consumed["pair"], vec!["a", "b"]);

        assert_eq!(
            state.unfinished_error().to_string(),
            "Error: argument --pair: expected 2 arguments (2 entered)"
        );
    }

    #[test]
    fn test_remainder_never_full() {
        let grammar = Grammar::builder("cmd")
            .arg(Arg::positional("rest").nargs(Nargs::Remainder))
            .build()
            .unwrap();
        let id = grammar.positionals()[0];
        let mut state = ArgumentState::new(id, grammar.arg(id));
        let mut consumed = ArgTokens::new();
        for token in ["--x", "y", "-z"] {
            state.consume(token, &mut consumed);
        }
        assert!(state.is_remainder);
        assert!(!state.is_full());
        assert_eq!(state.count, 3);
    }
}
