//! Token classification and prefix matching

use crate::grammar::{Grammar, is_negative_number};

/// Whether a token should be treated as a flag by the given grammar.
///
/// A lone prefix character is never flag-like since it may still become a
/// negative number. Negative numbers only count as flags when the grammar
/// declares flags that look like them.
pub fn looks_like_flag(token: &str, grammar: &Grammar) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if chars.next().is_none() || !grammar.is_prefix_char(first) {
        return false;
    }
    if is_negative_number(token) && !grammar.has_negative_number_flags() {
        return false;
    }
    !token.contains(' ')
}

/// Whether a token is exactly one prefix character, such as `-`
pub fn is_single_prefix_char(token: &str, grammar: &Grammar) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if grammar.is_prefix_char(c))
}

/// Keep the candidates that start with `text`, in their original order
pub fn basic_complete<I, S>(text: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .filter(|candidate| candidate.as_ref().starts_with(text))
        .map(|candidate| candidate.as_ref().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Arg, ArgAction};

    fn grammar() -> Grammar {
        Grammar::builder("cmd")
            .arg(Arg::flag(["--verbose"]).action(ArgAction::StoreTrue))
            .build()
            .unwrap()
    }

    #[test]
    fn test_looks_like_flag() {
        let g = grammar();
        assert!(looks_like_flag("--verbose", &g));
        assert!(looks_like_flag("-x", &g));
        assert!(looks_like_flag("--unknown", &g));
        assert!(!looks_like_flag("-", &g));
        assert!(!looks_like_flag("", &g));
        assert!(!looks_like_flag("value", &g));
        assert!(!looks_like_flag("-5", &g));
        assert!(!looks_like_flag("-2.5", &g));
        assert!(!looks_like_flag("--has space", &g));
    }

    #[test]
    fn test_negative_numbers_with_numeric_flags() {
        let g = Grammar::builder("cmd")
            .arg(Arg::flag(["-1"]).action(ArgAction::StoreTrue))
            .build()
            .unwrap();
        assert!(looks_like_flag("-5", &g));
    }

    #[test]
    fn test_custom_prefix_chars() {
        let g = Grammar::builder("cmd")
            .prefix_chars("+")
            .arg(Arg::flag(["+x"]).action(ArgAction::StoreTrue))
            .build()
            .unwrap();
        assert!(looks_like_flag("+x", &g));
        assert!(!looks_like_flag("-x", &g));
        assert!(is_single_prefix_char("+", &g));
        assert!(!is_single_prefix_char("-", &g));
    }

    #[test]
    fn test_single_prefix_char() {
        let g = grammar();
        assert!(is_single_prefix_char("-", &g));
        assert!(!is_single_prefix_char("--", &g));
        assert!(!is_single_prefix_char("", &g));
        assert!(!is_single_prefix_char("a", &g));
    }

    #[test]
    fn test_basic_complete() {
        let candidates = ["alice", "bob", "alfred"];
        assert_eq!(basic_complete("al", candidates), vec!["alice", "alfred"]);
        assert_eq!(basic_complete("", candidates).len(), 3);
        assert!(basic_complete("z", candidates).is_empty());
    }
}
