//! Splitting an input line into completion tokens

use std::borrow::Cow;

/// Tokens before the cursor and where the fragment under it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLine {
    /// Unquoted tokens. The last one is the fragment, empty after whitespace.
    pub tokens: Vec<String>,
    /// Byte offset where the raw fragment (opening quote included) starts
    pub begidx: usize,
}

impl SplitLine {
    /// The unquoted fragment under the cursor
    pub fn text(&self) -> &str {
        self.tokens.last().map(String::as_str).unwrap_or_default()
    }
}

/// Split the text before the cursor the way a shell would.
///
/// An unterminated quote is closed before splitting so the fragment can
/// still be completed.
///
/// # Arguments
/// * `head` - Line contents up to the cursor
pub fn split_for_completion(head: &str) -> SplitLine {
    let (begidx, open_quote) = fragment_start(head);

    let mut tokens = match open_quote {
        Some(quote) => shlex::split(&format!("{head}{quote}")),
        None => shlex::split(head),
    }
    .unwrap_or_else(|| head.split_whitespace().map(str::to_string).collect());

    if begidx == head.len() {
        tokens.push(String::new());
    }

    SplitLine { tokens, begidx }
}

/// Offset of the last unquoted word boundary and any quote still open
fn fragment_start(head: &str) -> (usize, Option<char>) {
    let mut begidx = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, ch) in head.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some('"'), '"') => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, c) if c.is_whitespace() => begidx = index + c.len_utf8(),
            (None, _) => {}
        }
    }

    (begidx, quote)
}

/// Quote a candidate that would otherwise split into several words
pub fn quote_candidate(value: &str) -> Cow<'_, str> {
    if value.is_empty() || !value.chars().any(char::is_whitespace) {
        return Cow::Borrowed(value);
    }
    shlex::try_quote(value).unwrap_or(Cow::Borrowed(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(split: &SplitLine) -> Vec<&str> {
        split.tokens.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_split_mid_word() {
        let split = split_for_completion("music create --fo");
        assert_eq!(tokens(&split), vec!["music", "create", "--fo"]);
        assert_eq!(split.begidx, 13);
        assert_eq!(split.text(), "--fo");
    }

    #[test]
    fn test_split_after_space_adds_empty_fragment() {
        let split = split_for_completion("music ");
        assert_eq!(tokens(&split), vec!["music", ""]);
        assert_eq!(split.begidx, 6);
        assert_eq!(split.text(), "");
    }

    #[test]
    fn test_split_unterminated_quote() {
        let split = split_for_completion("open \"my fi");
        assert_eq!(tokens(&split), vec!["open", "my fi"]);
        assert_eq!(split.begidx, 5);
    }

    #[test]
    fn test_split_closed_quote_with_space() {
        let split = split_for_completion("open 'a b' ");
        assert_eq!(tokens(&split), vec!["open", "a b", ""]);
        assert_eq!(split.begidx, 11);
    }

    #[test]
    fn test_split_escaped_space() {
        let split = split_for_completion("open a\\ b");
        assert_eq!(tokens(&split), vec!["open", "a b"]);
        assert_eq!(split.begidx, 5);
    }

    #[test]
    fn test_split_empty_line() {
        let split = split_for_completion("");
        assert_eq!(tokens(&split), vec![""]);
        assert_eq!(split.begidx, 0);
    }

    #[test]
    fn test_quote_candidate() {
        assert_eq!(quote_candidate("plain"), "plain");
        assert_eq!(quote_candidate("my file"), "'my file'");
    }
}
