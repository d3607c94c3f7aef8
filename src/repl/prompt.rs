//! Prompt rendering for the argshell REPL

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Fixed-text prompt
pub struct ShellPrompt {
    text: String,
}

impl ShellPrompt {
    /// Create a prompt that renders the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    /// The indicator is part of the configured prompt text
    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_prompt() {
        let prompt = ShellPrompt::new("(argshell) ");
        assert_eq!(prompt.render_prompt_left(), "(argshell) ");
        assert_eq!(prompt.render_prompt_right(), "");
    }

    #[test]
    fn test_indicators() {
        let prompt = ShellPrompt::new("> ");
        assert_eq!(prompt.render_prompt_indicator(PromptEditMode::Default), "");
        assert_eq!(prompt.render_prompt_multiline_indicator(), "... ");
    }

    #[test]
    fn test_history_search_indicator() {
        let prompt = ShellPrompt::new("> ");
        let search = PromptHistorySearch::new(PromptHistorySearchStatus::Failing, "mus".to_string());
        assert_eq!(
            prompt.render_prompt_history_search_indicator(search),
            "(failing reverse-search: mus) "
        );
    }
}
