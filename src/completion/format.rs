//! Per-request completion results and their descriptive display form

use unicode_width::UnicodeWidthStr;

/// One completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub value: String,
    pub description: Option<String>,
}

/// Two-column listing shown in place of the bare candidates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayMatches {
    /// Header line, starting with a newline
    pub header: String,
    /// One padded `value  description` row per candidate
    pub entries: Vec<String>,
}

/// Result of one completion request.
///
/// `matches_sorted` tells the host the items are already in display order
/// and must not be re-sorted. `display`, when present, is what the host
/// should show instead of the plain values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completions {
    pub items: Vec<CompletionItem>,
    pub matches_sorted: bool,
    pub display: Option<DisplayMatches>,
}

impl CompletionItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
        }
    }

    pub fn described(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: Some(description.into()),
        }
    }
}

impl Completions {
    /// Plain values with nothing sorted or staged for display
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: values.into_iter().map(CompletionItem::new).collect(),
            ..Self::default()
        }
    }

    /// Candidate values in order
    pub fn matches(&self) -> Vec<String> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

/// Build the two-column display for described candidates.
///
/// The value column is as wide as the widest candidate or the destination
/// name, plus two spaces. Descriptions are padded to fill 60% of the
/// terminal.
pub fn describe(
    items: &[CompletionItem],
    dest: &str,
    header: &str,
    terminal_width: usize,
) -> DisplayMatches {
    let token_width = items
        .iter()
        .map(|item| display_width(&item.value))
        .fold(display_width(dest), usize::max);
    let value_column = token_width + 2;
    let fill_width = (terminal_width * 6 / 10).saturating_sub(value_column);

    let entries = items
        .iter()
        .map(|item| {
            let description = item.description.as_deref().unwrap_or_default();
            format!(
                "{}{}",
                pad_display(&item.value, value_column),
                pad_display(description, fill_width)
            )
        })
        .collect();

    DisplayMatches {
        header: format!("\n{}{header}", pad_display(&dest.to_uppercase(), value_column)),
        entries,
    }
}

/// Width of a string on screen, ignoring ANSI escape sequences
pub fn display_width(s: &str) -> usize {
    let stripped = strip_ansi_escapes::strip_str(s);
    UnicodeWidthStr::width(stripped.as_str())
}

/// Right-pad a string to the given display width
pub fn pad_display(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - current))
    }
}
