//! The collaborator a completion engine runs inside of

use crate::config::CompletionConfig;

/// Kind of side-channel message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Usage hint for the argument under the cursor
    Hint,
    /// Unfinished argument, group conflict or failing choice source
    Error,
}

/// Line-editing host that owns the terminal.
///
/// Messages are fire-and-forget: the host prints them and redraws its
/// prompt and input line.
pub trait CompletionHost {
    /// Completion settings
    fn settings(&self) -> &CompletionConfig;

    /// Current terminal width in columns
    fn terminal_width(&self) -> usize;

    /// Show a hint or error instead of completions
    fn print_message(&self, kind: MessageKind, message: &str);
}

#[cfg(test)]
pub use recording::RecordingHost;

#[cfg(test)]
mod recording {
    use std::cell::RefCell;

    use super::*;

    /// Host double that records every message
    #[derive(Debug)]
    pub struct RecordingHost {
        pub settings: CompletionConfig,
        pub width: usize,
        messages: RefCell<Vec<(MessageKind, String)>>,
    }

    impl RecordingHost {
        pub fn new() -> Self {
            Self {
                settings: CompletionConfig::default(),
                width: 80,
                messages: RefCell::new(Vec::new()),
            }
        }

        pub fn messages(&self) -> Vec<(MessageKind, String)> {
            self.messages.borrow().clone()
        }

        pub fn errors(&self) -> Vec<String> {
            self.of_kind(MessageKind::Error)
        }

        pub fn hints(&self) -> Vec<String> {
            self.of_kind(MessageKind::Hint)
        }

        fn of_kind(&self, kind: MessageKind) -> Vec<String> {
            self.messages
                .borrow()
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl CompletionHost for RecordingHost {
        fn settings(&self) -> &CompletionConfig {
            &self.settings
        }

        fn terminal_width(&self) -> usize {
            self.width
        }

        fn print_message(&self, kind: MessageKind, message: &str) {
            self.messages.borrow_mut().push((kind, message.to_string()));
        }
    }
}
