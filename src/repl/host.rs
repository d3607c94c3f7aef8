//! Terminal-backed completion host

use std::io::{self, Write};

use nu_ansi_term::{Color, Style};
use reedline::ExternalPrinter;
use tracing::debug;

use crate::completion::{CompletionHost, MessageKind};
use crate::config::CompletionConfig;

/// Width assumed when the terminal cannot be measured
const FALLBACK_WIDTH: usize = 80;

/// Completion host writing to the process's terminal
#[derive(Debug, Clone)]
pub struct TerminalHost {
    settings: CompletionConfig,
    error_style: Option<Style>,
    /// Hands messages to a running line editor, which redraws the prompt
    printer: Option<ExternalPrinter<String>>,
}

impl TerminalHost {
    /// Create a terminal host
    ///
    /// # Arguments
    /// * `settings` - Completion settings the engine reads
    /// * `color_output` - Paint errors red
    pub fn new(settings: CompletionConfig, color_output: bool) -> Self {
        Self {
            settings,
            error_style: color_output.then(|| Style::new().fg(Color::Red)),
            printer: None,
        }
    }

    /// Route messages through the line editor's external printer.
    ///
    /// The editor prints them above the prompt and repaints the input line,
    /// so hints shown during completion do not garble what was typed.
    pub fn with_printer(mut self, printer: ExternalPrinter<String>) -> Self {
        self.printer = Some(printer);
        self
    }

    /// Text as it is written to the terminal.
    ///
    /// While the line editor holds the terminal in raw mode a bare `\n`
    /// does not return the carriage.
    fn render(&self, kind: MessageKind, message: &str, raw_mode: bool) -> String {
        let painted = match (kind, &self.error_style) {
            (MessageKind::Error, Some(style)) => style.paint(message).to_string(),
            _ => message.to_string(),
        };
        if raw_mode {
            painted.replace('\n', "\r\n")
        } else {
            painted
        }
    }
}

impl CompletionHost for TerminalHost {
    fn settings(&self) -> &CompletionConfig {
        &self.settings
    }

    fn terminal_width(&self) -> usize {
        crossterm::terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .ok()
            .filter(|cols| *cols > 0)
            .unwrap_or(FALLBACK_WIDTH)
    }

    fn print_message(&self, kind: MessageKind, message: &str) {
        if let Some(printer) = &self.printer {
            let text = self.render(kind, message.trim_matches('\n'), false);
            match printer.sender().try_send(text) {
                Ok(()) => return,
                Err(e) => debug!("External printer unavailable: {}", e),
            }
        }

        let raw_mode = crossterm::terminal::is_raw_mode_enabled().unwrap_or(false);
        let text = self.render(kind, message, raw_mode);

        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain() {
        let host = TerminalHost::new(CompletionConfig::default(), false);
        assert_eq!(
            host.render(MessageKind::Error, "\nError: boom\n", false),
            "\nError: boom\n"
        );
    }

    #[test]
    fn test_render_raw_mode_uses_crlf() {
        let host = TerminalHost::new(CompletionConfig::default(), false);
        assert_eq!(
            host.render(MessageKind::Hint, "\nHint:\n  x", true),
            "\r\nHint:\r\n  x"
        );
    }

    #[test]
    fn test_render_colors_errors_only() {
        let host = TerminalHost::new(CompletionConfig::default(), true);
        let error = host.render(MessageKind::Error, "bad", false);
        assert!(error.contains("\x1b[31m"));
        assert_eq!(host.render(MessageKind::Hint, "hint", false), "hint");
    }

    #[test]
    fn test_messages_go_through_printer() {
        let printer = ExternalPrinter::<String>::default();
        let host =
            TerminalHost::new(CompletionConfig::default(), false).with_printer(printer.clone());

        host.print_message(MessageKind::Hint, "\nHint:\n  NAME  Who to greet\n");
        assert_eq!(
            printer.receiver().try_recv().ok(),
            Some("Hint:\n  NAME  Who to greet".to_string())
        );
        assert!(printer.receiver().try_recv().is_err());
    }

    #[test]
    fn test_settings_passthrough() {
        let settings = CompletionConfig {
            max_completion_items: 3,
            ..CompletionConfig::default()
        };
        let host = TerminalHost::new(settings, true);
        assert_eq!(host.settings().max_completion_items, 3);
        assert!(host.terminal_width() > 0);
    }
}
