use std::sync::Arc;

use reedline::{
    ColumnarMenu, Emacs, ExternalPrinter, FileBackedHistory, KeyCode, KeyModifiers, MenuBuilder, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, default_emacs_keybindings,
};
use tracing::{debug, warn};

use crate::completion::CompletionHost;
use crate::config::{Config, HistoryConfig};
use crate::error::Result;

use super::commands::{CommandSet, HELP_COMMAND};
use super::completer::ShellCompleter;
use super::host::TerminalHost;
use super::prompt::ShellPrompt;

/// Name the completion menu is registered under
const COMPLETION_MENU: &str = "completion_menu";

/// REPL engine for interactive input with grammar-driven completion
pub struct ReplEngine {
    /// Line editor for command input
    editor: Reedline,

    /// Prompt rendered before each line
    prompt: ShellPrompt,

    /// Commands shared with the completer
    commands: Arc<CommandSet>,

    /// Host used for help rendering outside completion
    host: TerminalHost,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `commands` - Commands to complete and dispatch
    /// * `config` - Effective configuration
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(commands: Arc<CommandSet>, config: &Config) -> Result<Self> {
        let host = TerminalHost::new(config.completion.clone(), config.display.color_output);
        // Completion hints are printed by the editor so it can redraw the line
        let printer = ExternalPrinter::<String>::default();
        let completer = ShellCompleter::new(
            Arc::clone(&commands),
            host.clone().with_printer(printer.clone()),
        );

        let menu = ColumnarMenu::default().with_name(COMPLETION_MENU);

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        keybindings.add_binding(
            KeyModifiers::SHIFT,
            KeyCode::BackTab,
            ReedlineEvent::MenuPrevious,
        );

        let editor = Reedline::create()
            .with_completer(Box::new(completer))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(menu)))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_quick_completions(false)
            .with_ansi_colors(config.display.color_output)
            .with_external_printer(printer)
            .with_history(Box::new(Self::create_history(&config.history)?));

        Ok(Self {
            editor,
            prompt: ShellPrompt::new(config.display.prompt.clone()),
            commands,
            host,
            running: true,
        })
    }

    /// History backed by the configured file, or in memory only
    fn create_history(history_config: &HistoryConfig) -> Result<FileBackedHistory> {
        if history_config.persist {
            match FileBackedHistory::with_file(
                history_config.max_size,
                history_config.file_path.clone(),
            ) {
                Ok(history) => return Ok(history),
                Err(e) => warn!(
                    "History file {} unavailable: {}",
                    history_config.file_path.display(),
                    e
                ),
            }
        }
        Ok(FileBackedHistory::new(history_config.max_size)?)
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line, or None on EOF
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.read_line(&self.prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            // Ctrl-C abandons the current line only
            Signal::CtrlC => Ok(Some(String::new())),
            Signal::CtrlD => {
                self.running = false;
                Ok(None)
            }
        }
    }

    /// Run the read loop until EOF
    pub fn run(&mut self) -> Result<()> {
        while self.is_running() {
            let Some(line) = self.read_line()? else {
                break;
            };
            if let Some(output) = respond(&self.commands, &self.host, &line) {
                println!("{output}");
            }
        }
        debug!("REPL finished");
        Ok(())
    }

    /// Check if REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Response to an accepted line.
///
/// Commands are not executed: `help` prints help text and any other known
/// command is echoed back.
pub fn respond(commands: &CommandSet, host: &dyn CompletionHost, line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let words = shlex::split(trimmed)
        .unwrap_or_else(|| trimmed.split_whitespace().map(str::to_string).collect());
    let command = words.first()?;

    if command == HELP_COMMAND {
        return Some(commands.help_text(&words[1..], host).trim_end().to_string());
    }
    if commands.get(command).is_some() {
        Some(trimmed.to_string())
    } else {
        Some(format!("Unknown command: {command}"))
    }
}
