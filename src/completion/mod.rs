//! Grammar-driven tab completion
//!
//! # Architecture
//!
//! - **matching**: flag-shape classification and prefix matching
//! - **state**: how many values an argument has taken against its arity
//! - **engine**: token replay, completion of the last token, subcommand
//!   help completion and help lookup
//! - **format**: the per-request [`Completions`] result and the two-column
//!   descriptive display
//! - **host**: the [`CompletionHost`] the engine reports hints and errors to
//!
//! # Examples
//!
//! ```no_run
//! use argshell::completion::ArgCompleter;
//! use argshell::grammar::{Arg, CompletionRequest, Grammar};
//! # use argshell::completion::{CompletionHost, MessageKind};
//! # use argshell::config::CompletionConfig;
//! # struct Host(CompletionConfig);
//! # impl CompletionHost for Host {
//! #     fn settings(&self) -> &CompletionConfig { &self.0 }
//! #     fn terminal_width(&self) -> usize { 80 }
//! #     fn print_message(&self, _: MessageKind, msg: &str) { println!("{msg}") }
//! # }
//! # let host = Host(CompletionConfig::default());
//!
//! let grammar = Grammar::builder("greet")
//!     .arg(Arg::positional("name").choices(["alice", "bob"]))
//!     .build()
//!     .unwrap();
//!
//! let completer = ArgCompleter::new(&grammar, &host);
//! let tokens = vec!["greet".to_string(), "al".to_string()];
//! let request = CompletionRequest { text: "al", line: "greet al", begidx: 6, endidx: 8 };
//! assert_eq!(completer.complete(&tokens, &request), vec!["alice"]);
//! ```

mod engine;
mod format;
mod host;
mod matching;
mod state;


pub use engine::ArgCompleter;
pub use format::{
    CompletionItem, Completions, DisplayMatches, describe, display_width, pad_display,
};
pub use host::{CompletionHost, MessageKind};
pub use matching::{basic_complete, is_single_prefix_char, looks_like_flag};
pub use state::ArgumentState;

#[cfg(test)]
pub use host::RecordingHost;
