//! Error handling module for argshell.
//!
//! Two families of errors live here:
//! - Application errors (`ShellError` and its kinds) returned from
//!   configuration loading, schema building and the REPL.
//! - Completion conditions (`ResolveError`, `CompletionError`) which the
//!   completion engine reports through its host instead of returning them.
//!
//! # Example
//!
//! ```rust,no_run
//! use argshell::error::{Result, ShellError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ShellError::Generic("not today".to_string()))
//! }
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    CompletionError, ConfigError, ResolveError, Result, SchemaError, ShellError,
};
