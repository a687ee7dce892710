//! # Error Taxonomy
//!
//! Two kinds of failure exist in the harness and they never mix:
//!
//! - [`Thrown`]: whatever a command raised while it ran. It is captured at the
//!   invocation boundary and handed to the classifier as plain data.
//! - [`HarnessError`]: misuse of the harness itself outside of step execution
//!   (bad configuration documents, malformed command values). These surface as
//!   `miette` diagnostics and are returned through `Result`.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// COMMAND EXECUTION ERRORS
// ============================================================================

/// An error raised by a command or by the evaluation capability.
///
/// The textual form mirrors the script convention `Name: message`, collapsing to
/// `Name` when the message is empty. Error-matching expectations compare against
/// this exact text.
///
/// # Examples
///
/// ```rust
/// use cmdcheck::Thrown;
/// assert_eq!(Thrown::type_error("x is not a function").to_string(), "TypeError: x is not a function");
/// assert_eq!(Thrown::new("RangeError", "").to_string(), "RangeError");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thrown {
    pub name: String,
    pub message: String,
}

impl Thrown {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// A generic `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::new("ReferenceError", message)
    }

    /// Wraps a panic payload caught while a command was running.
    pub fn panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "command panicked".to_string()
        };
        Self::new("Panic", message)
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for Thrown {}

// ============================================================================
// HARNESS ERRORS
// ============================================================================

/// Errors raised by the harness API itself, never by a running step.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("Configuration is not valid JSON: {0}")]
    #[diagnostic(
        code(cmdcheck::config::json),
        help("configuration documents are flat JSON objects, e.g. {{\"tabWidth\": 8}}")
    )]
    ConfigJson(#[from] serde_json::Error),

    #[error("Configuration must be a mapping, found {found}")]
    #[diagnostic(code(cmdcheck::config::shape))]
    ConfigNotMapping { found: &'static str },

    #[error("Malformed command: {reason}")]
    #[diagnostic(
        code(cmdcheck::command::malformed),
        help("a command is a source text, a function, or a list [target, ...args]")
    )]
    MalformedCommand { reason: String },
}
