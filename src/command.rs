//! # Command Invoker
//!
//! A step's command comes in one of three shapes:
//!
//! - a function called with no arguments,
//! - a source text handed verbatim to the target's [`Evaluator`],
//! - a call spec `(target, args...)` whose target is a function or a name the
//!   evaluator resolves to one.
//!
//! [`Command::invoke`] consumes the command, so it runs exactly once. Whatever
//! it raises (including a panic, or a failure to resolve the target name) is
//! captured into the [`Invocation`] and never propagates to the caller.

use std::convert::TryFrom;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{HarnessError, Thrown};
use crate::serialize::to_display_string;
use crate::value::{Callable, Value};

/// Shown in place of a function that has no display name.
pub const UNNAMED_FUNCTION: &str = "/*Unnamed Function*/";

/// Capability to run arbitrary source text in the target's context.
pub trait Evaluator {
    fn evaluate(&mut self, code: &str) -> Result<Value, Thrown>;
}

// ============================================================================
// COMMAND SHAPES
// ============================================================================

/// The function part of a call spec.
#[derive(Debug, Clone)]
pub enum CallTarget {
    Callable(Callable),
    /// Resolved through the evaluator when the command runs.
    Name(String),
}

impl CallTarget {
    pub fn display_name(&self) -> &str {
        match self {
            CallTarget::Callable(f) => f.name().unwrap_or(UNNAMED_FUNCTION),
            CallTarget::Name(name) => name,
        }
    }

    /// Produces the function to call. A resolved name is wrapped in a
    /// forwarding callable that keeps the name as written, so diagnostics show
    /// `view.insertText` rather than whatever the evaluator returned.
    fn resolve<E: Evaluator + ?Sized>(&self, evaluator: &mut E) -> Result<Callable, Thrown> {
        match self {
            CallTarget::Callable(f) => Ok(f.clone()),
            CallTarget::Name(name) => match evaluator.evaluate(name)? {
                Value::Function(f) => Ok(f.renamed(name.as_str())),
                other => Err(Thrown::type_error(format!(
                    "{name} is not a function (found {})",
                    other.type_name()
                ))),
            },
        }
    }
}

impl From<Callable> for CallTarget {
    fn from(f: Callable) -> Self {
        CallTarget::Callable(f)
    }
}

impl From<&str> for CallTarget {
    fn from(name: &str) -> Self {
        CallTarget::Name(name.to_string())
    }
}

impl From<String> for CallTarget {
    fn from(name: String) -> Self {
        CallTarget::Name(name)
    }
}

/// What a step executes.
#[derive(Debug, Clone)]
pub enum Command {
    Callable(Callable),
    Source(String),
    Call { target: CallTarget, args: Vec<Value> },
}

/// Captured result of running a command, plus the text of what ran.
#[derive(Debug)]
pub struct Invocation {
    pub result: Result<Value, Thrown>,
    pub code: String,
}

impl Invocation {
    pub fn value(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&Thrown> {
        self.result.as_ref().err()
    }
}

impl Command {
    pub fn call(target: impl Into<CallTarget>, args: impl IntoIterator<Item = Value>) -> Self {
        Command::Call {
            target: target.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Renders the command as readable source: a function's display name, the
    /// source text itself, or `name(arg, ...)` with display-serialized arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cmdcheck::{call, Command};
    /// assert_eq!(call!("view.insertText", "hi", 2).render(), "view.insertText('hi', 2)");
    /// assert_eq!(call!("view.undo").render(), "view.undo()");
    /// assert_eq!(Command::from("1 + 1").render(), "1 + 1");
    /// ```
    pub fn render(&self) -> String {
        match self {
            Command::Callable(f) => f.name().unwrap_or(UNNAMED_FUNCTION).to_string(),
            Command::Source(code) => code.clone(),
            Command::Call { target, args } => {
                let args: Vec<String> = args.iter().map(to_display_string).collect();
                format!("{}({})", target.display_name(), args.join(", "))
            }
        }
    }

    /// Runs the command once and captures its value or error.
    pub fn invoke<E: Evaluator + ?Sized>(self, evaluator: &mut E) -> Invocation {
        let result = capture(|| self.run(evaluator));
        let code = self.render();
        tracing::trace!(%code, raised = result.is_err(), "command invoked");
        Invocation { result, code }
    }

    fn run<E: Evaluator + ?Sized>(&self, evaluator: &mut E) -> Result<Value, Thrown> {
        match self {
            Command::Callable(f) => f.call(&[]),
            Command::Source(code) => evaluator.evaluate(code),
            Command::Call { target, args } => target.resolve(evaluator)?.call(args),
        }
    }
}

fn capture(run: impl FnOnce() -> Result<Value, Thrown>) -> Result<Value, Thrown> {
    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(result) => result,
        Err(payload) => Err(Thrown::panic(&*payload)),
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<Callable> for Command {
    fn from(f: Callable) -> Self {
        Command::Callable(f)
    }
}

impl From<&str> for Command {
    fn from(code: &str) -> Self {
        Command::Source(code.to_string())
    }
}

impl From<String> for Command {
    fn from(code: String) -> Self {
        Command::Source(code)
    }
}

/// Reads the loose form: a text is source, a function is called bare, and a
/// list is a call spec whose head is a function or a name.
impl TryFrom<Value> for Command {
    type Error = HarnessError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(code) => Ok(Command::Source(code)),
            Value::Function(f) => Ok(Command::Callable(f)),
            Value::List(list) => {
                let items = list.items();
                let (head, args) = items.split_first().ok_or_else(|| {
                    HarnessError::MalformedCommand {
                        reason: "call spec is empty".to_string(),
                    }
                })?;
                let target = match head {
                    Value::Text(name) => CallTarget::Name(name.clone()),
                    Value::Function(f) => CallTarget::Callable(f.clone()),
                    other => {
                        return Err(HarnessError::MalformedCommand {
                            reason: format!(
                                "call target must be a function or a name, found {}",
                                other.type_name()
                            ),
                        })
                    }
                };
                Ok(Command::Call {
                    target,
                    args: args.to_vec(),
                })
            }
            other => Err(HarnessError::MalformedCommand {
                reason: format!("cannot run a {}", other.type_name()),
            }),
        }
    }
}

/// Builds a call spec, converting each argument with `Value::from`.
///
/// ```rust
/// use cmdcheck::call;
/// let cmd = call!("document.replaceText", "a\tb", true);
/// assert_eq!(cmd.render(), r"document.replaceText('a\tb', true)");
/// ```
#[macro_export]
macro_rules! call {
    ($target:expr $(, $arg:expr)* $(,)?) => {
        $crate::Command::call($target, ::std::vec![$($crate::Value::from($arg)),*])
    };
}
