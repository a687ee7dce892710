//! Assertion harness for driving a stateful target (typically a text editor)
//! with scripted commands and judging what each command did.

pub use crate::classify::{classify, Comparison};
pub use crate::command::{CallTarget, Command, Evaluator, Invocation, UNNAMED_FUNCTION};
pub use crate::config::{normalize_config, BlockSelection, Config};
pub use crate::error::{HarnessError, Thrown};
pub use crate::expectation::{Expectation, StepOptions};
pub use crate::framework::{StepRecord, Summary, TestCase, TestFramework};
pub use crate::outcome::Outcome;
pub use crate::report::{CollectingSink, TerminalReporter};
pub use crate::serialize::{to_comparable_string, to_display_string, KeyOrder};
pub use crate::target::{DiagnosticSink, Mismatch, TargetSystem};
pub use crate::value::{Callable, CollectionRef, ListRef, MapRef, Value};
pub use crate::wrapper::callee_wrapper;

pub mod classify;
pub mod command;
pub mod config;
pub mod error;
pub mod expectation;
pub mod framework;
pub mod outcome;
pub mod report;
pub mod serialize;
pub mod target;
pub mod value;
pub mod wrapper;
