//! # Collaborator Interfaces
//!
//! The harness drives a target system it does not own and reports through a
//! sink it does not implement. Both are consumed only through these traits.

use crate::command::Evaluator;
use crate::config::Config;
use crate::error::Thrown;
use crate::outcome::Outcome;

/// The stateful component under test.
///
/// Evaluation of source text (and resolution of call-spec names) goes through
/// the [`Evaluator`] supertrait.
pub trait TargetSystem: Evaluator {
    /// Applies behavior options before a step.
    fn set_config(&mut self, config: &Config);

    /// Establishes the pre-step state.
    fn set_input(&mut self, input: &str);

    /// Compares the current state against the expected post-step state.
    fn check_output(&mut self, expected: &str) -> bool;
}

/// Everything a reporter needs to describe a step that was not a clean pass.
#[derive(Debug, Clone)]
pub struct Mismatch {
    /// Stack depth of the reporting call site, counted from the step.
    pub severity: u32,
    pub case_name: Option<String>,
    pub message: Option<String>,
    /// Readable source of the command that ran.
    pub code: String,
    /// Error captured from the command, if it raised.
    pub error: Option<Thrown>,
    pub actual: String,
    pub expected: String,
    pub outcome: Outcome,
}

/// Receives one call per non-clean step.
pub trait DiagnosticSink {
    fn cmd_differ(&mut self, mismatch: &Mismatch);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn cmd_differ(&mut self, mismatch: &Mismatch) {
        (**self).cmd_differ(mismatch);
    }
}
