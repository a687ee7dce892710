//! # Test Case Controller
//!
//! Orchestrates command steps against a [`TargetSystem`]. Every step walks the
//! same phases:
//!
//! ```text
//! Idle -> ConfiguringTarget -> InputApplied -> Invoked -> Classified -> [Reported] -> Idle
//! ```
//!
//! A step is reported through the [`DiagnosticSink`] when the output state
//! did not match or the classifier found a deviation. Steps are independent:
//! a failing step never stops the next one from running.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut suite = TestFramework::new(&mut editor, &mut reporter);
//! suite
//!     .set_config(&Config::new().with("tabWidth", 8))
//!     .test_case("insert", |t| {
//!         t.cmd(call!("view.insertText", "x"), "a|b", "ax|b")
//!          .cmd_with("view.undo()", "a|b", "a|b", Expectation::result(Value::Undefined));
//!     });
//! assert!(suite.summary().is_success());
//! ```

use serde::Serialize;

use crate::classify::classify;
use crate::command::{Command, Invocation};
use crate::config::{normalize_config, Config};
use crate::expectation::StepOptions;
use crate::outcome::Outcome;
use crate::target::{DiagnosticSink, Mismatch, TargetSystem};

/// Call-site depth reported for every step mismatch.
const REPORT_DEPTH: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ConfiguringTarget,
    InputApplied,
    Invoked,
    Classified,
    Reported,
}

// ============================================================================
// RECORDS
// ============================================================================

/// The judgment passed on one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub code: String,
    pub message: Option<String>,
    pub output_matched: bool,
    pub outcome: Outcome,
    pub passed: bool,
}

/// Pass/fail counts over any number of steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn absorb(&mut self, other: Summary) {
        self.passed += other.passed;
        self.failed += other.failed;
    }
}

// ============================================================================
// TEST CASE
// ============================================================================

/// An ordered group of steps sharing a name and a configuration.
pub struct TestCase<'a, T: ?Sized, S: ?Sized> {
    name: Option<String>,
    target: &'a mut T,
    sink: &'a mut S,
    config: Config,
    steps: Vec<StepRecord>,
}

impl<'a, T, S> TestCase<'a, T, S>
where
    T: TargetSystem + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    /// Starts a case whose configuration is the defaults overlaid with `suite_config`.
    pub fn new(name: Option<String>, target: &'a mut T, sink: &'a mut S, suite_config: &Config) -> Self {
        let mut config = Config::defaults();
        config.merge(suite_config);
        normalize_config(&mut config);
        Self {
            name,
            target,
            sink,
            config,
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn summary(&self) -> Summary {
        let passed = self.steps.iter().filter(|s| s.passed).count();
        Summary {
            passed,
            failed: self.steps.len() - passed,
        }
    }

    /// Layers case-level options over the current configuration.
    pub fn set_config(&mut self, overrides: &Config) -> &mut Self {
        self.config.merge(overrides);
        normalize_config(&mut self.config);
        self
    }

    /// Runs a step with no assertion on the command's value or error.
    pub fn cmd(&mut self, command: impl Into<Command>, input: &str, expected: &str) -> &mut Self {
        self.cmd_with(command, input, expected, StepOptions::default())
    }

    /// Runs a step with a description and/or an expectation.
    pub fn cmd_with(
        &mut self,
        command: impl Into<Command>,
        input: &str,
        expected: &str,
        options: impl Into<StepOptions>,
    ) -> &mut Self {
        let record = self.run_step(command.into(), input, expected, options.into());
        self.steps.push(record);
        self
    }

    fn run_step(&mut self, command: Command, input: &str, expected: &str, options: StepOptions) -> StepRecord {
        self.enter(Phase::ConfiguringTarget);
        self.target.set_config(&self.config);

        self.enter(Phase::InputApplied);
        self.target.set_input(input);

        self.enter(Phase::Invoked);
        let Invocation { result, code } = command.invoke(&mut *self.target);

        self.enter(Phase::Classified);
        let output_matched = self.target.check_output(expected);
        let mut comparison = classify(&options.expectation, &result);
        let passed = output_matched && comparison.outcome.is_clean();

        if !passed {
            if output_matched {
                comparison.outcome |= Outcome::OUTPUT_OK;
            }
            self.enter(Phase::Reported);
            tracing::debug!(
                case = self.name.as_deref().unwrap_or("<unnamed>"),
                %code,
                outcome = ?comparison.outcome,
                "step did not pass"
            );
            self.sink.cmd_differ(&Mismatch {
                severity: REPORT_DEPTH,
                case_name: self.name.clone(),
                message: options.message.clone(),
                code: code.clone(),
                error: result.err(),
                actual: comparison.actual,
                expected: comparison.expected,
                outcome: comparison.outcome,
            });
        }

        StepRecord {
            code,
            message: options.message,
            output_matched,
            outcome: comparison.outcome,
            passed,
        }
    }

    fn enter(&self, phase: Phase) {
        tracing::trace!(
            case = self.name.as_deref().unwrap_or("<unnamed>"),
            step = self.steps.len(),
            ?phase,
            "entering step phase"
        );
    }
}

// ============================================================================
// SUITE
// ============================================================================

/// Entry point for a suite: holds suite-level configuration and running totals.
pub struct TestFramework<'a, T: ?Sized, S: ?Sized> {
    target: &'a mut T,
    sink: &'a mut S,
    config: Config,
    summary: Summary,
}

impl<'a, T, S> TestFramework<'a, T, S>
where
    T: TargetSystem + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    pub fn new(target: &'a mut T, sink: &'a mut S) -> Self {
        Self {
            target,
            sink,
            config: Config::new(),
            summary: Summary::default(),
        }
    }

    /// Layers suite-level options; applies to cases created afterwards.
    pub fn set_config(&mut self, overrides: &Config) -> &mut Self {
        self.config.merge(overrides);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Runs `body` against a named case.
    pub fn test_case<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: FnOnce(&mut TestCase<'_, T, S>),
    {
        self.run_case(Some(name.into()), body)
    }

    /// Runs `body` against a case with no name.
    pub fn unnamed_case<F>(&mut self, body: F) -> &mut Self
    where
        F: FnOnce(&mut TestCase<'_, T, S>),
    {
        self.run_case(None, body)
    }

    fn run_case<F>(&mut self, name: Option<String>, body: F) -> &mut Self
    where
        F: FnOnce(&mut TestCase<'_, T, S>),
    {
        let mut case = TestCase::new(name, &mut *self.target, &mut *self.sink, &self.config);
        body(&mut case);
        let summary = case.summary();
        tracing::debug!(
            case = case.name().unwrap_or("<unnamed>"),
            passed = summary.passed,
            failed = summary.failed,
            "test case finished"
        );
        self.summary.absorb(summary);
        self
    }
}
