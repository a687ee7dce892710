//! Bundled diagnostic sinks.
//!
//! [`CollectingSink`] keeps every mismatch for later inspection.
//! [`TerminalReporter`] renders each mismatch as a colored block:
//!
//! ```text
//! insert: Result differs
//! `view.insertText('x')`:
//!   ---------
//!   result:   'ax'
//!   expected: 'xa'
//! ```

use std::io::{self, Write};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::outcome::Outcome;
use crate::target::{DiagnosticSink, Mismatch};

// ============================================================================
// COLLECTING SINK
// ============================================================================

/// Stores mismatches in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub mismatches: Vec<Mismatch>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn cmd_differ(&mut self, mismatch: &Mismatch) {
        self.mismatches.push(mismatch.clone());
    }
}

// ============================================================================
// TERMINAL REPORTER
// ============================================================================

const RULE: &str = "  ---------";
const RESULT_LABEL: &str = "  result:   ";
const ERROR_LABEL: &str = "  error:    ";
const EXPECTED_LABEL: &str = "  expected: ";

/// Writes human-readable mismatch reports to any color-capable writer.
pub struct TerminalReporter<W> {
    out: W,
}

impl TerminalReporter<StandardStream> {
    /// Reports to stderr, colored only when stderr is a terminal.
    pub fn stderr() -> Self {
        let choice = if atty::is(atty::Stream::Stderr) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(StandardStream::stderr(choice))
    }
}

impl<W: WriteColor> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Renders one mismatch block followed by a blank line.
    pub fn render(&mut self, m: &Mismatch) -> io::Result<()> {
        if let Some(name) = &m.case_name {
            write!(self.out, "{name}: ")?;
        }
        self.out.set_color(&error_color())?;
        writeln!(self.out, "{}", m.outcome.headline())?;
        self.out.reset()?;

        self.write_command(&m.code)?;
        if let Some(message) = &m.message {
            self.out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
            writeln!(self.out, "  {message}")?;
            self.out.reset()?;
        }

        if m.outcome.has_comparison() {
            writeln!(self.out, "{RULE}")?;
            self.write_comparison(m)?;
        }

        if m.outcome.has_unexpected_error() {
            writeln!(self.out, "{RULE}")?;
            self.out.set_color(&error_color())?;
            write!(self.out, "  Uncaught exception: ")?;
            match &m.error {
                Some(error) => writeln!(self.out, "{error}")?,
                None => writeln!(self.out)?,
            }
            self.out.reset()?;
        }

        writeln!(self.out)?;
        self.out.flush()
    }

    fn write_command(&mut self, code: &str) -> io::Result<()> {
        self.out.set_color(&error_color())?;
        write!(self.out, "`")?;
        self.out
            .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        write!(self.out, "{code}")?;
        self.out.set_color(&error_color())?;
        write!(self.out, "`")?;
        self.out.reset()?;
        writeln!(self.out, ":")
    }

    fn write_comparison(&mut self, m: &Mismatch) -> io::Result<()> {
        if m.outcome.contains(Outcome::EXPECTED_ERROR_NO_ERROR) {
            self.out.set_color(&error_color())?;
            writeln!(self.out, "  An error is expected, but there is none")?;
            return self.out.reset();
        }
        let label = if m.outcome.contains(Outcome::ERROR_MISMATCH) {
            ERROR_LABEL
        } else {
            RESULT_LABEL
        };
        let changeset = Changeset::new(&m.actual, &m.expected, "");
        write!(self.out, "{label}")?;
        self.write_side(&changeset.diffs, Side::Actual)?;
        write!(self.out, "{EXPECTED_LABEL}")?;
        self.write_side(&changeset.diffs, Side::Expected)
    }

    /// Prints one side of a character diff, highlighting what the other side lacks.
    fn write_side(&mut self, diffs: &[Difference], side: Side) -> io::Result<()> {
        for diff in diffs {
            match (diff, side) {
                (Difference::Same(text), _) => {
                    self.out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                    write!(self.out, "{text}")?;
                }
                (Difference::Rem(text), Side::Actual) | (Difference::Add(text), Side::Expected) => {
                    self.out.set_color(
                        ColorSpec::new()
                            .set_fg(Some(Color::Red))
                            .set_underline(true),
                    )?;
                    write!(self.out, "{text}")?;
                }
                _ => {}
            }
        }
        self.out.reset()?;
        writeln!(self.out)
    }
}

#[derive(Clone, Copy)]
enum Side {
    Actual,
    Expected,
}

fn error_color() -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    spec
}

impl<W: WriteColor> DiagnosticSink for TerminalReporter<W> {
    fn cmd_differ(&mut self, mismatch: &Mismatch) {
        if let Err(error) = self.render(mismatch) {
            tracing::warn!(%error, code = %mismatch.code, "failed to write mismatch report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Thrown;
    use termcolor::NoColor;

    fn mismatch(outcome: Outcome) -> Mismatch {
        Mismatch {
            severity: 1,
            case_name: Some("insert".to_string()),
            message: None,
            code: "view.insertText('x')".to_string(),
            error: None,
            actual: String::new(),
            expected: String::new(),
            outcome,
        }
    }

    fn rendered(m: &Mismatch) -> String {
        let mut reporter = TerminalReporter::new(NoColor::new(Vec::new()));
        reporter.cmd_differ(m);
        String::from_utf8_lossy(&reporter.into_inner().into_inner()).into_owned()
    }

    #[test]
    fn output_only_mismatch_has_no_blocks() {
        let text = rendered(&mismatch(Outcome::NONE));
        assert_eq!(text, "insert: Output differs\n`view.insertText('x')`:\n\n");
    }

    #[test]
    fn result_mismatch_shows_both_sides() {
        let mut m = mismatch(Outcome::OUTPUT_OK | Outcome::RESULT_MISMATCH);
        m.actual = "'ax'".to_string();
        m.expected = "'xa'".to_string();
        let text = rendered(&m);
        assert!(text.starts_with("insert: Result differs\n"));
        assert!(text.contains("  ---------\n  result:   'ax'\n  expected: 'xa'\n"));
        assert!(!text.contains("Uncaught exception"));
    }

    #[test]
    fn error_mismatch_uses_error_label() {
        let mut m = mismatch(Outcome::ERROR_MISMATCH);
        m.actual = "TypeError: boom".to_string();
        m.expected = "Error: boom".to_string();
        let text = rendered(&m);
        assert!(text.starts_with("insert: Output and Result differs\n"));
        assert!(text.contains("  error:    TypeError: boom\n  expected: Error: boom\n"));
    }

    #[test]
    fn missing_error_is_called_out() {
        let text = rendered(&mismatch(Outcome::OUTPUT_OK | Outcome::EXPECTED_ERROR_NO_ERROR));
        assert!(text.contains("  ---------\n  An error is expected, but there is none\n"));
    }

    #[test]
    fn unexpected_error_block_names_the_error() {
        let mut m = mismatch(Outcome::OUTPUT_OK | Outcome::UNEXPECTED_ERROR);
        m.case_name = None;
        m.message = Some("undo after insert".to_string());
        m.error = Some(Thrown::type_error("undo is not a function"));
        let text = rendered(&m);
        assert!(text.starts_with("Result differs\n`view.insertText('x')`:\n  undo after insert\n"));
        assert!(text.contains("  Uncaught exception: TypeError: undo is not a function\n"));
    }

    #[test]
    fn collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.cmd_differ(&mismatch(Outcome::NONE));
        sink.cmd_differ(&mismatch(Outcome::UNEXPECTED_ERROR));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.mismatches[1].outcome, Outcome::UNEXPECTED_ERROR);
    }
}
