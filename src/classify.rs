//! # Result Classifier
//!
//! Compares what a command actually did (returned a value or raised an error)
//! against the step's [`Expectation`] and produces an [`Outcome`] plus the two
//! normalized texts a reporter shows side by side.
//!
//! The output-state flag ([`Outcome::OUTPUT_OK`]) is not decided here; the
//! controller folds it in after asking the target system.

use crate::error::Thrown;
use crate::expectation::Expectation;
use crate::outcome::Outcome;
use crate::serialize::to_comparable_string;
use crate::value::Value;

/// Classifier verdict for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Canonical text of what happened (value or error form); empty when not compared.
    pub actual: String,
    /// Canonical text of what was expected; empty when not compared.
    pub expected: String,
    pub outcome: Outcome,
}

impl Comparison {
    fn flag(outcome: Outcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }
}

/// Classifies an invocation result against an expectation.
///
/// # Examples
///
/// ```rust
/// use cmdcheck::{classify, Expectation, Outcome, Value};
/// let c = classify(&Expectation::result(3), &Ok(Value::from(4)));
/// assert!(c.outcome.contains(Outcome::RESULT_MISMATCH));
/// assert_eq!((c.actual.as_str(), c.expected.as_str()), ("4", "3"));
/// ```
pub fn classify(expectation: &Expectation, result: &Result<Value, Thrown>) -> Comparison {
    let raised = result.is_err();
    match expectation {
        Expectation::None => Comparison::flag(unexpected_error_if(raised)),
        Expectation::MustError if raised => Comparison::default(),
        Expectation::MustError => Comparison::flag(Outcome::EXPECTED_ERROR_NO_ERROR),
        Expectation::MustErrorMatching(text) => {
            // returning normally can never match an expected error text
            let (actual, outcome) = match result {
                Err(error) => {
                    let actual = error.to_string();
                    let outcome = if actual == *text {
                        Outcome::NONE
                    } else {
                        Outcome::ERROR_MISMATCH
                    };
                    (actual, outcome)
                }
                Ok(_) => (String::new(), Outcome::ERROR_MISMATCH),
            };
            Comparison {
                actual,
                expected: text.clone(),
                outcome,
            }
        }
        Expectation::MustEqual(expected) => {
            let actual = match result {
                Ok(value) => to_comparable_string(value),
                Err(_) => to_comparable_string(&Value::Undefined),
            };
            let expected = to_comparable_string(expected);
            let mut outcome = unexpected_error_if(raised);
            if actual != expected {
                outcome |= Outcome::RESULT_MISMATCH;
            }
            Comparison {
                actual,
                expected,
                outcome,
            }
        }
    }
}

fn unexpected_error_if(raised: bool) -> Outcome {
    if raised {
        Outcome::UNEXPECTED_ERROR
    } else {
        Outcome::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boom() -> Result<Value, Thrown> {
        Err(Thrown::error("boom"))
    }

    #[test]
    fn no_expectation_passes_on_value() {
        let c = classify(&Expectation::None, &Ok(Value::from(5)));
        assert_eq!(c, Comparison::default());
    }

    #[test]
    fn no_expectation_flags_raised_error() {
        let c = classify(&Expectation::None, &boom());
        assert_eq!(c.outcome, Outcome::UNEXPECTED_ERROR);
        assert!(c.actual.is_empty() && c.expected.is_empty());
    }

    #[test]
    fn must_error_accepts_any_error() {
        let c = classify(&Expectation::MustError, &boom());
        assert!(c.outcome.is_clean());
    }

    #[test]
    fn must_error_without_error_is_flagged() {
        let c = classify(&Expectation::MustError, &Ok(Value::from(5)));
        assert!(c.outcome.contains(Outcome::EXPECTED_ERROR_NO_ERROR));
        assert!(c.actual.is_empty() && c.expected.is_empty());
    }

    #[test]
    fn error_text_is_compared_exactly() {
        let ok = classify(&Expectation::error_matching("Error: boom"), &boom());
        assert!(ok.outcome.is_clean());
        assert_eq!(ok.actual, "Error: boom");

        let bad = classify(&Expectation::error_matching("Error: bang"), &boom());
        assert_eq!(bad.outcome, Outcome::ERROR_MISMATCH);
        assert_eq!(bad.actual, "Error: boom");
        assert_eq!(bad.expected, "Error: bang");
    }

    #[test]
    fn error_text_without_error_never_matches() {
        let c = classify(&Expectation::error_matching(""), &Ok(Value::Undefined));
        assert_eq!(c.outcome, Outcome::ERROR_MISMATCH);
        assert_eq!(c.actual, "");
    }

    #[test]
    fn equality_ignores_key_order() {
        let expected = Value::map([
            ("x", Value::from(1)),
            ("y", Value::list([Value::from(1), Value::from(2)])),
        ]);
        let actual = Value::map([
            ("y", Value::list([Value::from(1), Value::from(2)])),
            ("x", Value::from(1)),
        ]);
        let c = classify(&Expectation::MustEqual(expected), &Ok(actual));
        assert!(c.outcome.is_clean());
        assert_eq!(c.actual, "{x: 1, y: [1, 2]}");
    }

    #[test]
    fn result_mismatch_reports_canonical_texts() {
        let c = classify(&Expectation::result(3), &Ok(Value::from(4)));
        assert!(c.outcome.contains(Outcome::RESULT_MISMATCH));
        assert_eq!(c.actual, "4");
        assert_eq!(c.expected, "3");
    }

    #[test]
    fn error_while_expecting_value_combines_flags() {
        let c = classify(&Expectation::result("abc"), &boom());
        assert!(c.outcome.contains(Outcome::UNEXPECTED_ERROR));
        assert!(c.outcome.contains(Outcome::RESULT_MISMATCH));
        assert_eq!(c.actual, "undefined");

        let undefined_expected = classify(&Expectation::result(Value::Undefined), &boom());
        assert_eq!(undefined_expected.outcome, Outcome::UNEXPECTED_ERROR);
    }
}
