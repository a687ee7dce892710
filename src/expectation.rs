//! # Step Expectations
//!
//! What a step asserts about the value its command returns or the error it
//! raises. Expectations arrive either strongly typed or as a loose options
//! mapping (`{message, error, result}`); loose shapes that carry no usable
//! assertion degrade to [`Expectation::None`] instead of failing the harness.

use crate::serialize::to_display_string;
use crate::value::{MapRef, Value};

/// The tagged assertion attached to a step.
#[derive(Debug, Clone, Default)]
pub enum Expectation {
    /// No assertion on the value or error.
    #[default]
    None,
    /// Any error is acceptable; returning normally is a failure.
    MustError,
    /// The raised error's textual form must equal this text.
    MustErrorMatching(String),
    /// The returned value must canonicalize to the same text as this one.
    MustEqual(Value),
}

impl Expectation {
    pub fn result(value: impl Into<Value>) -> Self {
        Expectation::MustEqual(value.into())
    }

    pub fn error() -> Self {
        Expectation::MustError
    }

    pub fn error_matching(text: impl Into<String>) -> Self {
        Expectation::MustErrorMatching(text.into())
    }

    /// Reads the `error` and `result` members of an options mapping.
    ///
    /// A truthy `error` wins over `result`: `true` means any error, anything
    /// else is the text the error must match. A falsy `error` falls through to
    /// `result`, whose mere presence (even as `undefined`) makes it an equality check.
    pub fn from_options(options: &MapRef) -> Self {
        if let Some(error) = options.get("error").filter(Value::is_truthy) {
            return match error {
                Value::Bool(true) => Expectation::MustError,
                Value::Text(text) => Expectation::MustErrorMatching(text),
                other => Expectation::MustErrorMatching(to_display_string(&other)),
            };
        }
        match options.get("result") {
            Some(value) => Expectation::MustEqual(value),
            None => Expectation::None,
        }
    }
}

/// Per-step options: an optional description plus the expectation.
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    pub message: Option<String>,
    pub expectation: Expectation,
}

impl StepOptions {
    pub fn new(message: impl Into<String>, expectation: Expectation) -> Self {
        Self {
            message: Some(message.into()),
            expectation,
        }
    }
}

impl From<&str> for StepOptions {
    fn from(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            expectation: Expectation::None,
        }
    }
}

impl From<String> for StepOptions {
    fn from(message: String) -> Self {
        Self {
            message: Some(message),
            expectation: Expectation::None,
        }
    }
}

impl From<Expectation> for StepOptions {
    fn from(expectation: Expectation) -> Self {
        Self {
            message: None,
            expectation,
        }
    }
}

/// A text is a description; a mapping is `{message?, error?, result?}`;
/// anything else carries no options at all.
impl From<Value> for StepOptions {
    fn from(value: Value) -> Self {
        match value {
            Value::Text(message) => message.into(),
            Value::Map(options) => Self {
                message: options
                    .get("message")
                    .and_then(|m| m.as_text().map(str::to_string)),
                expectation: Expectation::from_options(&options),
            },
            _ => Self::default(),
        }
    }
}
