//! # Outcome Codes
//!
//! A step's outcome is a small set of flags closed under union. An empty set
//! means no deviation was detected. Specific deviations carry
//! [`Outcome::HAS_COMPARISON`] when there is a result or error text worth
//! showing next to its expectation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Outcome(u8);

const OUTPUT_OK_BIT: u8 = 1 << 0;
const COMPARISON_BIT: u8 = 1 << 1;
const EXPECTED_ERROR_BIT: u8 = 1 << 2;
const UNEXPECTED_ERROR_BIT: u8 = 1 << 3;
const RESULT_MISMATCH_BIT: u8 = 1 << 4;
const ERROR_MISMATCH_BIT: u8 = 1 << 5;

impl Outcome {
    /// No deviation.
    pub const NONE: Outcome = Outcome(0);
    /// The target's output state matched. Folded in by the controller only.
    pub const OUTPUT_OK: Outcome = Outcome(OUTPUT_OK_BIT);
    pub const HAS_COMPARISON: Outcome = Outcome(COMPARISON_BIT);
    /// An error was required but the command returned normally.
    pub const EXPECTED_ERROR_NO_ERROR: Outcome = Outcome(EXPECTED_ERROR_BIT | COMPARISON_BIT);
    /// The command raised although the expectation took no stance on errors.
    pub const UNEXPECTED_ERROR: Outcome = Outcome(UNEXPECTED_ERROR_BIT);
    pub const RESULT_MISMATCH: Outcome = Outcome(RESULT_MISMATCH_BIT | COMPARISON_BIT);
    pub const ERROR_MISMATCH: Outcome = Outcome(ERROR_MISMATCH_BIT | COMPARISON_BIT);

    const NAMED: [(&'static str, u8); 6] = [
        ("OUTPUT_OK", OUTPUT_OK_BIT),
        ("HAS_COMPARISON", COMPARISON_BIT),
        ("EXPECTED_ERROR_NO_ERROR", EXPECTED_ERROR_BIT),
        ("UNEXPECTED_ERROR", UNEXPECTED_ERROR_BIT),
        ("RESULT_MISMATCH", RESULT_MISMATCH_BIT),
        ("ERROR_MISMATCH", ERROR_MISMATCH_BIT),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    /// True when every flag of `other` is set in `self`.
    pub fn contains(self, other: Outcome) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_clean(self) -> bool {
        self.0 == 0
    }

    pub fn output_ok(self) -> bool {
        self.contains(Self::OUTPUT_OK)
    }

    pub fn has_comparison(self) -> bool {
        self.contains(Self::HAS_COMPARISON)
    }

    pub fn has_unexpected_error(self) -> bool {
        self.contains(Self::UNEXPECTED_ERROR)
    }

    /// True when the returned value or raised error deviates from its expectation.
    pub fn has_result_deviation(self) -> bool {
        self.0 & (COMPARISON_BIT | UNEXPECTED_ERROR_BIT) != 0
    }

    /// One-line summary of what went wrong, for a step that was reported.
    pub fn headline(self) -> &'static str {
        match (self.output_ok(), self.has_result_deviation()) {
            (false, true) => "Output and Result differs",
            (true, true) => "Result differs",
            (_, false) => "Output differs",
        }
    }
}

impl BitOr for Outcome {
    type Output = Outcome;

    fn bitor(self, rhs: Outcome) -> Outcome {
        Outcome(self.0 | rhs.0)
    }
}

impl BitOrAssign for Outcome {
    fn bitor_assign(&mut self, rhs: Outcome) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "Outcome(NONE)");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(_, bit)| self.0 & bit != 0)
            .map(|(name, _)| *name)
            .collect();
        write!(f, "Outcome({})", names.join(" | "))
    }
}
