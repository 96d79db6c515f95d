//! Pass/fail outcomes and their aggregation into a process exit code.

use std::fmt;

/// Result of one compared call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub passed: bool,
    pub description: String,
}

impl Outcome {
    pub fn new(passed: bool, description: impl Into<String>) -> Self {
        Self {
            passed,
            description: description.into(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASSED" } else { "FAIL" };
        write!(f, "[{status}]: {}", self.description)
    }
}

/// Outcomes of one or more suites, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteReport {
    outcomes: Vec<Outcome>,
}

impl SuiteReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn merge(&mut self, other: SuiteReport) {
        self.outcomes.extend(other.outcomes);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// 0 when every recorded case passed (including an empty report), 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.failed() == 0 {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed(),
            self.failed(),
            self.outcomes.len()
        )
    }
}
