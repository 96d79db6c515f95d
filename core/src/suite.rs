//! Suites of independent expectation checks.
//!
//! A `Case` pairs one `ApiCall` with the `error_code` it should produce. A
//! `Suite` runs its cases in order through `ApiClient::report_outcome`; a
//! failing case never stops the ones after it.

use crate::client::{ApiCall, ApiClient};
use crate::http::Transport;
use crate::report::SuiteReport;

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub call: ApiCall,
    pub expected: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suite {
    name: String,
    cases: Vec<Case>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Append a case expecting `expected` as the response's `error_code`.
    pub fn case(mut self, call: ApiCall, expected: i64) -> Self {
        self.cases.push(Case { call, expected });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn run<T: Transport>(&self, client: &ApiClient<T>) -> SuiteReport {
        tracing::info!(suite = %self.name, cases = self.cases.len(), "running suite");
        let mut report = SuiteReport::new();
        for case in &self.cases {
            report.record(client.report_outcome(&case.call, case.expected));
        }
        report
    }
}
