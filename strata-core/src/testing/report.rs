//! Suite results.

use serde::Serialize;
use std::fmt;

/// Outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionReport {
    /// What was checked.
    pub name: String,
    /// Whether the check held.
    pub passed: bool,
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case name.
    pub name: String,
    /// True when every assertion held.
    pub passed: bool,
    /// Assertions in the order they were made.
    pub assertions: Vec<AssertionReport>,
}

/// Outcome of a whole suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub suite: String,
    /// Cases in registration order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Number of cases that passed.
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    /// Number of cases that failed.
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// Number of cases run.
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    /// Check if every case passed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

fn verdict(passed: bool) -> &'static str {
    if passed { "PASSED" } else { "FAILED" }
}

/// One line per case; failed cases list every assertion beneath them.
impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for case in &self.cases {
            writeln!(f, "{}::{}: {}", self.suite, case.name, verdict(case.passed))?;
            if !case.passed {
                for assertion in &case.assertions {
                    writeln!(f, "    {}: {}", assertion.name, verdict(assertion.passed))?;
                }
            }
        }
        write!(
            f,
            "{} test(s) passed out of {}",
            self.passed(),
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, results: &[(&str, bool)]) -> CaseReport {
        let assertions: Vec<AssertionReport> = results
            .iter()
            .map(|(name, passed)| AssertionReport {
                name: name.to_string(),
                passed: *passed,
            })
            .collect();
        CaseReport {
            name: name.to_string(),
            passed: assertions.iter().all(|a| a.passed),
            assertions,
        }
    }

    #[test]
    fn counts_and_display() {
        let report = SuiteReport {
            suite: "arena".to_string(),
            cases: vec![
                case("create_arena", &[("check arena size", true)]),
                case(
                    "alloc_memory",
                    &[("check offset", true), ("check next status", false)],
                ),
            ],
        };

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());

        let text = report.to_string();
        assert!(text.contains("arena::create_arena: PASSED"));
        assert!(text.contains("arena::alloc_memory: FAILED"));
        assert!(text.contains("    check next status: FAILED"));
        assert!(!text.contains("check arena size"));
        assert!(text.ends_with("1 test(s) passed out of 2"));
    }

    #[test]
    fn serializes_to_json() {
        let report = SuiteReport {
            suite: "string".to_string(),
            cases: vec![case("copy", &[("same text", true)])],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["suite"], "string");
        assert_eq!(json["cases"][0]["assertions"][0]["passed"], true);
    }
}
