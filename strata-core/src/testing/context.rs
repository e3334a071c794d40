//! Per-case test context.

use super::report::{AssertionReport, CaseReport};
use crate::arena::{ArenaCell, ArenaConfig, PageSource, SystemPages};
use crate::collections::ArenaArray;
use std::fmt::Debug;

/// Assertion slots reserved up front, so short cases do not interleave
/// log growth with their own allocations.
const RESERVED_ASSERTIONS: usize = 32;

/// One recorded assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assertion {
    /// What was checked.
    pub name: &'static str,
    /// Whether the check held.
    pub passed: bool,
}

/// State threaded through a single test case.
///
/// Gives the case its arena and records assertions into an arena-backed
/// log. The suite turns the log into a heap-side [`CaseReport`] before
/// rolling the arena back.
pub struct TestContext<'a, S: PageSource = SystemPages> {
    arena: &'a ArenaCell<S>,
    config: &'a ArenaConfig,
    assertions: ArenaArray<'a, Assertion, S>,
    lost: usize,
    lost_failures: usize,
}

impl<'a, S: PageSource> TestContext<'a, S> {
    /// Create a context over `arena`.
    pub fn new(arena: &'a ArenaCell<S>, config: &'a ArenaConfig) -> Self {
        let mut assertions = ArenaArray::new_in(arena);
        if let Err(e) = assertions.reserve_exact(RESERVED_ASSERTIONS) {
            tracing::warn!(error = %e, "could not reserve the assertion log");
        }
        Self {
            arena,
            config,
            assertions,
            lost: 0,
            lost_failures: 0,
        }
    }

    /// The arena shared by the suite.
    pub fn arena(&self) -> &'a ArenaCell<S> {
        self.arena
    }

    /// Configuration for arenas a case creates for itself.
    pub fn config(&self) -> &'a ArenaConfig {
        self.config
    }

    /// Record that `condition` holds.
    pub fn assert_true(&mut self, condition: bool, name: &'static str) -> bool {
        self.record(name, condition);
        condition
    }

    /// Record that `condition` does not hold.
    pub fn assert_false(&mut self, condition: bool, name: &'static str) -> bool {
        self.record(name, !condition);
        !condition
    }

    /// Record that `left == right`.
    pub fn assert_eq<T: PartialEq + Debug>(&mut self, left: T, right: T, name: &'static str) -> bool {
        let passed = left == right;
        if !passed {
            tracing::debug!(assertion = name, ?left, ?right, "values differ");
        }
        self.record(name, passed);
        passed
    }

    /// Record that `result` is `Ok`, passing the value through.
    pub fn assert_ok<T, E: Debug>(&mut self, result: Result<T, E>, name: &'static str) -> Option<T> {
        match result {
            Ok(value) => {
                self.record(name, true);
                Some(value)
            }
            Err(e) => {
                tracing::debug!(assertion = name, error = ?e, "unexpected error");
                self.record(name, false);
                None
            }
        }
    }

    /// Record that `result` is `Err`.
    pub fn assert_err<T, E>(&mut self, result: Result<T, E>, name: &'static str) -> bool {
        let passed = result.is_err();
        self.record(name, passed);
        passed
    }

    /// Assertions recorded so far.
    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Check if every assertion so far held.
    pub fn passed(&self) -> bool {
        self.lost_failures == 0 && self.assertions.iter().all(|a| a.passed)
    }

    pub(crate) fn record_panic(&mut self) {
        self.record("test case completed without panicking", false);
    }

    /// Copy the log out of the arena.
    pub fn into_report(self, case: &str) -> CaseReport {
        let mut assertions: Vec<AssertionReport> = self
            .assertions
            .iter()
            .map(|a| AssertionReport {
                name: a.name.to_string(),
                passed: a.passed,
            })
            .collect();
        if self.lost > 0 {
            assertions.push(AssertionReport {
                name: format!("{} assertion(s) not recorded, arena exhausted", self.lost),
                passed: self.lost_failures == 0,
            });
        }

        CaseReport {
            name: case.to_string(),
            passed: assertions.iter().all(|a| a.passed),
            assertions,
        }
    }

    fn record(&mut self, name: &'static str, passed: bool) {
        if self.assertions.push(Assertion { name, passed }).is_err() {
            self.lost += 1;
            if !passed {
                self.lost_failures += 1;
            }
        }
    }
}
