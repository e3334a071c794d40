//! Named collections of test cases sharing one arena.

use super::context::TestContext;
use super::report::SuiteReport;
use crate::arena::{Arena, ArenaCell, ArenaConfig, PageSource, SystemPages};
use crate::error::Result;
use std::panic::{self, AssertUnwindSafe};

/// A test case: receives the context, records assertions into it.
pub type TestCase<S = SystemPages> = for<'a> fn(&mut TestContext<'a, S>);

/// Test cases run one after another against a shared arena.
///
/// Each case runs between a checkpoint and a restore, so a case never sees
/// what an earlier one allocated.
pub struct TestSuite<S: PageSource = SystemPages> {
    name: String,
    config: ArenaConfig,
    arena: ArenaCell<S>,
    cases: Vec<(&'static str, TestCase<S>)>,
}

impl TestSuite<SystemPages> {
    /// Create a suite whose shared arena is built from `config`.
    pub fn new(name: impl Into<String>, config: ArenaConfig) -> Result<Self> {
        let arena = Arena::with_config(&config)?;
        Ok(Self::with_arena(name, config, arena))
    }
}

impl<S: PageSource> TestSuite<S> {
    /// Create a suite over an existing arena.
    pub fn with_arena(name: impl Into<String>, config: ArenaConfig, arena: Arena<S>) -> Self {
        Self {
            name: name.into(),
            config,
            arena: ArenaCell::new(arena),
            cases: Vec::new(),
        }
    }

    /// Register a case.
    pub fn add_test(&mut self, name: &'static str, case: TestCase<S>) -> &mut Self {
        self.cases.push((name, case));
        self
    }

    /// Suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered case names.
    pub fn case_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cases.iter().map(|(name, _)| *name)
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check if no cases are registered.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The shared arena.
    pub fn arena(&mut self) -> &mut Arena<S> {
        self.arena.get_mut()
    }

    /// Run every case in registration order.
    ///
    /// A case that panics is reported as failed and the suite carries on.
    /// Errors are only returned when the shared arena itself breaks.
    pub fn run(&mut self) -> Result<SuiteReport> {
        let Self {
            name,
            config,
            arena,
            cases,
        } = self;

        let mut report = SuiteReport {
            suite: name.clone(),
            cases: Vec::with_capacity(cases.len()),
        };

        for (case_name, case) in cases.iter() {
            let checkpoint = arena.get_mut().checkpoint()?;
            tracing::debug!(suite = %name, case = case_name, "running test case");

            let case_report = {
                let mut ctx = TestContext::new(&*arena, &*config);
                if panic::catch_unwind(AssertUnwindSafe(|| case(&mut ctx))).is_err() {
                    ctx.record_panic();
                }
                ctx.into_report(case_name)
            };

            arena.get_mut().restore(checkpoint)?;

            if case_report.passed {
                tracing::info!(suite = %name, case = case_name, "test case passed");
            } else {
                let failed = case_report.assertions.iter().filter(|a| !a.passed).count();
                tracing::warn!(suite = %name, case = case_name, failed, "test case failed");
            }
            report.cases.push(case_report);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::HeapPages;

    fn suite() -> TestSuite<HeapPages> {
        let arena = Arena::with_source(HeapPages::with_page_size(4096).unwrap()).unwrap();
        TestSuite::with_arena("sample", ArenaConfig::default(), arena)
    }

    fn allocates(ctx: &mut TestContext<'_, HeapPages>) {
        let ptr = ctx.arena().allocate(1000);
        ctx.assert_true(ptr.is_ok(), "allocation succeeds");
    }

    fn fails(ctx: &mut TestContext<'_, HeapPages>) {
        ctx.assert_eq(1, 2, "one is two");
    }

    fn panics(_ctx: &mut TestContext<'_, HeapPages>) {
        panic!("boom");
    }

    #[test]
    fn runs_cases_in_isolation() {
        let mut suite = suite();
        suite
            .add_test("first", allocates)
            .add_test("second", allocates)
            .add_test("fails", fails)
            .add_test("panics", panics);
        assert_eq!(suite.len(), 4);
        assert_eq!(
            suite.case_names().collect::<Vec<_>>(),
            vec!["first", "second", "fails", "panics"]
        );

        let report = suite.run().unwrap();
        assert_eq!(report.suite, "sample");
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 2);
        assert!(!report.cases[3].passed);

        let arena = suite.arena();
        assert_eq!(arena.stats().bytes_in_use, 0);
        assert_eq!(arena.cursor().map(|id| id.index()), Some(0));
    }
}
