//! Self-check harness.
//!
//! Test cases run against a shared arena, each between a checkpoint and a
//! restore, and record their assertions into an arena-backed log. The
//! built-in suites in [`suites`] cover the arena and every collection and
//! back `strata selftest`.
//!
//! # Example
//!
//! ```no_run
//! use strata_core::arena::ArenaConfig;
//! use strata_core::testing::{TestContext, TestSuite};
//!
//! fn pushes(ctx: &mut TestContext<'_>) {
//!     let ptr = ctx.arena().allocate(64);
//!     ctx.assert_true(ptr.is_ok(), "allocation succeeds");
//! }
//!
//! let mut suite = TestSuite::new("sample", ArenaConfig::default())?;
//! suite.add_test("pushes", pushes);
//! let report = suite.run()?;
//! println!("{report}");
//! # Ok::<(), strata_core::StrataError>(())
//! ```

pub mod context;
pub mod counting;
pub mod report;
pub mod suite;
pub mod suites;

pub use context::{Assertion, TestContext};
pub use counting::{CountingPages, PageLedger};
pub use report::{AssertionReport, CaseReport, SuiteReport};
pub use suite::{TestCase, TestSuite};
pub use suites::{SUITE_NAMES, build_suite};
