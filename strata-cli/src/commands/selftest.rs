//! Selftest command - run the built-in suites.

use anyhow::{Context, Result, bail};
use strata_core::arena::ArenaConfig;
use strata_core::testing::{SUITE_NAMES, SuiteReport, build_suite};

/// Run the selected suites. Returns whether every case passed.
pub fn run(suite: Option<&str>, config: &ArenaConfig, json: bool) -> Result<bool> {
    let names: Vec<&str> = match suite {
        Some(name) if SUITE_NAMES.contains(&name) => vec![name],
        Some(name) => bail!(
            "Unknown suite '{}'; expected one of: {}",
            name,
            SUITE_NAMES.join(", ")
        ),
        None => SUITE_NAMES.to_vec(),
    };

    tracing::info!(suites = ?names, backing = %config.backing, "Running self-check");

    let mut reports: Vec<SuiteReport> = Vec::with_capacity(names.len());
    for name in names {
        let Some(built) = build_suite(name, config) else {
            bail!("Unknown suite '{}'", name);
        };
        let mut suite = built.with_context(|| format!("Failed to create arena for suite {name}"))?;
        let report = suite
            .run()
            .with_context(|| format!("Suite {name} corrupted its arena"))?;
        reports.push(report);
    }

    let passed: usize = reports.iter().map(SuiteReport::passed).sum();
    let total: usize = reports.iter().map(SuiteReport::total).sum();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}");
            println!();
        }
        println!("Total: {passed} test(s) passed out of {total}");
    }

    Ok(passed == total)
}
