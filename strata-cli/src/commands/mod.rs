//! CLI command implementations.

pub mod info;
pub mod selftest;
pub mod version;

use anyhow::{Context, Result};
use strata_core::arena::{ArenaConfig, PageBacking};

/// Arena configuration from `STRATA_*` variables, with flag overrides.
pub fn arena_config(heap: bool, page_size: Option<usize>) -> Result<ArenaConfig> {
    let mut config = ArenaConfig::from_env().context("Invalid arena configuration")?;
    if heap {
        config = config.with_backing(PageBacking::Heap);
    }
    if let Some(page_size) = page_size {
        config = config.with_page_size(page_size);
    }
    config.validate().context("Invalid arena configuration")?;
    Ok(config)
}
