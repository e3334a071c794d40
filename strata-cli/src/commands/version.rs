//! Version command - show version information.

use anyhow::Result;
use strata_core::arena::{NODE_HEADER_SIZE, NODE_VERSION, system_page_size};

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("Strata - Page-backed Region Allocator");
    println!();
    println!("Version:     {}", VERSION);
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!("Page size:   {} bytes", system_page_size());
    println!("Node format: v{} ({}-byte header)", NODE_VERSION, NODE_HEADER_SIZE);
    println!();
    println!("Components:");
    println!("  strata-core  Arena chain, collections, self-check harness");
    println!("  strata-cli   Command-line interface");
    println!();
    println!("Repository: https://github.com/ml-rust/strata");

    Ok(())
}
