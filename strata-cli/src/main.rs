//! Strata CLI - self-check and inspection tool for strata arenas.

mod commands;
mod observability;

use anyhow::Result;
use clap::{Parser, Subcommand};
use observability::{TracingConfig, init_tracing};

/// Strata - page-backed region allocator.
#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in self-check suites
    Selftest {
        /// Run only this suite (arena, array, buffer, string)
        #[arg(short, long)]
        suite: Option<String>,

        /// Draw pages from the heap instead of anonymous mappings
        #[arg(long)]
        heap: bool,

        /// Page size override in bytes
        #[arg(short, long)]
        page_size: Option<usize>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show page geometry and a sample chain
    Info {
        /// Draw pages from the heap instead of anonymous mappings
        #[arg(long)]
        heap: bool,

        /// Page size override in bytes
        #[arg(short, long)]
        page_size: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<observability::TracingGuard> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // STRATA_LOG_FORMAT and friends, with the level from -v unless
    // STRATA_LOG_LEVEL or RUST_LOG is set
    let from_env = TracingConfig::from_env();
    let explicit_filter =
        std::env::var_os("STRATA_LOG_LEVEL").is_some() || std::env::var_os("RUST_LOG").is_some();
    let log_filter = if explicit_filter {
        from_env.log_filter().to_string()
    } else {
        filter.to_string()
    };

    let config = TracingConfig::builder()
        .log_format(from_env.log_format())
        .log_filter(log_filter)
        .include_location(from_env.include_location())
        .include_thread_ids(from_env.include_thread_ids())
        .build();

    init_tracing(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _tracing_guard = setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Selftest {
            suite,
            heap,
            page_size,
            json,
        } => {
            let config = commands::arena_config(heap, page_size)?;
            let passed = commands::selftest::run(suite.as_deref(), &config, json)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Info {
            heap,
            page_size,
            json,
        } => {
            let config = commands::arena_config(heap, page_size)?;
            commands::info::run(&config, json)
        }
        Commands::Version => commands::version::run(),
    }
}
