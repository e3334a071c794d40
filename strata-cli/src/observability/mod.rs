//! Logging setup for the `strata` binary.
//!
//! The output format is controlled via `STRATA_LOG_FORMAT`:
//! - `json` - Structured JSON output
//! - `pretty` - Human-readable multi-line output (default for TTY)
//! - `compact` - Compact single-line format (default for non-TTY)
//!
//! Logs go to stderr; reports go to stdout.
//!
//! # Example
//!
//! ```ignore
//! let config = TracingConfig::builder()
//!     .log_format(LogFormat::Json)
//!     .log_filter("strata_core=debug")
//!     .build();
//! let _guard = init_tracing(config)?;
//! ```

mod config;
mod tracing_setup;

pub use config::TracingConfig;
pub use tracing_setup::{TracingGuard, init_tracing};

#[cfg(test)]
mod tests {
    use super::TracingConfig;
    use super::config::LogFormat;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_filter(), "warn");
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert!(config.include_target());
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::builder()
            .log_format(LogFormat::Json)
            .log_filter("strata_core=trace")
            .include_location(true)
            .build();

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "strata_core=trace");
        assert!(config.include_location());
        assert!(!config.include_thread_ids());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = TracingConfig::from_lookup(|key| match key {
            "STRATA_LOG_FORMAT" => Some("json".to_string()),
            "STRATA_LOG_LEVEL" => Some("debug".to_string()),
            "STRATA_LOG_THREAD_IDS" => Some("1".to_string()),
            _ => None,
        });
        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "debug");
        assert!(config.include_thread_ids());
        assert!(!config.include_location());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("anything".parse::<LogFormat>(), Ok(LogFormat::Compact));
    }
}
