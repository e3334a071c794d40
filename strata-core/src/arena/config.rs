//! Arena configuration.

use super::pages::validate_page_size;
use crate::error::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable selecting the page backing.
pub const ENV_BACKING: &str = "STRATA_BACKING";
/// Environment variable overriding the page size.
pub const ENV_PAGE_SIZE: &str = "STRATA_PAGE_SIZE";
/// Environment variable capping the bytes an arena may hold.
pub const ENV_MAX_BYTES: &str = "STRATA_MAX_BYTES";

/// Where node blocks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageBacking {
    /// Anonymous private mappings.
    #[default]
    Mapped,
    /// The global heap allocator.
    Heap,
}

impl FromStr for PageBacking {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mapped" | "mmap" => Ok(Self::Mapped),
            "heap" | "malloc" => Ok(Self::Heap),
            other => Err(StrataError::ConfigValue {
                key: ENV_BACKING.to_string(),
                value: other.to_string(),
                cause: "expected 'mapped' or 'heap'".to_string(),
            }),
        }
    }
}

impl fmt::Display for PageBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapped => write!(f, "mapped"),
            Self::Heap => write!(f, "heap"),
        }
    }
}

/// Configuration for arena creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Page backing for new nodes.
    pub backing: PageBacking,
    /// Page size override; the platform page size when `None`.
    pub page_size: Option<usize>,
    /// Cap on the total block bytes the chain may hold.
    pub max_bytes: Option<u64>,
}

impl ArenaConfig {
    /// Create config with the given backing.
    pub fn with_backing(mut self, backing: PageBacking) -> Self {
        self.backing = backing;
        self
    }

    /// Create config with a page size override.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Create config with a byte budget.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Create configuration from environment variables.
    ///
    /// - `STRATA_BACKING`: "mapped" or "heap"
    /// - `STRATA_PAGE_SIZE`: page size in bytes
    /// - `STRATA_MAX_BYTES`: byte budget for all blocks
    ///
    /// Unset variables keep their defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BACKING) {
            config.backing = value.parse()?;
        }
        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            config.page_size = Some(parse_number(ENV_PAGE_SIZE, &value)?);
        }
        if let Some(value) = lookup(ENV_MAX_BYTES) {
            config.max_bytes = Some(parse_number(ENV_MAX_BYTES, &value)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values no arena can work with.
    pub fn validate(&self) -> Result<()> {
        if let Some(page_size) = self.page_size {
            validate_page_size(page_size)?;
        }
        if self.max_bytes == Some(0) {
            return Err(StrataError::ConfigValue {
                key: "max_bytes".to_string(),
                value: "0".to_string(),
                cause: "the head node alone needs at least one page".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| StrataError::ConfigValue {
            key: key.to_string(),
            value: value.to_string(),
            cause: e.to_string(),
        })
}
