//! Engine configuration
//!
//! Every field has a default, so an empty JSON object (or Python dict) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rule::DEFAULT_CACHE_CAPACITY;

/// Log output format for [`crate::logging::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration for a [`crate::RuleEngine`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of distinct rule strings kept in the parse cache (0 disables it)
    pub cache_capacity: usize,
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
