use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Knobs for coercion and recursive mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Maximum nesting depth for recursive mapping before failing with
    /// [`StoreError::StructureTooDeep`].
    pub max_depth: usize,
    /// `chrono` format strings tried, in order, when text is coerced to a
    /// date-time. RFC 3339 is always tried last.
    pub datetime_formats: Vec<String>,
    /// When `true`, floats with a fractional part truncate into integer
    /// members instead of failing.
    pub lossy_numeric: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            datetime_formats: vec![
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%d".to_string(),
            ],
            lossy_numeric: false,
        }
    }
}

impl MappingConfig {
    /// A tighter configuration for untrusted input: shallow nesting only.
    pub fn strict() -> Self {
        Self {
            max_depth: 16,
            lossy_numeric: false,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> StoreResult<Self> {
        toml::from_str(input).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// The process-wide default configuration, used by plain store access.
    pub fn shared_default() -> &'static MappingConfig {
        static DEFAULT: OnceLock<MappingConfig> = OnceLock::new();
        DEFAULT.get_or_init(MappingConfig::default)
    }
}
