//! Configuration for the factorizations
//!
//! All structs implement `Default` and round-trip through JSON so they can be
//! embedded in larger application configs.

use crate::pivot::ColumnPivotStrategy;
use serde::{Deserialize, Serialize};

/// QR factorization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrConfig {
    /// Column pivoting rule applied before each Householder step
    /// (`None` disables column pivoting)
    #[serde(default = "default_column_pivot")]
    pub column_pivot: Option<ColumnPivotStrategy>,
}

fn default_column_pivot() -> Option<ColumnPivotStrategy> {
    Some(ColumnPivotStrategy::MaxNorm)
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            column_pivot: default_column_pivot(),
        }
    }
}

/// Pivoted LU update configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuUpdateConfig {
    /// Interchange two rows when the current pivot is smaller than this
    /// fraction of the pivot the interchange would produce
    #[serde(default = "default_stability_threshold")]
    pub stability_threshold: f64,
}

fn default_stability_threshold() -> f64 {
    0.1
}

impl Default for LuUpdateConfig {
    fn default() -> Self {
        Self {
            stability_threshold: default_stability_threshold(),
        }
    }
}

/// Complete decomposition configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    /// QR settings
    #[serde(default)]
    pub qr: QrConfig,
    /// Pivoted LU update settings
    #[serde(default)]
    pub lu_update: LuUpdateConfig,
}

impl DecompositionConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON: {}", e))
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecompositionConfig::default();
        assert_eq!(config.qr.column_pivot, Some(ColumnPivotStrategy::MaxNorm));
        assert_eq!(config.lu_update.stability_threshold, 0.1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DecompositionConfig::from_json(r#"{ "qr": { "column_pivot": null } }"#)
            .expect("config should parse");
        assert_eq!(config.qr.column_pivot, None);
        assert_eq!(config.lu_update, LuUpdateConfig::default());

        let config = DecompositionConfig::from_json("{}").expect("empty config should parse");
        assert_eq!(config, DecompositionConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = DecompositionConfig {
            qr: QrConfig {
                column_pivot: Some(ColumnPivotStrategy::NonZeroElement),
            },
            lu_update: LuUpdateConfig {
                stability_threshold: 0.25,
            },
        };
        let json = config.to_json().expect("config should serialize");
        assert!(json.contains("non_zero_element"));
        assert_eq!(DecompositionConfig::from_json(&json), Ok(config));
    }

    #[test]
    fn test_invalid_json() {
        let err = DecompositionConfig::from_json("{ \"qr\": 3 }").unwrap_err();
        assert!(err.starts_with("Failed to parse JSON"));
    }
}
