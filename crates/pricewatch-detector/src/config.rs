//! Detector configuration.

use crate::error::{DetectorError, DetectorResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Absolute percentage move that counts as significant.
    /// Strict: a move of exactly this size is not flagged.
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: Decimal,
}

fn default_threshold_pct() -> Decimal {
    Decimal::from(2) // 2%
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_pct: default_threshold_pct(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if the threshold is not strictly positive.
    pub fn validate(&self) -> DetectorResult<()> {
        if self.threshold_pct.is_sign_negative() || self.threshold_pct.is_zero() {
            return Err(DetectorError::ConfigError(format!(
                "threshold_pct ({}) must be positive",
                self.threshold_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.threshold_pct, dec!(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        for threshold_pct in [dec!(0), dec!(-1.5)] {
            let config = DetectorConfig { threshold_pct };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("must be positive"));
        }
    }

    #[test]
    fn test_threshold_from_float() {
        let config: DetectorConfig = serde_json::from_str(r#"{"threshold_pct": 2.5}"#).unwrap();
        assert_eq!(config.threshold_pct, dec!(2.5));

        let config: DetectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DetectorConfig::default());
    }
}
