//! # Configuration
//!
//! Tunables for the orientation engine. Every field has a default, so an
//! empty YAML document is a valid configuration.
//!
//! ```yaml
//! settle_delay_ms: 150
//! default_supported_mask: portrait
//! rotate_for_landscape_presenter: true
//! rotate_for_portrait_sheet: true
//! transient_mask: allButUpsideDown
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OrientError;
use crate::mask::OrientationMask;

/// Longest settle delay accepted. Anything longer than a few rotation
/// animations is a configuration mistake.
pub const MAX_SETTLE_DELAY_MS: u64 = 5_000;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrientConfig {
    /// Delay between rotating a presenter and presenting on top of it, and
    /// between a dismiss and restoring the presenter's orientation. Must
    /// exceed the platform's rotation animation.
    pub settle_delay_ms: u64,

    /// Supported mask given to surfaces that do not declare one.
    pub default_supported_mask: OrientationMask,

    /// Rotate a landscape-only presenter to portrait before presenting a
    /// portrait-only surface on it.
    pub rotate_for_landscape_presenter: bool,

    /// Rotate a presenter that is not in portrait before presenting a
    /// portrait-only, non-full-screen surface on it.
    pub rotate_for_portrait_sheet: bool,

    /// Mask installed on the presenter while a rotate-then-present
    /// transition is in flight.
    pub transient_mask: OrientationMask,
}

impl Default for OrientConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 150,
            default_supported_mask: OrientationMask::PORTRAIT,
            rotate_for_landscape_presenter: true,
            rotate_for_portrait_sheet: true,
            transient_mask: OrientationMask::ALL_BUT_UPSIDE_DOWN,
        }
    }
}

impl OrientConfig {
    /// The settle delay as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, OrientError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, OrientError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Reject values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), OrientError> {
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(OrientError::ConfigValue {
                field: "settle_delay_ms",
                reason: format!("{} exceeds {MAX_SETTLE_DELAY_MS}", self.settle_delay_ms),
            });
        }
        if self.default_supported_mask.is_empty() {
            return Err(OrientError::ConfigValue {
                field: "default_supported_mask",
                reason: "must allow at least one orientation".to_string(),
            });
        }
        if !self.transient_mask.contains(OrientationMask::PORTRAIT) {
            return Err(OrientError::ConfigValue {
                field: "transient_mask",
                reason: "must allow portrait".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OrientConfig::default();
        assert_eq!(config.settle_delay(), Duration::from_millis(150));
        assert_eq!(config.default_supported_mask, OrientationMask::PORTRAIT);
        assert_eq!(config.transient_mask, OrientationMask::ALL_BUT_UPSIDE_DOWN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(OrientConfig::from_yaml_str("").unwrap(), OrientConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = OrientConfig::from_yaml_str(
            "settle_delay_ms: 300\ndefault_supported_mask: allButUpsideDown\n",
        )
        .unwrap();
        assert_eq!(config.settle_delay_ms, 300);
        assert_eq!(config.default_supported_mask, OrientationMask::ALL_BUT_UPSIDE_DOWN);
        assert!(config.rotate_for_portrait_sheet);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            OrientConfig::from_yaml_str("settle_delay: 10\n"),
            Err(OrientError::Config(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(matches!(
            OrientConfig::from_yaml_str("settle_delay_ms: 60000\n"),
            Err(OrientError::ConfigValue { field: "settle_delay_ms", .. })
        ));
        assert!(matches!(
            OrientConfig::from_yaml_str("default_supported_mask: none\n"),
            Err(OrientError::ConfigValue { field: "default_supported_mask", .. })
        ));
        assert!(matches!(
            OrientConfig::from_yaml_str("transient_mask: landscape\n"),
            Err(OrientError::ConfigValue { field: "transient_mask", .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rotate_for_landscape_presenter: false").unwrap();
        let config = OrientConfig::from_path(file.path()).unwrap();
        assert!(!config.rotate_for_landscape_presenter);
    }
}
