use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::grasp::GraspConfig;
use crate::ik::IkConfig;
use crate::robot_config::RobotConfig;

/// Robot description plus grasp and IK tuning.
///
/// Every section is optional in JSON and falls back to the SO-101 defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub robot: RobotConfig,
    pub grasp: GraspConfig,
    pub ik: IkConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.robot.validate()?;
        self.grasp.validate()?;
        self.ik.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = SimConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_partial_sections_override_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "grasp": { "release_margin": 20.0 }, "ik": { "base_mode": "Search" } }"#,
        )
        .unwrap();
        assert_eq!(config.grasp.release_margin, 20.0);
        assert_eq!(config.grasp.detection_radius, 0.04);
        assert_eq!(config.ik.base_mode, crate::ik::BaseMode::Search);
        assert_eq!(config.ik.tolerance, 0.005);
    }

    #[test]
    fn test_invalid_section_is_rejected() {
        let err = SimConfig::from_json_str(r#"{ "ik": { "tolerance": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIk(_)), "got {:?}", err);

        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SimConfig::from_file("/nonexistent/robosim.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
