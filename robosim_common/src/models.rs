//! Robot model definitions.

use serde::{Deserialize, Serialize};

/// Robot model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RobotModel {
    /// SO-101: 5-DOF desktop arm with a single moving jaw
    #[default]
    So101,
    /// Arbitrary serial chain loaded from a JSON description
    Custom,
}

impl RobotModel {
    /// Get all available robot models.
    pub fn all() -> Vec<RobotModel> {
        vec![RobotModel::So101, RobotModel::Custom]
    }

    /// Get the display name for this robot model.
    pub fn display_name(&self) -> &'static str {
        match self {
            RobotModel::So101 => "SO-101 (5 DOF + gripper)",
            RobotModel::Custom => "Custom chain",
        }
    }

    /// Get the short name for this robot model.
    pub fn short_name(&self) -> &'static str {
        match self {
            RobotModel::So101 => "SO-101",
            RobotModel::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for RobotModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for RobotModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SO-101" | "SO101" | "SO_101" => Ok(RobotModel::So101),
            "CUSTOM" => Ok(RobotModel::Custom),
            _ => Err(format!("Unknown robot model: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_names() {
        assert_eq!("so-101".parse::<RobotModel>(), Ok(RobotModel::So101));
        assert_eq!("SO101".parse::<RobotModel>(), Ok(RobotModel::So101));
        assert_eq!("custom".parse::<RobotModel>(), Ok(RobotModel::Custom));
        assert!("ur5".parse::<RobotModel>().is_err());
    }

    #[test]
    fn test_display_uses_short_name() {
        for model in RobotModel::all() {
            assert_eq!(model.to_string(), model.short_name());
        }
    }
}
