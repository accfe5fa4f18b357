/// Robot model description.
///
/// The model loader hands the engine an ordered joint list (origin transform,
/// axis and limits per joint) plus the tool frame and gripper geometry. It is
/// read once and never changes afterwards.
///
/// The SO-101 numbers come from the arm's URDF: joint origins are given in
/// the parent link frame, rpy follows the fixed-axis convention
/// R = Rz(yaw) * Ry(pitch) * Rx(roll), lengths are metres.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_finite, ConfigError};
use crate::joint_limits::JointLimits;

// Re-export RobotModel from robosim_common for convenience
pub use robosim_common::RobotModel;

/// One revolute joint of the serial chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    /// Rotation axis in the joint's own frame
    pub axis: [f64; 3],
    /// Translation from the parent link frame (m)
    pub origin_xyz: [f64; 3],
    /// Rotation from the parent link frame, roll-pitch-yaw (rad)
    pub origin_rpy: [f64; 3],
    /// Angle limits in degrees
    pub limits: JointLimits,
}

impl JointSpec {
    pub fn new(
        name: &str,
        origin_xyz: [f64; 3],
        origin_rpy: [f64; 3],
        axis: [f64; 3],
        limits: JointLimits,
    ) -> Self {
        Self {
            name: name.to_string(),
            axis,
            origin_xyz,
            origin_rpy,
            limits,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidJoint {
            joint: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        ensure_finite(&self.axis, "axis", invalid)?;
        ensure_finite(&self.origin_xyz, "origin_xyz", invalid)?;
        ensure_finite(&self.origin_rpy, "origin_rpy", invalid)?;
        let norm = self.axis.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm < 1e-9 {
            return Err(invalid("axis must not be the zero vector".to_string()));
        }
        self.limits.validate(&self.name)
    }
}

/// Where the tool sits on the last link.
///
/// Two named frames hang off it: the geometric tip, and the jaw-contact
/// point `jaw_contact_offset` metres further along the approach axis
/// (negative values move back toward the wrist).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFrameSpec {
    pub tip_xyz: [f64; 3],
    pub tip_rpy: [f64; 3],
    /// Approach direction in tip-frame coordinates
    pub approach_axis: [f64; 3],
    pub jaw_contact_offset: f64,
}

impl ToolFrameSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite(&self.tip_xyz, "tip_xyz", ConfigError::InvalidToolFrame)?;
        ensure_finite(&self.tip_rpy, "tip_rpy", ConfigError::InvalidToolFrame)?;
        ensure_finite(&self.approach_axis, "approach_axis", ConfigError::InvalidToolFrame)?;
        ensure_finite(
            &[self.jaw_contact_offset],
            "jaw_contact_offset",
            ConfigError::InvalidToolFrame,
        )?;
        let norm = self.approach_axis.iter().map(|c| c * c).sum::<f64>().sqrt();
        if norm < 1e-9 {
            return Err(ConfigError::InvalidToolFrame(
                "approach_axis must not be the zero vector".to_string(),
            ));
        }
        Ok(())
    }
}

/// Jaw geometry. Aperture 0 % maps to `closed_angle`, 100 % to `open_angle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GripperSpec {
    /// Pivot-to-fingertip length of one jaw (m)
    pub jaw_length: f64,
    /// Jaw half-angle at 0 % aperture (deg)
    pub closed_angle: f64,
    /// Jaw half-angle at 100 % aperture (deg)
    pub open_angle: f64,
}

impl GripperSpec {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite(
            &[self.jaw_length, self.closed_angle, self.open_angle],
            "gripper geometry",
            ConfigError::InvalidGripper,
        )?;
        if self.jaw_length <= 0.0 {
            return Err(ConfigError::InvalidGripper(format!(
                "jaw_length must be positive, got {}",
                self.jaw_length
            )));
        }
        if self.open_angle <= self.closed_angle {
            return Err(ConfigError::InvalidGripper(format!(
                "open_angle {} must exceed closed_angle {}",
                self.open_angle, self.closed_angle
            )));
        }
        Ok(())
    }
}

impl Default for GripperSpec {
    fn default() -> Self {
        Self {
            jaw_length: 0.03,
            closed_angle: -10.0,
            open_angle: 100.0,
        }
    }
}

/// Complete robot model description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub model: RobotModel,
    /// Ordered from base to tool
    pub joints: Vec<JointSpec>,
    pub tool: ToolFrameSpec,
    #[serde(default)]
    pub gripper: GripperSpec,
}

impl RobotConfig {
    /// Create configuration for the SO-101 arm.
    ///
    /// - shoulder_pan: vertical base rotation, +-110 deg
    /// - shoulder_lift / elbow_flex / wrist_flex: pitch joints
    /// - wrist_roll: roll about the approach axis
    /// - gripper: moving jaw, -10..100 deg (handled by the aperture model)
    pub fn so101() -> Self {
        use std::f64::consts::{FRAC_PI_2 as HALF_PI, PI};

        Self {
            model: RobotModel::So101,
            joints: vec![
                JointSpec::new(
                    "shoulder_pan",
                    [0.0388353, 0.0, 0.0624],
                    [PI, 0.0, -PI],
                    [0.0, 0.0, 1.0],
                    JointLimits::from_radians(-1.91986, 1.91986),
                ),
                JointSpec::new(
                    "shoulder_lift",
                    [-0.0303992, -0.0182778, -0.0542],
                    [-HALF_PI, -HALF_PI, 0.0],
                    [0.0, 0.0, 1.0],
                    JointLimits::from_radians(-1.74533, 1.74533),
                ),
                JointSpec::new(
                    "elbow_flex",
                    [-0.11257, -0.028, 0.0],
                    [0.0, 0.0, HALF_PI],
                    [0.0, 0.0, 1.0],
                    JointLimits::from_radians(-1.69, 1.69),
                ),
                JointSpec::new(
                    "wrist_flex",
                    [-0.1349, 0.0052, 0.0],
                    [0.0, 0.0, -HALF_PI],
                    [0.0, 0.0, 1.0],
                    JointLimits::from_radians(-1.65806, 1.65806),
                ),
                JointSpec::new(
                    "wrist_roll",
                    [0.0, -0.0611, 0.0181],
                    [HALF_PI, 0.0486795, PI],
                    [0.0, 0.0, 1.0],
                    JointLimits::from_radians(-2.74385, 2.84121),
                ),
            ],
            tool: ToolFrameSpec {
                tip_xyz: [-0.0079, -0.000218121, -0.0981274],
                tip_rpy: [0.0, PI, 0.0],
                approach_axis: [0.0, 0.0, 1.0],
                jaw_contact_offset: -0.02,
            },
            gripper: GripperSpec::default(),
        }
    }

    /// Create configuration for a specific robot model.
    ///
    /// `Custom` has no built-in geometry and starts from the SO-101 layout;
    /// load a JSON description to replace it.
    pub fn from_model(model: RobotModel) -> Self {
        match model {
            RobotModel::So101 => Self::so101(),
            RobotModel::Custom => Self {
                model: RobotModel::Custom,
                ..Self::so101()
            },
        }
    }

    /// Parse and validate a JSON model description.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RobotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON model description from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject descriptions that would make FK, IK or the gap law undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.joints.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        for (i, joint) in self.joints.iter().enumerate() {
            joint.validate()?;
            if self.joints[..i].iter().any(|other| other.name == joint.name) {
                return Err(ConfigError::InvalidJoint {
                    joint: joint.name.clone(),
                    reason: "duplicate joint name".to_string(),
                });
            }
        }
        self.tool.validate()?;
        self.gripper.validate()
    }

    pub fn joint_names(&self) -> Vec<&str> {
        self.joints.iter().map(|j| j.name.as_str()).collect()
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::so101()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_so101_is_valid() {
        let config = RobotConfig::so101();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.joint_names(),
            vec!["shoulder_pan", "shoulder_lift", "elbow_flex", "wrist_flex", "wrist_roll"]
        );
        assert!((config.joints[0].limits.max - 110.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_jaw_length_is_fatal() {
        let mut config = RobotConfig::so101();
        config.gripper.jaw_length = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGripper(_))));
    }

    #[test]
    fn test_inverted_aperture_range_is_fatal() {
        let mut config = RobotConfig::so101();
        config.gripper.open_angle = -20.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGripper(_))));
    }

    #[test]
    fn test_zero_axis_is_fatal() {
        let mut config = RobotConfig::so101();
        config.joints[2].axis = [0.0, 0.0, 0.0];
        match config.validate() {
            Err(ConfigError::InvalidJoint { joint, .. }) => assert_eq!(joint, "elbow_flex"),
            other => panic!("expected InvalidJoint, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_origin_is_fatal() {
        let mut config = RobotConfig::so101();
        config.joints[1].origin_xyz[0] = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = RobotConfig::so101();
        config.joints[3].name = "elbow_flex".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_chain_rejected() {
        let mut config = RobotConfig::so101();
        config.joints.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyChain));
    }

    #[test]
    fn test_custom_model_keeps_layout() {
        let config = RobotConfig::from_model(RobotModel::Custom);
        assert_eq!(config.model, RobotModel::Custom);
        assert_eq!(config.joints.len(), 5);
    }
}
