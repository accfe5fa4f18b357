//! Joint-limit utilities.
//!
//! FK and IK accept any finite angle; keeping commanded angles inside the
//! declared range is the job of the control layer, which uses these helpers.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Closed angle range in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Limits expressed in radians, as found in URDF files.
    pub fn from_radians(min: f64, max: f64) -> Self {
        Self::new(min.to_degrees(), max.to_degrees())
    }

    pub fn clamp(&self, angle: f64) -> f64 {
        if angle.is_nan() {
            return self.min.max(0.0).min(self.max);
        }
        angle.clamp(self.min, self.max)
    }

    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub(crate) fn validate(&self, joint: &str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::InvalidJoint {
                joint: joint.to_string(),
                reason: "limits must be finite".to_string(),
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidJoint {
                joint: joint.to_string(),
                reason: format!("lower limit {} exceeds upper limit {}", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// Clamp an aperture to 0-100 %. Non-finite input is treated as fully closed.
pub fn clamp_aperture(aperture: f64) -> f64 {
    if !aperture.is_finite() {
        return 0.0;
    }
    aperture.clamp(0.0, 100.0)
}

/// Clamp `angles` in place against the matching `limits`.
///
/// Extra angles without a limit entry are left untouched.
pub fn clamp_angles(limits: &[JointLimits], angles: &mut [f64]) {
    for (angle, limit) in angles.iter_mut().zip(limits.iter()) {
        *angle = limit.clamp(*angle);
    }
}
