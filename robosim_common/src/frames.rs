//! Per-frame outward data for rendering and diagnostics.

use serde::{Deserialize, Serialize};

/// Position + orientation in the scene frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseDto {
    pub position: [f64; 3],
    /// `[x, y, z, w]`
    pub orientation: [f64; 4],
}

impl Default for PoseDto {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Everything the renderer needs to draw the arm for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub frame: u64,
    /// Arm joint angles in degrees, base first
    pub joint_angles: Vec<f64>,
    /// Aperture requested by the control layer (0-100 %)
    pub commanded_aperture: f64,
    /// Aperture after the grasp clamp, i.e. what the jaw should show
    pub effective_aperture: f64,
    /// Jaw half-angle in degrees derived from `effective_aperture`
    pub jaw_angle: f64,
    pub tip: PoseDto,
    pub jaw: PoseDto,
    pub held_body_id: Option<String>,
    pub aperture_constraint: Option<f64>,
}
