//! Graspable objects owned by the host's object manager.

use serde::{Deserialize, Serialize};

/// A body the gripper may pick up.
///
/// The object manager owns the list and refreshes it every frame. The grasp
/// controller only reads it and, for the body it is holding or releasing,
/// writes `position`, `orientation` and `grabbed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraspableBody {
    pub id: String,
    /// World position in metres (scene frame, Y-up)
    pub position: [f64; 3],
    /// World orientation as `[x, y, z, w]`
    pub orientation: [f64; 4],
    /// Width the jaws have to close around, in metres
    pub effective_diameter: f64,
    pub grabbable: bool,
    #[serde(default)]
    pub grabbed: bool,
}

impl GraspableBody {
    /// Create an upright, grabbable body at `position`.
    pub fn new(id: impl Into<String>, position: [f64; 3], effective_diameter: f64) -> Self {
        Self {
            id: id.into(),
            position,
            orientation: [0.0, 0.0, 0.0, 1.0],
            effective_diameter,
            grabbable: true,
            grabbed: false,
        }
    }

    /// Half of the effective diameter.
    pub fn half_extent(&self) -> f64 {
        self.effective_diameter * 0.5
    }

    /// Distance from this body's centre to `point`.
    pub fn distance_to(&self, point: &[f64; 3]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
