//! Conversions between scene DTOs and nalgebra geometric types.
//!
//! Enabled with the `nalgebra-support` feature:
//!
//! ```toml
//! [dependencies]
//! robosim_common = { version = "0.1", features = ["nalgebra-support"] }
//! ```
//!
//! # Notes
//!
//! - Quaternions travel as `[x, y, z, w]`; nalgebra stores them as `(w, i, j, k)`
//! - A zero-norm quaternion decodes as identity instead of producing NaNs

#[cfg(feature = "nalgebra-support")]
use crate::{GraspableBody, PoseDto};

#[cfg(feature = "nalgebra-support")]
use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};

/// Decode an `[x, y, z, w]` array into a unit quaternion.
#[cfg(feature = "nalgebra-support")]
pub fn quaternion_from_array(q: &[f64; 4]) -> UnitQuaternion<f64> {
    let raw = Quaternion::new(q[3], q[0], q[1], q[2]);
    let norm = raw.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return UnitQuaternion::identity();
    }
    UnitQuaternion::from_quaternion(raw)
}

/// Encode a unit quaternion as `[x, y, z, w]`.
#[cfg(feature = "nalgebra-support")]
pub fn quaternion_to_array(q: &UnitQuaternion<f64>) -> [f64; 4] {
    [q.i, q.j, q.k, q.w]
}

#[cfg(feature = "nalgebra-support")]
impl From<PoseDto> for Isometry3<f64> {
    fn from(pose: PoseDto) -> Self {
        let translation = Translation3::new(pose.position[0], pose.position[1], pose.position[2]);
        Isometry3::from_parts(translation, quaternion_from_array(&pose.orientation))
    }
}

#[cfg(feature = "nalgebra-support")]
impl From<&PoseDto> for Isometry3<f64> {
    fn from(pose: &PoseDto) -> Self {
        (*pose).into()
    }
}

#[cfg(feature = "nalgebra-support")]
impl From<Isometry3<f64>> for PoseDto {
    fn from(iso: Isometry3<f64>) -> Self {
        PoseDto {
            position: [iso.translation.x, iso.translation.y, iso.translation.z],
            orientation: quaternion_to_array(&iso.rotation),
        }
    }
}

#[cfg(feature = "nalgebra-support")]
impl GraspableBody {
    /// World pose of the body (scene frame).
    pub fn isometry(&self) -> Isometry3<f64> {
        PoseDto {
            position: self.position,
            orientation: self.orientation,
        }
        .into()
    }

    /// Overwrite position and orientation from a world pose.
    pub fn set_isometry(&mut self, iso: &Isometry3<f64>) {
        let pose = PoseDto::from(*iso);
        self.position = pose.position;
        self.orientation = pose.orientation;
    }
}
