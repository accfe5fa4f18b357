//! Conversion between the robot model's native frame and the scene frame.
//!
//! The robot description is authored right-handed Z-up; the host scene is
//! Y-up. A point maps as `(x, y, z)_model -> (x, z, -y)_scene`, which is a
//! -90 degree rotation about X. Poses are converted by change of basis so the
//! identity pose stays the identity in both frames.
//!
//! Conversion happens only where a pose crosses the engine boundary (FK
//! output, IK targets, grasp math on scene objects). Chain composition stays
//! in the native frame.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

/// Stateless native <-> scene frame converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateAdapter;

impl CoordinateAdapter {
    /// Rotation taking native coordinates to scene coordinates.
    fn basis() -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -std::f64::consts::FRAC_PI_2)
    }

    pub fn vector_to_scene(v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(v.x, v.z, -v.y)
    }

    pub fn vector_to_native(v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(v.x, -v.z, v.y)
    }

    pub fn point_to_scene(p: &Point3<f64>) -> Point3<f64> {
        Point3::from(Self::vector_to_scene(&p.coords))
    }

    pub fn point_to_native(p: &Point3<f64>) -> Point3<f64> {
        Point3::from(Self::vector_to_native(&p.coords))
    }

    pub fn rotation_to_scene(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        let c = Self::basis();
        c * q * c.inverse()
    }

    pub fn rotation_to_native(q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        let c = Self::basis();
        c.inverse() * q * c
    }

    pub fn pose_to_scene(iso: &Isometry3<f64>) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(Self::vector_to_scene(&iso.translation.vector)),
            Self::rotation_to_scene(&iso.rotation),
        )
    }

    pub fn pose_to_native(iso: &Isometry3<f64>) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::from(Self::vector_to_native(&iso.translation.vector)),
            Self::rotation_to_native(&iso.rotation),
        )
    }
}
