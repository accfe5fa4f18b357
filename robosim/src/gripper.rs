//! Jaw aperture model.
//!
//! Aperture is stored as 0-100 % and maps linearly onto the jaw half-angle
//! range of the gripper. The gap between the jaw tips follows
//! `gap = 2 * jaw_length * sin(half_angle)`.
//!
//! This mapping is shared by the renderer (jaw angle) and by every grasp
//! threshold, so the visible grip and the logical grasp state cannot drift
//! apart.

use crate::errors::ConfigError;
use crate::joint_limits::clamp_aperture;
use crate::robot_config::GripperSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct ApertureModel {
    jaw_length: f64,
    closed_angle: f64,
    open_angle: f64,
}

impl ApertureModel {
    /// Build the model, rejecting geometry that leaves the gap law undefined.
    pub fn from_spec(spec: &GripperSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Self {
            jaw_length: spec.jaw_length,
            closed_angle: spec.closed_angle,
            open_angle: spec.open_angle,
        })
    }

    /// Jaw half-angle in degrees for an aperture percentage.
    pub fn angle_for_aperture(&self, aperture: f64) -> f64 {
        let t = clamp_aperture(aperture) / 100.0;
        self.closed_angle + (self.open_angle - self.closed_angle) * t
    }

    /// Aperture percentage for a jaw half-angle, clamped to 0-100.
    pub fn aperture_for_angle(&self, angle: f64) -> f64 {
        let pct = (angle - self.closed_angle) / (self.open_angle - self.closed_angle) * 100.0;
        clamp_aperture(pct)
    }

    /// Tip-to-tip gap in metres at a jaw half-angle.
    pub fn gap_at_angle(&self, angle: f64) -> f64 {
        2.0 * self.jaw_length * angle.to_radians().sin()
    }

    pub fn gap_for_aperture(&self, aperture: f64) -> f64 {
        self.gap_at_angle(self.angle_for_aperture(aperture))
    }

    /// Widest gap reachable inside the angle range.
    pub fn max_gap(&self) -> f64 {
        let peak = if self.closed_angle <= 90.0 && self.open_angle >= 90.0 {
            90.0
        } else {
            self.open_angle
        };
        self.gap_at_angle(peak).max(self.gap_at_angle(self.closed_angle))
    }

    /// Whether the jaws can open wide enough to close on a body.
    pub fn fits(&self, diameter: f64, target_gap_fraction: f64) -> bool {
        diameter.is_finite() && diameter * target_gap_fraction <= self.max_gap()
    }

    /// Smallest aperture that does not crush a body of `diameter` metres.
    ///
    /// Inverts the gap law for `target_gap_fraction * diameter`, then maps
    /// the resulting half-angle back onto the 0-100 % scale. Bodies wider
    /// than the jaws can open return 100.
    pub fn min_aperture_for_diameter(&self, diameter: f64, target_gap_fraction: f64) -> f64 {
        let target_gap = diameter * target_gap_fraction;
        if !target_gap.is_finite() || target_gap > self.max_gap() {
            return 100.0;
        }
        let ratio = (target_gap / (2.0 * self.jaw_length)).clamp(0.0, 1.0);
        let angle = ratio.asin().to_degrees();
        self.aperture_for_angle(angle)
    }
}

impl Default for ApertureModel {
    fn default() -> Self {
        let spec = GripperSpec::default();
        Self {
            jaw_length: spec.jaw_length,
            closed_angle: spec.closed_angle,
            open_angle: spec.open_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(jaw_length: f64, closed: f64, open: f64) -> ApertureModel {
        ApertureModel::from_spec(&GripperSpec {
            jaw_length,
            closed_angle: closed,
            open_angle: open,
        })
        .unwrap()
    }

    #[test]
    fn test_min_aperture_for_thirty_millimetre_body() {
        // jaw 30 mm, range -10..100 deg, body 30 mm, target gap 70 % -> 21 mm
        let m = model(0.03, -10.0, 100.0);
        let aperture = m.min_aperture_for_diameter(0.03, 0.70);

        // sin(angle) = 0.021 / 0.06 = 0.35
        let angle = 0.35_f64.asin().to_degrees();
        let expected = (angle - -10.0) / (100.0 - -10.0) * 100.0;

        println!("angle = {:.6} deg, min aperture = {:.6} %", angle, aperture);
        assert!((aperture - expected).abs() < 1e-12);
        assert!((aperture - 27.715741).abs() < 1e-6, "got {}", aperture);
        assert!((m.gap_for_aperture(aperture) - 0.021).abs() < 1e-12);
    }

    #[test]
    fn test_angle_mapping_round_trips_within_range() {
        let m = ApertureModel::default();
        assert_eq!(m.angle_for_aperture(0.0), -10.0);
        assert_eq!(m.angle_for_aperture(100.0), 100.0);
        assert!((m.angle_for_aperture(50.0) - 45.0).abs() < 1e-12);
        assert!((m.aperture_for_angle(45.0) - 50.0).abs() < 1e-12);

        // Out-of-range input clamps instead of extrapolating
        assert_eq!(m.angle_for_aperture(140.0), 100.0);
        assert_eq!(m.aperture_for_angle(-30.0), 0.0);
    }

    #[test]
    fn test_oversized_body_needs_full_aperture() {
        let m = ApertureModel::default();
        assert!((m.max_gap() - 0.06).abs() < 1e-12);
        assert_eq!(m.min_aperture_for_diameter(0.2, 0.8), 100.0);
        assert!(!m.fits(0.2, 0.8));
        assert!(m.fits(0.03, 0.7));
    }

    #[test]
    fn test_tiny_body_allows_near_closed_jaws() {
        let m = ApertureModel::default();
        let aperture = m.min_aperture_for_diameter(0.0, 0.7);
        // Zero gap is reached at 0 deg, i.e. 10/110 of the range
        assert!((aperture - 100.0 / 11.0).abs() < 1e-12);
        assert!(aperture.is_finite());
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        let spec = GripperSpec {
            jaw_length: 0.0,
            closed_angle: -10.0,
            open_angle: 100.0,
        };
        assert!(ApertureModel::from_spec(&spec).is_err());
    }
}
