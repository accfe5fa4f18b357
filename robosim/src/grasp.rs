//! Grasp coupling between the jaw and the live object list.
//!
//! The controller runs once per frame, after forward kinematics, and decides
//! whether a body is attached to the jaw. Contact is geometric: a body counts
//! as gripped when it sits inside the detection radius of the jaw-contact
//! frame and the commanded aperture has closed to that body's minimum
//! aperture. Once attached the body follows the jaw rigidly until the jaws
//! open past a wider release threshold.
//!
//! While nothing is held, bodies inside the larger pre-contact radius put a
//! floor under the aperture so the jaws never render through them.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use robosim_common::GraspableBody;

use crate::errors::ConfigError;
use crate::gripper::ApertureModel;
use crate::joint_limits::clamp_aperture;
use crate::kinematics::Pose;

/// Slack on the attach threshold for apertures that land on the minimum
/// after interpolation.
const APERTURE_EPSILON: f64 = 1e-6;

/// Grasp tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraspConfig {
    /// Jaw-to-body distance (m) inside which a body can be attached
    pub detection_radius: f64,
    /// Jaw-to-body distance (m) inside which a body limits the aperture
    pub precontact_radius: f64,
    /// Jaw gap to close down to, as a fraction of the body diameter
    pub target_gap_fraction: f64,
    /// Percentage points above the minimum aperture that release a body
    pub release_margin: f64,
    /// Gap (m) kept between a held body and the floor plane
    pub floor_clearance: f64,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            detection_radius: 0.04,
            precontact_radius: 0.07,
            target_gap_fraction: 0.7,
            release_margin: 15.0,
            floor_clearance: 0.002,
        }
    }
}

impl GraspConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.detection_radius,
            self.precontact_radius,
            self.target_gap_fraction,
            self.release_margin,
            self.floor_clearance,
        ];
        crate::errors::ensure_finite(&values, "grasp settings", ConfigError::InvalidGrasp)?;

        if self.detection_radius <= 0.0 {
            return Err(ConfigError::InvalidGrasp(
                "detection_radius must be positive".to_string(),
            ));
        }
        if self.precontact_radius < self.detection_radius {
            return Err(ConfigError::InvalidGrasp(format!(
                "precontact_radius ({}) is smaller than detection_radius ({})",
                self.precontact_radius, self.detection_radius
            )));
        }
        if self.target_gap_fraction <= 0.0 || self.target_gap_fraction > 1.0 {
            return Err(ConfigError::InvalidGrasp(format!(
                "target_gap_fraction must be in (0, 1], got {}",
                self.target_gap_fraction
            )));
        }
        if self.release_margin <= 0.0 {
            return Err(ConfigError::InvalidGrasp(
                "release_margin must be positive".to_string(),
            ));
        }
        if self.floor_clearance < 0.0 {
            return Err(ConfigError::InvalidGrasp(
                "floor_clearance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A body attached to the jaw.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldBody {
    pub body_id: String,
    /// Body pose in the jaw-contact frame, fixed at attach time
    pub offset: Isometry3<f64>,
    pub min_aperture: f64,
    /// Commanded aperture at or above which the body is let go
    pub release_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GraspPhase {
    /// Nothing held and nothing close enough to limit the jaws
    #[default]
    Idle,
    /// A body in the pre-contact zone limits the aperture
    Constrained { body_id: String, min_aperture: f64 },
    /// A body follows the jaw
    Held(HeldBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// Jaws opened past the release threshold
    Opened,
    /// Body vanished from the object list
    Missing,
    /// `force_release` was called
    Forced,
}

/// State transition produced by a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GraspEvent {
    Attached { body_id: String, min_aperture: f64 },
    Released { body_id: String, reason: ReleaseReason },
}

/// Result of one controller update.
#[derive(Debug, Clone, PartialEq)]
pub struct GraspOutcome {
    /// Aperture the jaws actually show: the commanded value, raised to the
    /// active constraint
    pub effective_aperture: f64,
    /// Lowest aperture currently allowed, `None` when unconstrained
    pub aperture_constraint: Option<f64>,
    pub event: Option<GraspEvent>,
}

/// Idle / Constrained / Held state machine.
#[derive(Debug, Clone)]
pub struct GraspController {
    config: GraspConfig,
    aperture: ApertureModel,
    phase: GraspPhase,
}

impl GraspController {
    pub fn new(config: GraspConfig, aperture: ApertureModel) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            aperture,
            phase: GraspPhase::Idle,
        })
    }

    pub fn config(&self) -> &GraspConfig {
        &self.config
    }

    pub fn aperture_model(&self) -> &ApertureModel {
        &self.aperture
    }

    pub fn phase(&self) -> &GraspPhase {
        &self.phase
    }

    pub fn held(&self) -> Option<&HeldBody> {
        match self.phase {
            GraspPhase::Held(ref held) => Some(held),
            _ => None,
        }
    }

    pub fn held_body_id(&self) -> Option<&str> {
        self.held().map(|h| h.body_id.as_str())
    }

    pub fn is_holding(&self) -> bool {
        self.held().is_some()
    }

    /// Minimum aperture for a body; 100 when it is too wide to grip.
    pub fn min_aperture_for(&self, body: &GraspableBody) -> f64 {
        self.aperture
            .min_aperture_for_diameter(body.effective_diameter, self.config.target_gap_fraction)
    }

    /// Whether the jaws can open wide enough to take `body`.
    pub fn fits(&self, body: &GraspableBody) -> bool {
        self.aperture
            .fits(body.effective_diameter, self.config.target_gap_fraction)
    }

    /// Commanded aperture at or above which a body with `min_aperture` is let go.
    pub fn release_threshold_for(&self, min_aperture: f64) -> f64 {
        (min_aperture + self.config.release_margin).min(100.0)
    }

    /// Whether `body` fits and leaves a gap between its attach and release
    /// thresholds. Bodies needing the jaws fully open have no such gap.
    pub fn can_attach(&self, body: &GraspableBody) -> bool {
        let min_aperture = self.min_aperture_for(body);
        self.fits(body)
            && min_aperture + APERTURE_EPSILON < self.release_threshold_for(min_aperture)
    }

    /// Advance one frame.
    ///
    /// # Arguments
    /// * `jaw` - Jaw-contact pose for this frame, scene frame
    /// * `commanded_aperture` - Aperture requested by the control layer (0-100 %)
    /// * `bodies` - Live object list; only the held or newly (un)held body is written
    ///
    /// At most one attach or release happens per call.
    pub fn update(
        &mut self,
        jaw: &Pose,
        commanded_aperture: f64,
        bodies: &mut [GraspableBody],
    ) -> GraspOutcome {
        let commanded = clamp_aperture(commanded_aperture);
        let jaw_iso = jaw.isometry();
        let jaw_point = [jaw.position.x, jaw.position.y, jaw.position.z];

        let event = match self.phase {
            GraspPhase::Held(_) => self.update_held(&jaw_iso, commanded, bodies),
            _ => self.try_attach(&jaw_iso, &jaw_point, commanded, bodies),
        };

        let constraint = self.refresh_constraint(&jaw_point, bodies);
        let effective_aperture = match constraint {
            Some(floor) => commanded.max(floor),
            None => commanded,
        };

        GraspOutcome {
            effective_aperture,
            aperture_constraint: constraint,
            event,
        }
    }

    /// Drop the held body, if any, regardless of aperture.
    pub fn force_release(&mut self, bodies: &mut [GraspableBody]) -> Option<GraspEvent> {
        let held = match std::mem::take(&mut self.phase) {
            GraspPhase::Held(held) => held,
            other => {
                self.phase = other;
                return None;
            }
        };

        if let Some(body) = bodies.iter_mut().find(|b| b.id == held.body_id) {
            body.grabbed = false;
        }
        info!("Force-released '{}'", held.body_id);
        Some(GraspEvent::Released {
            body_id: held.body_id,
            reason: ReleaseReason::Forced,
        })
    }

    fn update_held(
        &mut self,
        jaw: &Isometry3<f64>,
        commanded: f64,
        bodies: &mut [GraspableBody],
    ) -> Option<GraspEvent> {
        let GraspPhase::Held(ref held) = self.phase else {
            return None;
        };

        let Some(body) = bodies.iter_mut().find(|b| b.id == held.body_id) else {
            warn!("Held body '{}' is no longer in the object list, releasing", held.body_id);
            let body_id = held.body_id.clone();
            self.phase = GraspPhase::Idle;
            return Some(GraspEvent::Released {
                body_id,
                reason: ReleaseReason::Missing,
            });
        };

        if commanded >= held.release_threshold {
            body.grabbed = false;
            info!(
                "Released '{}' at aperture {:.1}% (threshold {:.1}%)",
                held.body_id, commanded, held.release_threshold
            );
            let body_id = held.body_id.clone();
            self.phase = GraspPhase::Idle;
            return Some(GraspEvent::Released {
                body_id,
                reason: ReleaseReason::Opened,
            });
        }

        let mut pose = jaw * held.offset;
        let floor = body.half_extent() + self.config.floor_clearance;
        if pose.translation.y < floor {
            pose.translation.y = floor;
        }
        body.set_isometry(&pose);
        None
    }

    fn try_attach(
        &mut self,
        jaw: &Isometry3<f64>,
        jaw_point: &[f64; 3],
        commanded: f64,
        bodies: &mut [GraspableBody],
    ) -> Option<GraspEvent> {
        let index = self.nearest_candidate(jaw_point, bodies)?;
        let min_aperture = self.min_aperture_for(&bodies[index]);

        // Closing onto the minimum and already sitting below it both qualify
        if commanded > min_aperture + APERTURE_EPSILON {
            return None;
        }

        let body = &mut bodies[index];
        let offset = jaw.inverse() * body.isometry();
        body.grabbed = true;

        let release_threshold = self.release_threshold_for(min_aperture);
        info!(
            "Attached '{}' at aperture {:.1}% (min {:.1}%, release at {:.1}%)",
            body.id, commanded, min_aperture, release_threshold
        );

        self.phase = GraspPhase::Held(HeldBody {
            body_id: body.id.clone(),
            offset,
            min_aperture,
            release_threshold,
        });
        Some(GraspEvent::Attached {
            body_id: body.id.clone(),
            min_aperture,
        })
    }

    /// Nearest attachable body inside the detection radius; ties go to the
    /// lower id.
    fn nearest_candidate(&self, jaw_point: &[f64; 3], bodies: &[GraspableBody]) -> Option<usize> {
        bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.grabbable && !b.grabbed && self.can_attach(b))
            .map(|(i, b)| (i, b.distance_to(jaw_point)))
            .filter(|(_, d)| *d <= self.config.detection_radius)
            .min_by(|(ia, da), (ib, db)| {
                da.total_cmp(db)
                    .then_with(|| bodies[*ia].id.cmp(&bodies[*ib].id))
            })
            .map(|(i, _)| i)
    }

    /// Recompute the aperture floor and the Idle/Constrained phase.
    ///
    /// While holding, only the held body limits the jaws.
    fn refresh_constraint(
        &mut self,
        jaw_point: &[f64; 3],
        bodies: &[GraspableBody],
    ) -> Option<f64> {
        if let Some(held) = self.held() {
            return Some(held.min_aperture);
        }

        // Most restrictive unheld body in the pre-contact zone
        let binding = bodies
            .iter()
            .filter(|b| b.grabbable && !b.grabbed)
            .filter(|b| b.distance_to(jaw_point) <= self.config.precontact_radius)
            .map(|b| (b, self.min_aperture_for(b)))
            .max_by(|(ba, ma), (bb, mb)| ma.total_cmp(mb).then_with(|| bb.id.cmp(&ba.id)));

        let constraint = binding.map(|(_, m)| m);
        let next = match binding {
            Some((body, min_aperture)) => GraspPhase::Constrained {
                body_id: body.id.clone(),
                min_aperture,
            },
            None => GraspPhase::Idle,
        };
        if next != self.phase {
            debug!("Grasp phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }

        constraint
    }
}
