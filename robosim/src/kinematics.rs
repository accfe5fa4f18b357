// Forward kinematics for serial revolute chains
// Each joint contributes origin_translation * origin_rotation * rotation(axis, angle);
// the tool pose is the ordered product of every joint transform followed by the tool offset.

use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use robosim_common::PoseDto;

use crate::coords::CoordinateAdapter;
use crate::errors::ConfigError;
use crate::joint_limits::{self, JointLimits};
use crate::robot_config::{JointSpec, RobotConfig, ToolFrameSpec};

/// Tolerance for treating the base joint axis as vertical.
const VERTICAL_AXIS_TOLERANCE: f64 = 1e-9;

/// Position + orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Self {
            position: Point3::from(iso.translation.vector),
            orientation: iso.rotation,
        }
    }

    pub fn isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
    }
}

impl From<Pose> for PoseDto {
    fn from(pose: Pose) -> Self {
        pose.isometry().into()
    }
}

/// Named frames at the end of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolFrame {
    /// Geometric tip; most user-facing targets refer to this
    #[default]
    Tip,
    /// Point between the jaws where contact is detected
    JawContact,
}

/// Both tool frames for one joint configuration, in the scene frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolPoses {
    pub tip: Pose,
    pub jaw: Pose,
}

impl ToolPoses {
    pub fn get(&self, frame: ToolFrame) -> &Pose {
        match frame {
            ToolFrame::Tip => &self.tip,
            ToolFrame::JawContact => &self.jaw,
        }
    }
}

/// A joint prepared for composition.
#[derive(Debug, Clone)]
struct ChainLink {
    name: String,
    origin: Isometry3<f64>,
    axis: Unit<Vector3<f64>>,
    limits: JointLimits,
}

impl ChainLink {
    fn from_spec(spec: &JointSpec) -> Self {
        Self {
            name: spec.name.clone(),
            origin: origin_to_isometry(&spec.origin_xyz, &spec.origin_rpy),
            axis: Unit::new_normalize(Vector3::from(spec.axis)),
            limits: spec.limits,
        }
    }

    /// origin_translation * origin_rotation * rotation(axis, angle)
    fn transform(&self, angle_deg: f64) -> Isometry3<f64> {
        let motion = UnitQuaternion::from_axis_angle(&self.axis, angle_deg.to_radians());
        self.origin * Isometry3::from_parts(Translation3::identity(), motion)
    }
}

/// Base joint that spins about the vertical axis of the native frame.
///
/// Rotating it by `angle` moves any point `p` further down the chain to
/// `pivot + Rz(sign * angle) * (p - pivot)` in the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BaseAxis {
    pub pivot: Vector2<f64>,
    pub sign: f64,
}

/// Ordered chain of revolute joints from base to tool.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    links: Vec<ChainLink>,
    tip_offset: Isometry3<f64>,
    jaw_offset: Isometry3<f64>,
    base_axis: Option<BaseAxis>,
}

impl KinematicChain {
    /// Build the chain from a validated robot description.
    pub fn from_config(config: &RobotConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let links: Vec<ChainLink> = config.joints.iter().map(ChainLink::from_spec).collect();
        let (tip_offset, jaw_offset) = tool_offsets(&config.tool);
        let base_axis = links.first().and_then(vertical_base_axis);

        Ok(Self {
            links,
            tip_offset,
            jaw_offset,
            base_axis,
        })
    }

    /// Number of joints in the chain.
    pub fn dof(&self) -> usize {
        self.links.len()
    }

    /// Joint names in chain order.
    pub fn joint_names(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.name.as_str()).collect()
    }

    /// Limits in chain order (degrees).
    pub fn limits(&self) -> Vec<JointLimits> {
        self.links.iter().map(|l| l.limits).collect()
    }

    pub fn joint_limits(&self, index: usize) -> Option<JointLimits> {
        self.links.get(index).map(|l| l.limits)
    }

    /// Clamp a joint vector to the declared limits in place.
    pub fn clamp_angles(&self, angles: &mut [f64]) {
        joint_limits::clamp_angles(&self.limits(), angles);
    }

    pub(crate) fn base_axis(&self) -> Option<BaseAxis> {
        self.base_axis
    }

    // ============================================================================
    // Forward Kinematics
    // ============================================================================

    /// Pose of the last link (before the tool offset) in the native frame.
    ///
    /// # Arguments
    /// * `angles` - Joint angles in degrees, base first. Missing trailing
    ///   entries count as 0, extra entries are ignored. Out-of-limit values
    ///   are used as given.
    pub fn flange_native(&self, angles: &[f64]) -> Isometry3<f64> {
        let mut transform = Isometry3::identity();
        for (i, link) in self.links.iter().enumerate() {
            let angle = angles.get(i).copied().unwrap_or(0.0);
            transform *= link.transform(angle);
        }
        transform
    }

    /// Pose of a tool frame in the native (Z-up) frame.
    pub fn tool_frame_native(&self, angles: &[f64], frame: ToolFrame) -> Isometry3<f64> {
        self.flange_native(angles) * self.tool_offset(frame)
    }

    /// Forward kinematics: geometric tip pose in the scene frame.
    ///
    /// # Arguments
    /// * `angles` - Joint angles in degrees, base first
    ///
    /// # Returns
    /// * Tip position (m) and orientation, scene frame (Y-up)
    pub fn forward_kinematics(&self, angles: &[f64]) -> Pose {
        self.forward_kinematics_frame(angles, ToolFrame::Tip)
    }

    /// Forward kinematics for a chosen tool frame, scene frame.
    pub fn forward_kinematics_frame(&self, angles: &[f64], frame: ToolFrame) -> Pose {
        let native = self.tool_frame_native(angles, frame);
        Pose::from_isometry(&CoordinateAdapter::pose_to_scene(&native))
    }

    /// Tip and jaw-contact poses from a single chain evaluation, scene frame.
    pub fn tool_poses(&self, angles: &[f64]) -> ToolPoses {
        let flange = self.flange_native(angles);
        let to_scene = |offset: &Isometry3<f64>| {
            Pose::from_isometry(&CoordinateAdapter::pose_to_scene(&(flange * offset)))
        };
        ToolPoses {
            tip: to_scene(&self.tip_offset),
            jaw: to_scene(&self.jaw_offset),
        }
    }

    fn tool_offset(&self, frame: ToolFrame) -> &Isometry3<f64> {
        match frame {
            ToolFrame::Tip => &self.tip_offset,
            ToolFrame::JawContact => &self.jaw_offset,
        }
    }
}

/// Convert a URDF-style origin (xyz + rpy) to an isometry.
fn origin_to_isometry(xyz: &[f64; 3], rpy: &[f64; 3]) -> Isometry3<f64> {
    let translation = Translation3::new(xyz[0], xyz[1], xyz[2]);
    // from_euler_angles applies roll, then pitch, then yaw: R = Rz * Ry * Rx
    let rotation = UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]);
    Isometry3::from_parts(translation, rotation)
}

/// Tip offset, and the jaw-contact offset shifted along the approach axis.
fn tool_offsets(tool: &ToolFrameSpec) -> (Isometry3<f64>, Isometry3<f64>) {
    let tip = origin_to_isometry(&tool.tip_xyz, &tool.tip_rpy);
    let approach = Unit::new_normalize(Vector3::from(tool.approach_axis));
    let shift = Translation3::from(approach.into_inner() * tool.jaw_contact_offset);
    let jaw = tip * Isometry3::from_parts(shift, UnitQuaternion::identity());
    (tip, jaw)
}

fn vertical_base_axis(link: &ChainLink) -> Option<BaseAxis> {
    // The first joint is expressed directly in the world frame
    let world_axis = link.origin.rotation * link.axis.into_inner();
    if world_axis.z.abs() < 1.0 - VERTICAL_AXIS_TOLERANCE {
        return None;
    }
    Some(BaseAxis {
        pivot: Vector2::new(link.origin.translation.x, link.origin.translation.y),
        sign: world_axis.z.signum(),
    })
}
