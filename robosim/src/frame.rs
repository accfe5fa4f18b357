//! Per-frame evaluation of the arm.
//!
//! [`ArmRig`] owns the chain, the IK solver and the grasp controller. The
//! host hands it a [`FrameContext`] every frame; forward kinematics runs
//! first and its tool poses feed the grasp controller, so the controller can
//! never see a stale jaw pose.

use nalgebra::Point3;

use robosim_common::{FrameSnapshot, GraspableBody};

use crate::config::SimConfig;
use crate::errors::ConfigError;
use crate::grasp::{GraspController, GraspEvent, GraspOutcome};
use crate::gripper::ApertureModel;
use crate::ik::{IkSolution, IkSolver};
use crate::kinematics::{KinematicChain, ToolPoses};

/// Inputs for one frame, owned by the host's control and object layers.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// Arm joint angles in degrees, base first
    pub joint_angles: &'a [f64],
    /// Commanded aperture (0-100 %)
    pub aperture: f64,
    /// Live object list
    pub bodies: &'a mut [GraspableBody],
}

/// What a frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub joint_angles: Vec<f64>,
    pub commanded_aperture: f64,
    /// Tip and jaw-contact poses, scene frame
    pub poses: ToolPoses,
    /// Jaw half-angle (deg) for the effective aperture
    pub jaw_angle: f64,
    pub grasp: GraspOutcome,
    pub held_body_id: Option<String>,
}

impl FrameReport {
    pub fn event(&self) -> Option<&GraspEvent> {
        self.grasp.event.as_ref()
    }

    /// Serializable view for the renderer.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            joint_angles: self.joint_angles.clone(),
            commanded_aperture: self.commanded_aperture,
            effective_aperture: self.grasp.effective_aperture,
            jaw_angle: self.jaw_angle,
            tip: self.poses.tip.into(),
            jaw: self.poses.jaw.into(),
            held_body_id: self.held_body_id.clone(),
            aperture_constraint: self.grasp.aperture_constraint,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArmRig {
    chain: KinematicChain,
    solver: IkSolver,
    grasp: GraspController,
    frame: u64,
}

impl ArmRig {
    /// Validate the configuration and build every component.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let chain = KinematicChain::from_config(&config.robot)?;
        let solver = IkSolver::new(config.ik.clone())?;
        let aperture = ApertureModel::from_spec(&config.robot.gripper)?;
        let grasp = GraspController::new(config.grasp.clone(), aperture)?;

        Ok(Self {
            chain,
            solver,
            grasp,
            frame: 0,
        })
    }

    pub fn chain(&self) -> &KinematicChain {
        &self.chain
    }

    pub fn solver(&self) -> &IkSolver {
        &self.solver
    }

    pub fn grasp(&self) -> &GraspController {
        &self.grasp
    }

    /// Frames evaluated so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Evaluate one frame: FK, then the grasp update.
    pub fn step(&mut self, ctx: FrameContext<'_>) -> FrameReport {
        let poses = self.chain.tool_poses(ctx.joint_angles);
        let grasp = self.grasp.update(&poses.jaw, ctx.aperture, ctx.bodies);
        let jaw_angle = self
            .grasp
            .aperture_model()
            .angle_for_aperture(grasp.effective_aperture);

        let report = FrameReport {
            frame: self.frame,
            joint_angles: ctx.joint_angles.to_vec(),
            commanded_aperture: ctx.aperture,
            poses,
            jaw_angle,
            grasp,
            held_body_id: self.grasp.held_body_id().map(str::to_string),
        };
        self.frame += 1;
        report
    }

    /// "Move to point": joint angles that put the configured tool frame on
    /// `target` (scene frame).
    pub fn solve_ik(&self, target: &Point3<f64>, initial_guess: Option<&[f64]>) -> IkSolution {
        self.solver.solve(&self.chain, target, initial_guess)
    }

    /// Drop whatever is held, e.g. on a scene reset.
    pub fn force_release(&mut self, bodies: &mut [GraspableBody]) -> Option<GraspEvent> {
        self.grasp.force_release(bodies)
    }
}
