// Library exports for the RoboSim manipulator engine

pub mod config;
pub mod coords;
pub mod errors;
pub mod frame;
pub mod grasp;
pub mod gripper;
pub mod ik;
pub mod joint_limits;
pub mod kinematics;
pub mod robot_config;

pub use config::SimConfig;
pub use coords::CoordinateAdapter;
pub use errors::ConfigError;
pub use frame::{ArmRig, FrameContext, FrameReport};
pub use grasp::{GraspConfig, GraspController, GraspEvent, GraspOutcome, GraspPhase, ReleaseReason};
pub use gripper::ApertureModel;
pub use ik::{BaseMode, IkConfig, IkSolution, IkSolver};
pub use joint_limits::{clamp_aperture, JointLimits};
pub use kinematics::{KinematicChain, Pose, ToolFrame, ToolPoses};
pub use robot_config::{GripperSpec, JointSpec, RobotConfig, RobotModel, ToolFrameSpec};
