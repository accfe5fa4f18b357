//! Shared scene types for the RoboSim manipulator engine.
//!
//! This crate provides the types exchanged between the kinematics engine and
//! the host scene (renderer, object manager, recorder). All types are plain
//! serde structs so they can cross a WASM or JSON boundary unchanged.
//!
//! # Architecture
//!
//! - `robosim_common` - Scene DTOs (GraspableBody, PoseDto, FrameSnapshot, RobotModel)
//! - `robosim` - Kinematic chain, IK solver and grasp controller
//!
//! Positions are metres and orientations are `[x, y, z, w]` quaternions, both
//! expressed in the host scene's Y-up frame.
//!
//! # Usage
//!
//! ```rust
//! use robosim_common::{GraspableBody, RobotModel};
//!
//! let cube = GraspableBody::new("cube", [0.25, 0.015, 0.0], 0.03);
//! assert!(cube.grabbable);
//! assert_eq!(RobotModel::default(), RobotModel::So101);
//! ```

mod bodies;
mod frames;
mod models;
pub mod transforms;

pub use bodies::*;
pub use frames::*;
pub use models::*;
