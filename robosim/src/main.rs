// Headless pick-and-place demo
// Moves the SO-101 above a cube, closes on it, carries it to a drop point and lets go.
// Usage: robosim [config.json]

use std::error::Error;
use std::time::Duration;

use nalgebra::Point3;
use tracing::{info, warn};

use robosim::{ArmRig, FrameContext, GraspEvent, SimConfig, ToolFrame};
use robosim_common::GraspableBody;

/// Simulation tick (~60 Hz)
const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// One leg of the scripted routine.
struct Waypoint {
    label: &'static str,
    /// Jaw-contact target in the scene frame; `None` keeps the arm still
    target: Option<[f64; 3]>,
    aperture: f64,
    frames: u32,
}

impl Waypoint {
    const fn new(
        label: &'static str,
        target: Option<[f64; 3]>,
        aperture: f64,
        frames: u32,
    ) -> Self {
        Self {
            label,
            target,
            aperture,
            frames,
        }
    }
}

fn script() -> Vec<Waypoint> {
    vec![
        Waypoint::new("open", None, 100.0, 20),
        Waypoint::new("above cube", Some([0.25, 0.08, 0.0]), 100.0, 60),
        Waypoint::new("descend", Some([0.25, 0.015, 0.0]), 100.0, 40),
        Waypoint::new("close", None, 0.0, 40),
        Waypoint::new("lift", Some([0.22, 0.10, 0.0]), 0.0, 40),
        Waypoint::new("carry", Some([0.18, 0.10, 0.12]), 0.0, 60),
        Waypoint::new("lower", Some([0.18, 0.02, 0.12]), 0.0, 40),
        Waypoint::new("release", None, 100.0, 30),
        Waypoint::new("retreat", Some([0.18, 0.10, 0.12]), 100.0, 40),
    ]
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            SimConfig::from_file(&path)?
        }
        None => SimConfig::default(),
    };

    let mut rig = ArmRig::new(&config)?;
    info!(
        "Robot {} ready: {} joints ({})",
        config.robot.model.display_name(),
        rig.chain().dof(),
        rig.chain().joint_names().join(", ")
    );

    let mut bodies = vec![GraspableBody::new("cube", [0.25, 0.015, 0.0], 0.03)];
    let mut joints = vec![0.0; rig.chain().dof()];
    let mut aperture = 0.0;
    let mut ticker = tokio::time::interval(FRAME_PERIOD);

    for waypoint in script() {
        let goal = match waypoint.target {
            Some([x, y, z]) => {
                let solution = rig.solver().solve_for_frame(
                    rig.chain(),
                    &Point3::new(x, y, z),
                    ToolFrame::JawContact,
                    Some(joints.as_slice()),
                );
                if solution.converged {
                    info!(
                        "{}: IK residual {:.2} mm after {} evaluations",
                        waypoint.label,
                        solution.residual_error * 1000.0,
                        solution.evaluations
                    );
                } else {
                    warn!(
                        "{}: IK did not converge, residual {:.2} mm",
                        waypoint.label,
                        solution.residual_error * 1000.0
                    );
                }
                solution.joint_angles
            }
            None => joints.clone(),
        };

        let start = joints.clone();
        let start_aperture = aperture;
        for frame in 1..=waypoint.frames {
            ticker.tick().await;
            let t = f64::from(frame) / f64::from(waypoint.frames);

            for (joint, (a, b)) in joints.iter_mut().zip(start.iter().zip(&goal)) {
                *joint = lerp(*a, *b, t);
            }
            rig.chain().clamp_angles(&mut joints);
            aperture = lerp(start_aperture, waypoint.aperture, t);

            let report = rig.step(FrameContext {
                joint_angles: &joints,
                aperture,
                bodies: &mut bodies,
            });

            match report.event() {
                Some(GraspEvent::Attached { body_id, min_aperture }) => {
                    info!(
                        "Frame {}: picked up '{}' (min aperture {:.1}%)",
                        report.frame, body_id, min_aperture
                    );
                }
                Some(GraspEvent::Released { body_id, reason }) => {
                    info!("Frame {}: released '{}' ({:?})", report.frame, body_id, reason);
                }
                None => {}
            }
        }

        let tip = rig.chain().forward_kinematics(&joints).position;
        info!(
            "{} done: tip at [{:.3}, {:.3}, {:.3}], aperture {:.0}%",
            waypoint.label, tip.x, tip.y, tip.z, aperture
        );
    }

    for body in &bodies {
        info!(
            "'{}' rests at [{:.3}, {:.3}, {:.3}] (grabbed: {})",
            body.id, body.position[0], body.position[1], body.position[2], body.grabbed
        );
    }
    Ok(())
}
