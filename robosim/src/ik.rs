//! Position-only inverse kinematics by multi-start coordinate descent.
//!
//! From each seed configuration the solver walks a fixed, decreasing
//! schedule of step sizes. For every step size it sweeps the free joints,
//! tries `+step` and `-step` on each, and keeps whichever move lowers the
//! tool-position error. The best configuration seen anywhere is returned as
//! soon as it is within tolerance, or when the budget runs out.
//!
//! The solver never fails: a residual above tolerance is reported through
//! [`IkSolution::residual_error`] and the caller decides what to do with it.
//! There is no randomness, so identical inputs give identical outputs.

use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::CoordinateAdapter;
use crate::errors::{ensure_finite, ConfigError};
use crate::kinematics::{BaseAxis, KinematicChain, ToolFrame};

/// How the base joint is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaseMode {
    /// Point the arm at the target with atan2 and search the remaining joints.
    /// Falls back to `Search` when the base axis is not vertical.
    #[default]
    Analytic,
    /// Search every joint, base included
    Search,
}

/// Tuning for [`IkSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkConfig {
    /// Acceptable tool-position error (m)
    pub tolerance: f64,
    /// Step sizes in degrees, largest first
    pub step_schedule: Vec<f64>,
    /// Sweeps per step size before moving to the next one
    pub max_iterations_per_step: usize,
    /// Start configurations in degrees, tried in order
    pub seeds: Vec<Vec<f64>>,
    pub base_mode: BaseMode,
    /// Frame that should land on the target
    pub target_frame: ToolFrame,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.005,
            step_schedule: vec![10.0, 5.0, 2.0, 1.0, 0.5, 0.25, 0.1],
            max_iterations_per_step: 30,
            // Elbow straight, bent up, bent down, folded, tucked and reaching back
            seeds: vec![
                vec![0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.0, -45.0, 60.0, 45.0, 0.0],
                vec![0.0, 45.0, -60.0, -45.0, 0.0],
                vec![0.0, -80.0, 80.0, 30.0, 0.0],
                vec![0.0, 30.0, 30.0, -60.0, 0.0],
                vec![0.0, 60.0, 60.0, 60.0, 0.0],
                vec![0.0, -70.0, -60.0, 0.0, 0.0],
            ],
            base_mode: BaseMode::Analytic,
            target_frame: ToolFrame::Tip,
        }
    }
}

impl IkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidIk(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.step_schedule.is_empty() {
            return Err(ConfigError::InvalidIk("step_schedule is empty".to_string()));
        }
        if self.step_schedule.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ConfigError::InvalidIk(
                "step sizes must be positive and finite".to_string(),
            ));
        }
        if self.max_iterations_per_step == 0 {
            return Err(ConfigError::InvalidIk(
                "max_iterations_per_step must be at least 1".to_string(),
            ));
        }
        for seed in &self.seeds {
            ensure_finite(seed, "seed angles", ConfigError::InvalidIk)?;
        }
        Ok(())
    }
}

/// Result of an IK solve.
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution {
    /// Joint angles in degrees, within limits
    pub joint_angles: Vec<f64>,
    /// Distance from the tool frame to the target (m), measured with FK
    pub residual_error: f64,
    /// Whether `residual_error` is below the tolerance
    pub converged: bool,
    /// FK evaluations spent
    pub evaluations: usize,
}

/// Multi-start coordinate-descent solver.
#[derive(Debug, Clone)]
pub struct IkSolver {
    config: IkConfig,
}

impl IkSolver {
    pub fn new(config: IkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: IkConfig::default(),
        }
    }

    pub fn config(&self) -> &IkConfig {
        &self.config
    }

    /// Upper bound on FK evaluations for one solve with an initial guess.
    pub fn max_evaluations(&self, chain: &KinematicChain) -> usize {
        let seeds = self.config.seeds.len().max(1) + 1;
        let sweeps = self.config.step_schedule.len() * self.config.max_iterations_per_step;
        // two probes per joint plus one re-evaluation per sweep
        seeds * (1 + sweeps * (2 * chain.dof() + 1))
    }

    /// Solve for the configured target frame.
    ///
    /// # Arguments
    /// * `target` - Desired tool position in the scene frame (m)
    /// * `initial_guess` - Optional joint angles (deg) tried before the seeds
    pub fn solve(
        &self,
        chain: &KinematicChain,
        target: &Point3<f64>,
        initial_guess: Option<&[f64]>,
    ) -> IkSolution {
        self.solve_for_frame(chain, target, self.config.target_frame, initial_guess)
    }

    /// Solve so that `frame` lands on `target` (scene frame).
    pub fn solve_for_frame(
        &self,
        chain: &KinematicChain,
        target: &Point3<f64>,
        frame: ToolFrame,
        initial_guess: Option<&[f64]>,
    ) -> IkSolution {
        let native_target = CoordinateAdapter::point_to_native(target).coords;

        let base = match self.config.base_mode {
            BaseMode::Analytic => chain.base_axis(),
            BaseMode::Search => None,
        };
        if self.config.base_mode == BaseMode::Analytic && base.is_none() {
            debug!("base axis is not vertical, searching all joints");
        }

        let mut search = Search::new(chain, frame, native_target, base);

        let zeros = vec![0.0; chain.dof()];
        let mut seeds: Vec<&[f64]> = Vec::with_capacity(self.config.seeds.len() + 1);
        if let Some(guess) = initial_guess {
            seeds.push(guess);
        }
        seeds.extend(self.config.seeds.iter().map(|s| s.as_slice()));
        if seeds.is_empty() {
            seeds.push(&zeros);
        }

        let mut best = Best::new(chain.dof());
        chain.clamp_angles(&mut best.angles);
        if native_target.iter().all(|c| c.is_finite()) {
            for (i, seed) in seeds.iter().enumerate() {
                if search.descend(seed, &self.config, &mut best) {
                    debug!(seed = i, "IK converged");
                    break;
                }
            }
        }

        let residual_error = search.residual(&best.angles);
        let solution = IkSolution {
            converged: residual_error < self.config.tolerance,
            joint_angles: best.angles,
            residual_error,
            evaluations: search.evaluations,
        };

        debug!(
            evaluations = solution.evaluations,
            residual = solution.residual_error,
            converged = solution.converged,
            "IK solve finished"
        );
        solution
    }
}

/// Best configuration seen so far.
struct Best {
    angles: Vec<f64>,
    error: f64,
}

impl Best {
    fn new(dof: usize) -> Self {
        Self {
            angles: vec![0.0; dof],
            error: f64::INFINITY,
        }
    }

    fn offer(&mut self, angles: &[f64], error: f64) {
        if error < self.error {
            self.error = error;
            self.angles.copy_from_slice(angles);
        }
    }
}

/// State for one solve.
struct Search<'a> {
    chain: &'a KinematicChain,
    frame: ToolFrame,
    target: Vector3<f64>,
    base: Option<BaseAxis>,
    scratch: Vec<f64>,
    evaluations: usize,
}

impl<'a> Search<'a> {
    fn new(
        chain: &'a KinematicChain,
        frame: ToolFrame,
        target: Vector3<f64>,
        base: Option<BaseAxis>,
    ) -> Self {
        Self {
            chain,
            frame,
            target,
            base,
            scratch: vec![0.0; chain.dof()],
            evaluations: 0,
        }
    }

    fn tool_position(&self, angles: &[f64]) -> Vector3<f64> {
        self.chain
            .tool_frame_native(angles, self.frame)
            .translation
            .vector
    }

    fn residual(&self, angles: &[f64]) -> f64 {
        (self.tool_position(angles) - self.target).norm()
    }

    /// Position error for `angles`.
    ///
    /// With an analytic base the incoming base angle is ignored; the base
    /// angle that faces the target is returned alongside the error.
    fn evaluate(&mut self, angles: &[f64]) -> (f64, Option<f64>) {
        self.evaluations += 1;

        let Some(axis) = self.base else {
            return (self.residual(angles), None);
        };

        self.scratch.copy_from_slice(angles);
        self.scratch[0] = 0.0;
        let tip = self.tool_position(&self.scratch);

        let reach = Vector2::new(tip.x, tip.y) - axis.pivot;
        let goal = Vector2::new(self.target.x, self.target.y) - axis.pivot;
        let bearing = wrap_angle(goal.y.atan2(goal.x) - reach.y.atan2(reach.x));

        let raw = (axis.sign * bearing).to_degrees();
        let base_deg = match self.chain.joint_limits(0) {
            Some(limits) => limits.clamp(raw),
            None => raw,
        };

        let (s, c) = (axis.sign * base_deg.to_radians()).sin_cos();
        let swung = Vector2::new(c * reach.x - s * reach.y, s * reach.x + c * reach.y);
        let horizontal = swung - goal;
        let vertical = tip.z - self.target.z;

        let error = (horizontal.norm_squared() + vertical * vertical).sqrt();
        (error, Some(base_deg))
    }

    /// Run the step schedule from one seed. Returns true once `best` is
    /// within tolerance.
    fn descend(&mut self, seed: &[f64], config: &IkConfig, best: &mut Best) -> bool {
        let dof = self.chain.dof();
        let mut angles: Vec<f64> = (0..dof)
            .map(|i| {
                let value = seed.get(i).copied().unwrap_or(0.0);
                match self.chain.joint_limits(i) {
                    Some(limits) => limits.clamp(value),
                    None => value,
                }
            })
            .collect();
        let first_free = if self.base.is_some() { 1 } else { 0 };

        let (mut error, base) = self.evaluate(&angles);
        if let Some(b) = base {
            angles[0] = b;
        }
        best.offer(&angles, error);
        if best.error < config.tolerance {
            return true;
        }

        for &step in &config.step_schedule {
            for _ in 0..config.max_iterations_per_step {
                let mut improved = false;

                for joint in first_free..dof {
                    let current = angles[joint];
                    let Some(limits) = self.chain.joint_limits(joint) else {
                        continue;
                    };

                    let mut joint_best = (error, current);
                    for direction in [1.0, -1.0] {
                        let candidate = limits.clamp(current + direction * step);
                        if candidate == current {
                            continue;
                        }
                        angles[joint] = candidate;
                        let (candidate_error, _) = self.evaluate(&angles);
                        angles[joint] = current;
                        if candidate_error < joint_best.0 {
                            joint_best = (candidate_error, candidate);
                        }
                    }

                    if joint_best.1 != current {
                        angles[joint] = joint_best.1;
                        error = joint_best.0;
                        improved = true;
                    }
                }

                if self.base.is_some() {
                    let (e, base) = self.evaluate(&angles);
                    error = e;
                    if let Some(b) = base {
                        angles[0] = b;
                    }
                }

                best.offer(&angles, error);
                if best.error < config.tolerance {
                    return true;
                }
                if !improved {
                    break;
                }
            }
        }
        false
    }
}

/// Normalize an angle to [-pi, pi) radians.
fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_config::RobotConfig;

    fn so101() -> KinematicChain {
        KinematicChain::from_config(&RobotConfig::so101()).unwrap()
    }

    #[test]
    fn test_inverse_kinematics_roundtrip() {
        let chain = so101();
        let solver = IkSolver::with_defaults();

        let original_joints = [20.0, 30.0, -20.0, 40.0, 0.0];
        let target = chain.forward_kinematics(&original_joints).position;
        let solution = solver.solve(&chain, &target, None);

        println!(
            "IK result: {:?} residual={:.5} m evals={}",
            solution.joint_angles, solution.residual_error, solution.evaluations
        );

        assert!(solution.converged, "IK should reach a point produced by FK");
        let reached = chain.forward_kinematics(&solution.joint_angles).position;
        assert!((reached - target).norm() < 0.005);
        assert!((solution.residual_error - (reached - target).norm()).abs() < 1e-12);
    }

    #[test]
    fn test_initial_guess_at_answer_returns_immediately() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let joints = [0.0, 10.0, 20.0, -30.0, 0.0];
        let target = chain.forward_kinematics(&joints).position;

        let solution = solver.solve(&chain, &target, Some(&joints[..]));
        assert!(solution.converged);
        assert_eq!(solution.evaluations, 1);
    }

    #[test]
    fn test_solver_is_deterministic() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let target = Point3::new(0.2, 0.05, -0.1);

        let a = solver.solve(&chain, &target, None);
        let b = solver.solve(&chain, &target, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unreachable_target_reports_residual() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let target = Point3::new(2.0, 1.0, 0.0);

        let solution = solver.solve(&chain, &target, None);
        assert!(!solution.converged);
        assert!(solution.residual_error > 1.0);
        assert!(solution.residual_error.is_finite());
        assert!(solution.evaluations <= solver.max_evaluations(&chain));
        for (angle, limits) in solution.joint_angles.iter().zip(chain.limits()) {
            assert!(limits.contains(*angle), "{} outside {:?}", angle, limits);
        }
    }

    #[test]
    fn test_analytic_base_faces_target() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let joints = [35.0, 20.0, 10.0, 30.0, 0.0];
        let target = chain.forward_kinematics(&joints).position;

        let solution = solver.solve(&chain, &target, None);
        assert!(solution.converged);
        assert!(
            (solution.joint_angles[0] - 35.0).abs() < 2.0,
            "base should point at the target, got {}",
            solution.joint_angles[0]
        );
    }

    #[test]
    fn test_search_mode_reaches_target() {
        let chain = so101();
        let solver = IkSolver::new(IkConfig {
            base_mode: BaseMode::Search,
            ..IkConfig::default()
        })
        .unwrap();
        let target = chain.forward_kinematics(&[-25.0, 15.0, 20.0, 10.0, 0.0]).position;

        let solution = solver.solve(&chain, &target, None);
        assert!(solution.converged, "residual {}", solution.residual_error);
    }

    #[test]
    fn test_jaw_contact_frame_target() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let joints = [10.0, 25.0, 5.0, 35.0, 0.0];
        let target = chain
            .forward_kinematics_frame(&joints, ToolFrame::JawContact)
            .position;

        let solution = solver.solve_for_frame(&chain, &target, ToolFrame::JawContact, None);
        assert!(solution.converged);
        let jaw = chain
            .forward_kinematics_frame(&solution.joint_angles, ToolFrame::JawContact)
            .position;
        assert!((jaw - target).norm() < 0.005);
    }

    #[test]
    fn test_non_finite_target_does_not_panic() {
        let chain = so101();
        let solver = IkSolver::with_defaults();
        let solution = solver.solve(&chain, &Point3::new(f64::NAN, 0.0, 0.0), None);
        assert!(!solution.converged);
        assert_eq!(solution.joint_angles.len(), chain.dof());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = IkConfig {
            step_schedule: vec![],
            ..IkConfig::default()
        };
        assert!(IkSolver::new(bad).is_err());

        let bad = IkConfig {
            tolerance: 0.0,
            ..IkConfig::default()
        };
        assert!(IkSolver::new(bad).is_err());
    }

    #[test]
    fn test_wrap_angle() {
        use std::f64::consts::PI;
        assert!((wrap_angle(3.0 * PI / 2.0) - -PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
    }
}
