use robosim::{BaseMode, IkConfig, IkSolver, KinematicChain, RobotConfig};

/// Fixed 64-bit LCG so the sample set is identical on every run.
struct Lcg(u64);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn so101() -> KinematicChain {
    KinematicChain::from_config(&RobotConfig::so101()).unwrap()
}

/// Joint vectors spread over 10-90 % of each joint's range.
fn random_configurations(chain: &KinematicChain, count: usize) -> Vec<Vec<f64>> {
    let mut rng = Lcg(12345);
    (0..count)
        .map(|_| {
            chain
                .limits()
                .iter()
                .map(|l| l.min + l.span() * (0.1 + 0.8 * rng.next_unit()))
                .collect()
        })
        .collect()
}

#[test]
fn workspace_grid_converges() {
    let chain = so101();
    let solver = IkSolver::with_defaults();
    let budget = solver.max_evaluations(&chain);

    let mut total = 0;
    let mut converged = 0;
    let mut worst_evaluations = 0;
    for base in [-60.0, 0.0, 45.0] {
        for lift in [-70.0, -35.0, 0.0, 35.0, 70.0] {
            for elbow in [-70.0, -35.0, 0.0, 35.0, 70.0] {
                for wrist in [-60.0, 0.0, 60.0] {
                    let joints = [base, lift, elbow, wrist, 0.0];
                    let target = chain.forward_kinematics(&joints).position;
                    let solution = solver.solve(&chain, &target, None);

                    total += 1;
                    if solution.residual_error < 0.005 {
                        converged += 1;
                    } else {
                        println!(
                            "miss: {:?} -> residual {:.4} m",
                            joints, solution.residual_error
                        );
                    }
                    assert!(solution.evaluations <= budget);
                    worst_evaluations = worst_evaluations.max(solution.evaluations);
                }
            }
        }
    }

    let rate = converged as f64 / total as f64;
    println!(
        "grid: {}/{} converged ({:.1}%), worst case {} FK evaluations",
        converged,
        total,
        rate * 100.0,
        worst_evaluations
    );
    assert_eq!(total, 225);
    assert!(rate >= 0.95, "only {:.1}% of grid targets converged", rate * 100.0);
}

#[test]
fn random_reachable_targets_round_trip() {
    let chain = so101();
    let solver = IkSolver::with_defaults();
    let samples = random_configurations(&chain, 200);

    let mut converged = 0;
    for joints in &samples {
        let target = chain.forward_kinematics(joints).position;
        let solution = solver.solve(&chain, &target, None);

        // Residual is measured with real FK, not the search's own estimate
        let reached = chain.forward_kinematics(&solution.joint_angles).position;
        assert!(((reached - target).norm() - solution.residual_error).abs() < 1e-9);
        for (angle, limits) in solution.joint_angles.iter().zip(chain.limits()) {
            assert!(limits.contains(*angle));
        }

        if solution.converged {
            converged += 1;
        }
    }

    let rate = converged as f64 / samples.len() as f64;
    println!("random: {}/{} converged", converged, samples.len());
    assert!(rate >= 0.95, "only {:.1}% of random targets converged", rate * 100.0);
}

#[test]
fn search_mode_round_trip() {
    let chain = so101();
    let solver = IkSolver::new(IkConfig {
        base_mode: BaseMode::Search,
        ..IkConfig::default()
    })
    .unwrap();
    let samples = random_configurations(&chain, 40);

    let converged = samples
        .iter()
        .filter(|joints| {
            let target = chain.forward_kinematics(joints).position;
            solver.solve(&chain, &target, None).converged
        })
        .count();

    println!("search mode: {}/{} converged", converged, samples.len());
    assert!(converged as f64 >= 0.95 * samples.len() as f64);
}

#[test]
fn repeated_solves_are_identical() {
    let chain = so101();
    let solver = IkSolver::with_defaults();

    for joints in random_configurations(&chain, 5) {
        let target = chain.forward_kinematics(&joints).position;
        let first = solver.solve(&chain, &target, None);
        let second = solver.solve(&chain, &target, None);
        assert_eq!(first.joint_angles, second.joint_angles);
        assert_eq!(first.residual_error.to_bits(), second.residual_error.to_bits());
        assert_eq!(first.evaluations, second.evaluations);
    }
}

#[test]
fn short_seeds_are_padded() {
    let chain = so101();
    let solver = IkSolver::new(IkConfig {
        seeds: vec![vec![0.0, 30.0], vec![0.0, -45.0, 60.0, 45.0, 0.0, 99.0]],
        ..IkConfig::default()
    })
    .unwrap();
    let target = chain.forward_kinematics(&[15.0, 10.0, 20.0, 30.0, 0.0]).position;

    let solution = solver.solve(&chain, &target, None);
    assert_eq!(solution.joint_angles.len(), chain.dof());
    assert!(solution.converged, "residual {}", solution.residual_error);
}
