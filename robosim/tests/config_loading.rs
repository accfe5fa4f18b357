use robosim::{ArmRig, ConfigError, KinematicChain, RobotConfig, RobotModel, SimConfig};

const SO101_JSON: &str = include_str!("../models/so101.json");

#[test]
fn bundled_model_matches_builtin() {
    let loaded = SimConfig::from_json_str(SO101_JSON).unwrap();
    let builtin = SimConfig::default();

    assert_eq!(loaded.robot.model, RobotModel::So101);
    assert_eq!(loaded.robot.joint_names(), builtin.robot.joint_names());
    assert_eq!(loaded.grasp, builtin.grasp);
    assert_eq!(loaded.ik, builtin.ik);

    for (a, b) in loaded.robot.joints.iter().zip(&builtin.robot.joints) {
        assert!((a.limits.min - b.limits.min).abs() < 1e-9, "{}", a.name);
        assert!((a.limits.max - b.limits.max).abs() < 1e-9, "{}", a.name);
    }

    // Same geometry, same FK
    let joints = [25.0, -30.0, 45.0, 10.0, 60.0];
    let from_file = KinematicChain::from_config(&loaded.robot).unwrap();
    let from_code = KinematicChain::from_config(&builtin.robot).unwrap();
    let a = from_file.forward_kinematics(&joints).position;
    let b = from_code.forward_kinematics(&joints).position;
    assert!((a - b).norm() < 1e-12);
}

#[test]
fn bundled_model_builds_a_rig() {
    let config = SimConfig::from_json_str(SO101_JSON).unwrap();
    let rig = ArmRig::new(&config).unwrap();
    assert_eq!(rig.chain().dof(), 5);
}

#[test]
fn zero_length_jaw_is_fatal() {
    let mut value: serde_json::Value = serde_json::from_str(SO101_JSON).unwrap();
    value["robot"]["gripper"]["jaw_length"] = serde_json::json!(0.0);

    let err = SimConfig::from_json_str(&value.to_string()).unwrap_err();
    println!("rejected: {}", err);
    assert!(matches!(err, ConfigError::InvalidGripper(_)));
}

#[test]
fn inverted_joint_limits_are_fatal() {
    let mut value: serde_json::Value = serde_json::from_str(SO101_JSON).unwrap();
    value["robot"]["joints"][2]["limits"] = serde_json::json!({ "min": 50.0, "max": -50.0 });

    let err = SimConfig::from_json_str(&value.to_string()).unwrap_err();
    match err {
        ConfigError::InvalidJoint { ref joint, .. } => assert_eq!(joint, "elbow_flex"),
        other => panic!("expected InvalidJoint, got {:?}", other),
    }
}

#[test]
fn empty_chain_is_fatal() {
    let mut robot = RobotConfig::so101();
    robot.joints.clear();
    assert_eq!(KinematicChain::from_config(&robot).unwrap_err(), ConfigError::EmptyChain);
}

#[test]
fn custom_model_starts_from_so101_layout() {
    let robot = RobotConfig::from_model(RobotModel::Custom);
    assert_eq!(robot.model, RobotModel::Custom);
    assert_eq!(robot.joints, RobotConfig::so101().joints);
}
