use std::error::Error;
use std::fmt;

/// Fatal problems found while loading a robot model or tuning parameters.
///
/// Everything here is caught once, when a chain or controller is built.
/// Per-frame evaluation never returns an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyChain,
    InvalidJoint { joint: String, reason: String },
    InvalidToolFrame(String),
    InvalidGripper(String),
    InvalidGrasp(String),
    InvalidIk(String),
    Parse(String),
    Io(String),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::EmptyChain => write!(f, "Kinematic chain has no joints"),
            ConfigError::InvalidJoint { ref joint, ref reason } => {
                write!(f, "Joint '{}' is invalid: {}", joint, reason)
            }
            ConfigError::InvalidToolFrame(ref msg) => write!(f, "Invalid tool frame: {}", msg),
            ConfigError::InvalidGripper(ref msg) => write!(f, "Invalid gripper: {}", msg),
            ConfigError::InvalidGrasp(ref msg) => write!(f, "Invalid grasp settings: {}", msg),
            ConfigError::InvalidIk(ref msg) => write!(f, "Invalid IK settings: {}", msg),
            ConfigError::Parse(ref msg) => write!(f, "Could not parse configuration: {}", msg),
            ConfigError::Io(ref msg) => write!(f, "Could not read configuration: {}", msg),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// Fail with `make(reason)` unless every value is finite.
pub(crate) fn ensure_finite<F>(values: &[f64], what: &str, make: F) -> Result<(), ConfigError>
where
    F: FnOnce(String) -> ConfigError,
{
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(make(format!("{} must be finite", what)))
    }
}
