use std::fmt;

/// Error types of the four-bar position analysis.
///
/// `NoRealSolution`, `DegenerateHalfAngle`, `SingularJacobian` and `NotConverged` are
/// kinematic states reported by a single solve; the sweep routes around them.
/// The remaining variants reject bad input before any solving begins.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// negative discriminant of the closed form: the linkage cannot be assembled
    NoRealSolution { theta2_deg: f64 },
    /// leading coefficient of the half-angle quadratic vanished
    DegenerateHalfAngle { theta2_deg: f64 },
    SingularJacobian { theta2_deg: f64 },
    NotConverged { theta2_deg: f64, iterations: usize },
    InvalidParameters(String),
    InvalidAngleSequence(String),
    InvalidSettings(String),
    Config(String),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KinematicsError::NoRealSolution { theta2_deg } => {
                write!(f, "No real assembly at theta2 = {:.1}°", theta2_deg)
            }
            KinematicsError::DegenerateHalfAngle { theta2_deg } => write!(
                f,
                "Degenerate half-angle quadratic at theta2 = {:.1}°",
                theta2_deg
            ),
            KinematicsError::SingularJacobian { theta2_deg } => {
                write!(f, "Singularity detected at theta2 = {:.1}°", theta2_deg)
            }
            KinematicsError::NotConverged {
                theta2_deg,
                iterations,
            } => write!(
                f,
                "Max iterations ({}) reached at theta2 = {:.1}°",
                iterations, theta2_deg
            ),
            KinematicsError::InvalidParameters(msg) => write!(f, "Invalid link lengths: {}", msg),
            KinematicsError::InvalidAngleSequence(msg) => {
                write!(f, "Invalid input angle sequence: {}", msg)
            }
            KinematicsError::InvalidSettings(msg) => write!(f, "Invalid solver settings: {}", msg),
            KinematicsError::Config(msg) => write!(f, "Task configuration error: {}", msg),
        }
    }
}

impl std::error::Error for KinematicsError {}

impl KinematicsError {
    /// true for the states a sweep records as a missing sample instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            KinematicsError::NoRealSolution { .. }
                | KinematicsError::DegenerateHalfAngle { .. }
                | KinematicsError::SingularJacobian { .. }
                | KinematicsError::NotConverged { .. }
        )
    }
}

impl From<toml::de::Error> for KinematicsError {
    fn from(err: toml::de::Error) -> Self {
        KinematicsError::Config(err.to_string())
    }
}

impl From<std::io::Error> for KinematicsError {
    fn from(err: std::io::Error) -> Self {
        KinematicsError::Config(err.to_string())
    }
}
