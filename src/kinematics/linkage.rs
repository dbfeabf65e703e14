//! Link lengths, angle state and the vector loop-closure equations of the four-bar linkage.
//!
//! The loop r2 + r3 - r4 - r1 = 0 splits into two scalar residuals
//! ```text
//! f1 = r2*cos(theta2) + r3*cos(theta3) - r4*cos(theta4) - r1
//! f2 = r2*sin(theta2) + r3*sin(theta3) - r4*sin(theta4)
//! ```
//! whose Jacobian with respect to (theta3, theta4) is
//! ```text
//! J = [ -r3*sin(theta3),  r4*sin(theta4) ;
//!        r3*cos(theta3), -r4*cos(theta4) ]
//! ```
use super::error::KinematicsError;
use nalgebra::{Matrix2, Vector2};
use std::f64::consts::PI;
use strum_macros::{Display, EnumIter};

/// Configuration parameters for a four-bar linkage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkageParameters {
    pub r1: f64, // ground link length
    pub r2: f64, // input crank length
    pub r3: f64, // coupler link length
    pub r4: f64, // output rocker length
}

impl Default for LinkageParameters {
    fn default() -> Self {
        Self {
            r1: 6.0,
            r2: 2.0,
            r3: 5.0,
            r4: 5.0,
        }
    }
}

impl LinkageParameters {
    /// checked constructor: every length must be finite and strictly positive
    pub fn new(r1: f64, r2: f64, r3: f64, r4: f64) -> Result<Self, KinematicsError> {
        let params = Self { r1, r2, r3, r4 };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), KinematicsError> {
        for (name, value) in self.named_lengths() {
            if !value.is_finite() || value <= 0.0 {
                return Err(KinematicsError::InvalidParameters(format!(
                    "{} = {} must be a finite positive length",
                    name, value
                )));
            }
        }
        Ok(())
    }

    fn named_lengths(&self) -> [(&'static str, f64); 4] {
        [
            ("r1", self.r1),
            ("r2", self.r2),
            ("r3", self.r3),
            ("r4", self.r4),
        ]
    }

    /// loop-closure residuals (f1, f2); all angles in radians
    pub fn residuals(&self, theta2: f64, theta3: f64, theta4: f64) -> Vector2<f64> {
        let LinkageParameters { r1, r2, r3, r4 } = *self;
        let f1 = r2 * theta2.cos() + r3 * theta3.cos() - r4 * theta4.cos() - r1;
        let f2 = r2 * theta2.sin() + r3 * theta3.sin() - r4 * theta4.sin();
        Vector2::new(f1, f2)
    }

    /// analytic Jacobian of the residuals with respect to (theta3, theta4)
    pub fn jacobian(&self, theta3: f64, theta4: f64) -> Matrix2<f64> {
        let LinkageParameters { r3, r4, .. } = *self;
        Matrix2::new(
            -r3 * theta3.sin(),
            r4 * theta4.sin(),
            r3 * theta3.cos(),
            -r4 * theta4.cos(),
        )
    }

    /// Grashof condition s + l <= p + q: at least one link can fully rotate
    pub fn is_grashof(&self) -> bool {
        let lengths = [self.r1, self.r2, self.r3, self.r4];
        let s = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
        let l = lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let p_q_sum: f64 = lengths.iter().sum::<f64>() - s - l;

        s + l <= p_q_sum
    }

    /// classification by the Grashof condition and the shortest link
    pub fn mechanism_type(&self) -> MechanismType {
        if !self.is_grashof() {
            return MechanismType::NonGrashof;
        }
        let shortest = [
            (self.r1, MechanismType::DoubleCrank),
            (self.r2, MechanismType::CrankRocker),
            (self.r3, MechanismType::DoubleRocker),
            (self.r4, MechanismType::RockerCrank),
        ]
        .into_iter()
        .reduce(|best, next| if next.0 < best.0 { next } else { best });
        match shortest {
            Some((_, kind)) => kind,
            None => MechanismType::NonGrashof,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum MechanismType {
    #[strum(to_string = "Crank-Rocker")]
    CrankRocker,
    #[strum(to_string = "Double Crank")]
    DoubleCrank,
    #[strum(to_string = "Double Rocker")]
    DoubleRocker,
    #[strum(to_string = "Rocker-Crank")]
    RockerCrank,
    #[strum(to_string = "Non-Grashof (Double Rocker)")]
    NonGrashof,
}

/// State of the four-bar linkage, all angles in radians
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleState {
    pub theta2: f64, // input angle, caller supplied
    pub theta3: f64, // coupler angle, solved
    pub theta4: f64, // output angle, solved
}

impl AngleState {
    pub fn from_degrees(theta2_deg: f64, theta3_deg: f64, theta4_deg: f64) -> Self {
        Self {
            theta2: theta2_deg.to_radians(),
            theta3: theta3_deg.to_radians(),
            theta4: theta4_deg.to_radians(),
        }
    }

    /// (theta2, theta3, theta4) in degrees
    pub fn to_degrees(&self) -> (f64, f64, f64) {
        (
            self.theta2.to_degrees(),
            self.theta3.to_degrees(),
            self.theta4.to_degrees(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Joint positions of the four-bar linkage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPositions {
    pub p1: Point2D, // crank ground pivot (origin)
    pub p2: Point2D, // crank-coupler joint
    pub p3: Point2D, // coupler-rocker joint, traces the coupler curve
    pub p4: Point2D, // rocker ground pivot
}

pub fn joint_positions(params: &LinkageParameters, state: &AngleState) -> JointPositions {
    let LinkageParameters { r1, r2, r3, .. } = *params;
    let AngleState { theta2, theta3, .. } = *state;
    let p2 = Point2D {
        x: r2 * theta2.cos(),
        y: r2 * theta2.sin(),
    };
    JointPositions {
        p1: Point2D { x: 0.0, y: 0.0 },
        p2,
        p3: Point2D {
            x: p2.x + r3 * theta3.cos(),
            y: p2.y + r3 * theta3.sin(),
        },
        p4: Point2D { x: r1, y: 0.0 },
    }
}

/// wraps an angle in radians into (-pi, pi]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// smallest signed difference a - b between two angles in degrees
pub fn angle_difference_deg(a: f64, b: f64) -> f64 {
    wrap_angle((a - b).to_radians()).to_degrees()
}
