//! Closed-form (Freudenstein) position solution of the four-bar linkage, used only to seed
//! the Newton-Raphson iteration.
//!
//! With the half-angle substitution t = tan(theta/2) the loop-closure equation becomes a
//! quadratic A*t^2 + B*t + C = 0 in the rocker angle and D*t^2 + E*t + F = 0 in the coupler
//! angle. Of the two roots of each quadratic only the open configuration is kept; the
//! crossed configuration is never returned.
use super::error::KinematicsError;
use super::linkage::LinkageParameters;
use log::debug;

/// |A| or |D| below this value makes the half-angle root unusable
pub const DEGENERATE_COEFFICIENT: f64 = 1e-12;

/// Coefficients of one half-angle quadratic
#[derive(Debug, Clone, Copy)]
struct HalfAngleQuadratic {
    a: f64,
    b: f64,
    c: f64,
}

impl HalfAngleQuadratic {
    fn discriminant(&self) -> f64 {
        self.b.powi(2) - 4.0 * self.a * self.c
    }
    /// theta = 2*atan((-b + sign*sqrt(disc)) / (2a))
    fn root(&self, sign: f64, discriminant: f64) -> f64 {
        2.0 * ((-self.b + sign * discriminant.sqrt()) / (2.0 * self.a)).atan()
    }
}

/// ratios K1..K5 of the Freudenstein equations
fn ratios(params: &LinkageParameters) -> [f64; 5] {
    let LinkageParameters { r1, r2, r3, r4 } = *params;
    let k1 = r1 / r2;
    let k2 = r1 / r4;
    let k3 = (r2.powi(2) - r3.powi(2) + r4.powi(2) + r1.powi(2)) / (2.0 * r2 * r4);
    let k4 = r1 / r3;
    let k5 = (r4.powi(2) - r1.powi(2) - r2.powi(2) - r3.powi(2)) / (2.0 * r2 * r3);
    [k1, k2, k3, k4, k5]
}

/// Closed-form (theta3, theta4) in radians of the open configuration for `theta2` in radians.
///
/// Returns `NoRealSolution` when either discriminant is negative (the linkage cannot be
/// assembled at this crank angle) and `DegenerateHalfAngle` when a leading coefficient
/// vanishes. Neither is fatal: the caller falls back to a fixed guess.
/// Invalid link lengths and a non-finite `theta2` are rejected before anything is computed.
pub fn analytical_solution(
    params: &LinkageParameters,
    theta2: f64,
) -> Result<(f64, f64), KinematicsError> {
    params.validate()?;
    if !theta2.is_finite() {
        return Err(KinematicsError::InvalidAngleSequence(format!(
            "theta2 = {} is not a finite angle",
            theta2
        )));
    }
    let theta2_deg = theta2.to_degrees();
    let [k1, k2, k3, k4, k5] = ratios(params);
    let (sin2, cos2) = theta2.sin_cos();

    // rocker angle theta4
    let rocker = HalfAngleQuadratic {
        a: cos2 - k1 - k2 * cos2 + k3,
        b: -2.0 * sin2,
        c: k1 - (k2 + 1.0) * cos2 + k3,
    };
    let discriminant = rocker.discriminant();
    if discriminant < 0.0 {
        return Err(KinematicsError::NoRealSolution { theta2_deg });
    }
    if rocker.a.abs() < DEGENERATE_COEFFICIENT {
        return Err(KinematicsError::DegenerateHalfAngle { theta2_deg });
    }
    let theta4 = rocker.root(-1.0, discriminant);

    // coupler angle theta3, same procedure with the roles of the links swapped
    let coupler = HalfAngleQuadratic {
        a: cos2 - k1 + k4 * cos2 + k5,
        b: -2.0 * sin2,
        c: k1 + (k4 - 1.0) * cos2 + k5,
    };
    let discriminant2 = coupler.discriminant();
    if discriminant2 < 0.0 {
        return Err(KinematicsError::NoRealSolution { theta2_deg });
    }
    if coupler.a.abs() < DEGENERATE_COEFFICIENT {
        return Err(KinematicsError::DegenerateHalfAngle { theta2_deg });
    }
    // the open root closes the loop with theta4; the other root is kept only to catch
    // roundoff at a toggle position
    let theta3 = [-1.0, 1.0]
        .into_iter()
        .map(|sign| coupler.root(sign, discriminant2))
        .map(|theta3| (theta3, params.residuals(theta2, theta3, theta4).norm()))
        .reduce(|best, next| if next.1 < best.1 { next } else { best })
        .map(|(theta3, _)| theta3)
        .ok_or(KinematicsError::NoRealSolution { theta2_deg })?;

    if !(theta3.is_finite() && theta4.is_finite()) {
        return Err(KinematicsError::NoRealSolution { theta2_deg });
    }
    Ok((theta3, theta4))
}

/// Seed for the iterative solver: closed-form (theta3, theta4) in radians for `theta2_deg`,
/// `None` when no usable closed-form guess exists.
pub fn initial_guess(params: &LinkageParameters, theta2_deg: f64) -> Option<(f64, f64)> {
    match analytical_solution(params, theta2_deg.to_radians()) {
        Ok(guess) => Some(guess),
        Err(e) => {
            debug!("no closed-form guess: {}", e);
            None
        }
    }
}
