///  Example
/// ```
///  use RustedLinkage::kinematics::NR_loop_closure::{NewtonRaphsonSolver, SolveStatus};
///  use RustedLinkage::kinematics::linkage::LinkageParameters;
///  use RustedLinkage::kinematics::analytical::initial_guess;
///
///    let params = LinkageParameters::default();
///    let guess = initial_guess(&params, 45.0).unwrap();
///    let solver = NewtonRaphsonSolver::new();
///    let outcome = solver.solve(&params, 45f64.to_radians(), guess, true);
///    assert!(outcome.converged);
///    assert_eq!(outcome.status, SolveStatus::Converged);
///    println!("theta3 = {}, theta4 = {}", outcome.theta3, outcome.theta4);
///  ```
use super::convergence::ConvergenceRecord;
use super::error::KinematicsError;
use super::linkage::LinkageParameters;
use log::{debug, warn};
use nalgebra::{Matrix2, Vector2};
use strum_macros::Display;

/// How a single Newton-Raphson solve ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolveStatus {
    /// |f1| and |f2| below tolerance
    Converged,
    /// |det J| below the singularity threshold, angles are the unrefined iterate
    SingularJacobian,
    /// iteration cap exhausted, angles are the last iterate
    NotConverged,
    /// link lengths, input angle or guess rejected before the first iteration
    InvalidInput,
}

/// Result of one solve. When `converged` is false the angles are the last iterate,
/// not a verified root, and must not be treated as a physical configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub theta2_deg: f64,
    pub theta3: f64, // radians
    pub theta4: f64, // radians
    pub converged: bool,
    pub status: SolveStatus,
    /// number of iterations examined, including the one that ended the solve
    pub iterations: usize,
    /// residual norm at the returned angles
    pub final_error: f64,
    pub history: Option<ConvergenceRecord>,
}

impl SolveOutcome {
    /// converged angles in radians, or the failure as an error value
    pub fn into_result(self) -> Result<(f64, f64), KinematicsError> {
        match self.status {
            SolveStatus::Converged => Ok((self.theta3, self.theta4)),
            SolveStatus::SingularJacobian => Err(KinematicsError::SingularJacobian {
                theta2_deg: self.theta2_deg,
            }),
            SolveStatus::NotConverged => Err(KinematicsError::NotConverged {
                theta2_deg: self.theta2_deg,
                iterations: self.iterations,
            }),
            SolveStatus::InvalidInput => Err(KinematicsError::InvalidParameters(format!(
                "input rejected before solving at theta2 = {}°",
                self.theta2_deg
            ))),
        }
    }

    pub fn angles_degrees(&self) -> (f64, f64) {
        (self.theta3.to_degrees(), self.theta4.to_degrees())
    }
}

/// Newton-Raphson solver of the two loop-closure residuals for (theta3, theta4)
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonRaphsonSolver {
    pub tolerance: f64,             // bound on |f1| and |f2|
    pub max_iterations: usize,      // iteration cap
    pub singularity_threshold: f64, // bound on |det J|
}

impl Default for NewtonRaphsonSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NewtonRaphsonSolver {
    pub fn new() -> NewtonRaphsonSolver {
        NewtonRaphsonSolver {
            tolerance: 1e-9,
            max_iterations: 100,
            singularity_threshold: 1e-9,
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_solver_params(
        &mut self,
        tolerance: Option<f64>,
        max_iterations: Option<usize>,
        singularity_threshold: Option<f64>,
    ) -> Result<(), KinematicsError> {
        if let Some(tolerance) = tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(KinematicsError::InvalidSettings(format!(
                    "tolerance = {} should be a positive number",
                    tolerance
                )));
            }
            self.tolerance = tolerance;
        }
        if let Some(max_iterations) = max_iterations {
            if max_iterations == 0 {
                return Err(KinematicsError::InvalidSettings(
                    "max_iterations should be a positive number".to_string(),
                ));
            }
            self.max_iterations = max_iterations;
        }
        if let Some(threshold) = singularity_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(KinematicsError::InvalidSettings(format!(
                    "singularity_threshold = {} should be a non-negative number",
                    threshold
                )));
            }
            self.singularity_threshold = threshold;
        }
        Ok(())
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// Newton step: solves J*delta = -F with the explicit inverse of the 2x2 Jacobian.
    /// Returns `None` when |det J| is below the singularity threshold.
    pub fn newton_step(&self, jac: &Matrix2<f64>, f: &Vector2<f64>) -> Option<Vector2<f64>> {
        let (j11, j12, j21, j22) = (jac[(0, 0)], jac[(0, 1)], jac[(1, 0)], jac[(1, 1)]);
        let det = j11 * j22 - j12 * j21;
        if det.abs() < self.singularity_threshold {
            return None;
        }
        let inverse = Matrix2::new(j22, -j12, -j21, j11) / det;
        Some(-(inverse * f))
    }

    /// Rejects non-positive or non-finite link lengths, a non-finite input angle and a
    /// non-finite guess before any iteration runs
    pub fn check_input(
        params: &LinkageParameters,
        theta2: f64,
        guess: (f64, f64),
    ) -> Result<(), KinematicsError> {
        params.validate()?;
        if !theta2.is_finite() {
            return Err(KinematicsError::InvalidAngleSequence(format!(
                "theta2 = {} is not a finite angle",
                theta2
            )));
        }
        if !(guess.0.is_finite() && guess.1.is_finite()) {
            return Err(KinematicsError::InvalidAngleSequence(format!(
                "initial guess {:?} is not a pair of finite angles",
                guess
            )));
        }
        Ok(())
    }

    /// Solves the loop closure for `theta2` (radians) starting from `guess` = (theta3, theta4).
    /// Invalid input is returned as an error instead of an outcome.
    pub fn try_solve(
        &self,
        params: &LinkageParameters,
        theta2: f64,
        guess: (f64, f64),
        track_history: bool,
    ) -> Result<SolveOutcome, KinematicsError> {
        Self::check_input(params, theta2, guess)?;
        Ok(self.iterate(params, theta2, guess, track_history))
    }

    /// Same as [`NewtonRaphsonSolver::try_solve`], but rejected input comes back as a
    /// non-converged outcome with status `InvalidInput` and no iterations.
    pub fn solve(
        &self,
        params: &LinkageParameters,
        theta2: f64,
        guess: (f64, f64),
        track_history: bool,
    ) -> SolveOutcome {
        match self.try_solve(params, theta2, guess, track_history) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{}", e);
                SolveOutcome {
                    theta2_deg: theta2.to_degrees(),
                    theta3: guess.0,
                    theta4: guess.1,
                    converged: false,
                    status: SolveStatus::InvalidInput,
                    iterations: 0,
                    final_error: f64::NAN,
                    history: track_history.then(ConvergenceRecord::new),
                }
            }
        }
    }

    /// Every examined iteration is appended to the history before the convergence
    /// check, so the last entry belongs to the iteration that ended the solve.
    fn iterate(
        &self,
        params: &LinkageParameters,
        theta2: f64,
        guess: (f64, f64),
        track_history: bool,
    ) -> SolveOutcome {
        let theta2_deg = theta2.to_degrees();
        let (mut theta3, mut theta4) = guess;
        let mut history = if track_history {
            Some(ConvergenceRecord::with_capacity(self.max_iterations))
        } else {
            None
        };

        for i in 0..self.max_iterations {
            let f = params.residuals(theta2, theta3, theta4);
            let error_norm = f.norm();
            if let Some(history) = history.as_mut() {
                history.push(i, error_norm);
            }
            debug!("theta2 = {:.1}°, iteration = {}, error = {:e}", theta2_deg, i, error_norm);

            if f[0].abs() < self.tolerance && f[1].abs() < self.tolerance {
                return SolveOutcome {
                    theta2_deg,
                    theta3,
                    theta4,
                    converged: true,
                    status: SolveStatus::Converged,
                    iterations: i + 1,
                    final_error: error_norm,
                    history,
                };
            }

            let jac = params.jacobian(theta3, theta4);
            let Some(delta) = self.newton_step(&jac, &f) else {
                warn!("Singularity detected at theta2 = {:.1}°", theta2_deg);
                return SolveOutcome {
                    theta2_deg,
                    theta3,
                    theta4,
                    converged: false,
                    status: SolveStatus::SingularJacobian,
                    iterations: i + 1,
                    final_error: error_norm,
                    history,
                };
            };
            theta3 += delta[0];
            theta4 += delta[1];
        }

        warn!(
            "Max iterations ({}) reached at theta2 = {:.1}°",
            self.max_iterations, theta2_deg
        );
        SolveOutcome {
            theta2_deg,
            theta3,
            theta4,
            converged: false,
            status: SolveStatus::NotConverged,
            iterations: self.max_iterations,
            final_error: params.residuals(theta2, theta3, theta4).norm(),
            history,
        }
    }
}

/// Solves one input angle (degrees) with the default solver settings.
/// `guess` is (theta3, theta4) in radians.
pub fn solve_one(
    params: &LinkageParameters,
    theta2_deg: f64,
    guess: (f64, f64),
    track_history: bool,
) -> SolveOutcome {
    NewtonRaphsonSolver::new().solve(params, theta2_deg.to_radians(), guess, track_history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::analytical::initial_guess;
    use crate::kinematics::linkage::angle_difference_deg;
    use approx::assert_relative_eq;

    #[test]
    fn test_converges_from_offset_guess() {
        let params = LinkageParameters::default();
        let (t3, t4) = initial_guess(&params, 45.0).unwrap();
        let offset = 20f64.to_radians();
        let outcome = solve_one(&params, 45.0, (t3 + offset, t4 + offset), true);
        assert!(outcome.converged);
        assert_eq!(outcome.status, SolveStatus::Converged);
        assert!(outcome.iterations < 20);
        let history = outcome.history.as_ref().unwrap();
        assert_eq!(history.len(), outcome.iterations);
        assert!(history.final_norm().unwrap() < 1e-9);
        assert!(history.max_consecutive_increases() <= 2);
        let tolerance_deg = 1e-6f64.to_degrees();
        let (theta3_deg, theta4_deg) = outcome.angles_degrees();
        assert!(angle_difference_deg(theta3_deg, t3.to_degrees()).abs() < tolerance_deg);
        assert!(angle_difference_deg(theta4_deg, t4.to_degrees()).abs() < tolerance_deg);
    }

    #[test]
    fn test_converged_angles_satisfy_residuals() {
        let params = LinkageParameters::default();
        let outcome = solve_one(&params, 120.0, (0.5, 2.0), false);
        assert!(outcome.converged);
        assert!(outcome.history.is_none());
        let f = params.residuals(120f64.to_radians(), outcome.theta3, outcome.theta4);
        assert!(f[0].abs() < 1e-9 && f[1].abs() < 1e-9);
        assert_relative_eq!(outcome.final_error, f.norm(), epsilon = 1e-15);
        assert!(outcome.clone().into_result().is_ok());
    }

    #[test]
    fn test_exact_guess_converges_without_steps() {
        let params = LinkageParameters::default();
        let guess = initial_guess(&params, 45.0).unwrap();
        let outcome = solve_one(&params, 45.0, guess, true);
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.history.unwrap().entries()[0].0, 0);
        assert_eq!((outcome.theta3, outcome.theta4), guess);
    }

    #[test]
    fn test_singular_jacobian_is_reported_not_raised() {
        // theta3 == theta4 gives det J = r3*r4*sin(theta3 - theta4) = 0
        let params = LinkageParameters::default();
        let outcome = solve_one(&params, 45.0, (0.5, 0.5), true);
        assert!(!outcome.converged);
        assert_eq!(outcome.status, SolveStatus::SingularJacobian);
        assert_eq!((outcome.theta3, outcome.theta4), (0.5, 0.5));
        assert!(outcome.history.as_ref().unwrap().len() >= 1);
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err, KinematicsError::SingularJacobian { theta2_deg: 45.0 });
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let params = LinkageParameters::default();
        let mut solver = NewtonRaphsonSolver::new();
        solver.set_solver_params(None, Some(2), None).unwrap();
        let offset = 20f64.to_radians();
        let (t3, t4) = initial_guess(&params, 45.0).unwrap();
        let outcome = solver.solve(&params, 45f64.to_radians(), (t3 + offset, t4 + offset), true);
        assert!(!outcome.converged);
        assert_eq!(outcome.status, SolveStatus::NotConverged);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.history.as_ref().unwrap().len(), 2);
        assert!(outcome.final_error > 1e-9);
        assert!(matches!(
            outcome.into_result(),
            Err(KinematicsError::NotConverged { iterations: 2, .. })
        ));
    }

    #[test]
    fn test_newton_step_solves_linear_system() {
        let solver = NewtonRaphsonSolver::new();
        let jac = Matrix2::new(2.0, 1.0, 1.0, 3.0);
        let f = Vector2::new(1.0, 2.0);
        let delta = solver.newton_step(&jac, &f).unwrap();
        let back = jac * delta + f;
        assert_relative_eq!(back[0], 0.0, epsilon = 1e-14);
        assert_relative_eq!(back[1], 0.0, epsilon = 1e-14);
        assert!(solver.newton_step(&Matrix2::new(1.0, 2.0, 2.0, 4.0), &f).is_none());
    }

    #[test]
    fn test_invalid_input_is_rejected_before_iterating() {
        let valid = LinkageParameters::default();
        let guess = initial_guess(&valid, 45.0).unwrap();
        for r2 in [0.0, -2.0, f64::NAN] {
            let params = LinkageParameters { r2, ..valid };
            let outcome = solve_one(&params, 45.0, guess, true);
            assert!(!outcome.converged, "r2 = {} accepted", r2);
            assert_eq!(outcome.status, SolveStatus::InvalidInput);
            assert_eq!(outcome.iterations, 0);
            assert!(outcome.history.as_ref().unwrap().is_empty());
            assert!(matches!(
                outcome.into_result(),
                Err(KinematicsError::InvalidParameters(_))
            ));
            let solver = NewtonRaphsonSolver::new();
            assert!(matches!(
                solver.try_solve(&params, 45f64.to_radians(), guess, false),
                Err(KinematicsError::InvalidParameters(_))
            ));
        }
        let outcome = solve_one(&valid, f64::NAN, guess, false);
        assert_eq!(outcome.status, SolveStatus::InvalidInput);
        assert!(matches!(
            NewtonRaphsonSolver::new().try_solve(&valid, f64::INFINITY, guess, false),
            Err(KinematicsError::InvalidAngleSequence(_))
        ));
        let outcome = solve_one(&valid, 45.0, (f64::NAN, guess.1), false);
        assert_eq!(outcome.status, SolveStatus::InvalidInput);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut solver = NewtonRaphsonSolver::new();
        assert!(solver.set_solver_params(Some(0.0), None, None).is_err());
        assert!(solver.set_solver_params(None, Some(0), None).is_err());
        assert!(solver.set_solver_params(None, None, Some(f64::NAN)).is_err());
        solver.set_solver_params(Some(1e-12), Some(50), Some(1e-10)).unwrap();
        assert_eq!(solver.max_iterations, 50);
        assert_eq!(solver.tolerance, 1e-12);
    }
}
