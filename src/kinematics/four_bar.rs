use super::NR_loop_closure::NewtonRaphsonSolver;
use super::analytical::initial_guess;
use super::error::KinematicsError;
use super::linkage::{
    AngleState, JointPositions, LinkageParameters, MechanismType, Point2D, joint_positions,
};
use super::sweep::FALLBACK_GUESS_DEG;
use log::debug;

/// Four-bar linkage that remembers its last solved configuration.
///
/// Every call of [`FourBar::set_theta2_degrees`] is seeded with the previous solution,
/// so driving the crank in small steps follows one assembly branch, the same way a
/// [`ContinuationSweep`](super::sweep::ContinuationSweep) does.
#[derive(Debug, Clone)]
pub struct FourBar {
    params: LinkageParameters,
    pub state: AngleState,
    pub solver: NewtonRaphsonSolver,
    solved: bool,
}

impl Default for FourBar {
    fn default() -> Self {
        Self::new()
    }
}

impl FourBar {
    /// linkage with the default 6-2-5-5 crank-rocker
    pub fn new() -> Self {
        Self {
            params: LinkageParameters::default(),
            state: AngleState::default(),
            solver: NewtonRaphsonSolver::new(),
            solved: false,
        }
    }

    pub fn with_params(params: LinkageParameters) -> Result<Self, KinematicsError> {
        params.validate()?;
        Ok(Self {
            params,
            ..Self::new()
        })
    }

    pub fn params(&self) -> &LinkageParameters {
        &self.params
    }

    /// Changes the link lengths and re-solves the current crank angle, seeded with the
    /// configuration found before the change.
    pub fn set_params(&mut self, params: LinkageParameters) -> Result<(), KinematicsError> {
        params.validate()?;
        self.params = params;
        self.set_theta2_degrees(self.state.theta2.to_degrees())
    }

    /// Updates the input angle and solves for theta3 and theta4.
    /// On failure the previous configuration is kept unchanged.
    pub fn set_theta2_degrees(&mut self, theta2_deg: f64) -> Result<(), KinematicsError> {
        let theta2 = theta2_deg.to_radians();
        let guess = if self.solved {
            (self.state.theta3, self.state.theta4)
        } else {
            initial_guess(&self.params, theta2_deg).unwrap_or((
                FALLBACK_GUESS_DEG.0.to_radians(),
                FALLBACK_GUESS_DEG.1.to_radians(),
            ))
        };
        let (theta3, theta4) = self
            .solver
            .try_solve(&self.params, theta2, guess, false)?
            .into_result()?;
        debug!(
            "theta2 = {:.2}°: theta3 = {:.4}°, theta4 = {:.4}°",
            theta2_deg,
            theta3.to_degrees(),
            theta4.to_degrees()
        );
        self.state = AngleState {
            theta2,
            theta3,
            theta4,
        };
        self.solved = true;
        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn positions(&self) -> JointPositions {
        joint_positions(&self.params, &self.state)
    }

    /// Coupler curve: the coupler-rocker joint for every angle that could be solved
    pub fn trace(&mut self, theta2_deg_sequence: &[f64]) -> Vec<Point2D> {
        let mut curve = Vec::with_capacity(theta2_deg_sequence.len());
        for &theta2_deg in theta2_deg_sequence {
            if self.set_theta2_degrees(theta2_deg).is_ok() {
                curve.push(self.positions().p3);
            }
        }
        curve
    }

    pub fn is_grashof(&self) -> bool {
        self.params.is_grashof()
    }

    pub fn mechanism_type(&self) -> MechanismType {
        self.params.mechanism_type()
    }
}
