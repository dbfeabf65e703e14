//! Continuation over the crank angle.
//!
//! Each converged sample seeds the Newton-Raphson solve of the next one, so the whole
//! sweep stays on the branch selected by the closed-form seed of the first sample.
use super::NR_loop_closure::{NewtonRaphsonSolver, SolveOutcome, SolveStatus};
use super::analytical::initial_guess;
use super::convergence::ConvergenceRecord;
use super::error::KinematicsError;
use super::linkage::LinkageParameters;
use crate::Utils::logger::elapsed_time;
use log::{info, warn};
use rayon::prelude::*;
use std::time::Instant;
use strum_macros::{Display, EnumIter, EnumString};
use tabled::{builder::Builder, settings::Style};

/// fixed seed (theta3, theta4) in degrees used when the closed form has no answer
pub const FALLBACK_GUESS_DEG: (f64, f64) = (45.0, 45.0);
/// largest number of samples `angle_range` will generate
pub const MAX_SAMPLES: usize = 10_000_000;

fn fallback_guess() -> (f64, f64) {
    (
        FALLBACK_GUESS_DEG.0.to_radians(),
        FALLBACK_GUESS_DEG.1.to_radians(),
    )
}

/// Where each sample of a sweep gets its initial guess
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SeedingStrategy {
    /// previous converged sample, closed form only for the first one
    #[default]
    WarmStart,
    /// closed form for every sample; samples are independent and solved in parallel
    Reseed,
}

/// One sample of a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSample {
    pub theta2_deg: f64,
    /// (theta3, theta4) in degrees, `None` when the sample did not converge
    pub angles: Option<(f64, f64)>,
    pub status: SolveStatus,
    pub iterations: usize,
    pub history: Option<ConvergenceRecord>,
}

impl From<SolveOutcome> for SweepSample {
    fn from(outcome: SolveOutcome) -> Self {
        let angles = if outcome.converged {
            Some(outcome.angles_degrees())
        } else {
            None
        };
        SweepSample {
            theta2_deg: outcome.theta2_deg,
            angles,
            status: outcome.status,
            iterations: outcome.iterations,
            history: outcome.history,
        }
    }
}

/// Angles of a finished sweep, in the order of the input sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    samples: Vec<SweepSample>,
}

impl SweepResult {
    pub fn samples(&self) -> &[SweepSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn theta2_deg(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.theta2_deg).collect()
    }

    /// (theta3, theta4) in degrees per sample, `None` for missing samples
    pub fn angles(&self) -> Vec<Option<(f64, f64)>> {
        self.samples.iter().map(|s| s.angles).collect()
    }

    /// theta3 series in degrees with NaN gaps, ready for plotting
    pub fn theta3_deg(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.angles.map_or(f64::NAN, |(theta3, _)| theta3))
            .collect()
    }

    /// theta4 series in degrees with NaN gaps, ready for plotting
    pub fn theta4_deg(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.angles.map_or(f64::NAN, |(_, theta4)| theta4))
            .collect()
    }

    pub fn converged_count(&self) -> usize {
        self.samples.iter().filter(|s| s.angles.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.len() - self.converged_count()
    }

    pub fn missing_indices(&self) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.angles.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count_status(&self, status: SolveStatus) -> usize {
        self.samples.iter().filter(|s| s.status == status).count()
    }

    /// largest change of theta3 or theta4 (degrees) between neighbouring converged samples
    pub fn max_step_deg(&self) -> f64 {
        self.samples
            .windows(2)
            .filter_map(|pair| match (pair[0].angles, pair[1].angles) {
                (Some((a3, a4)), Some((b3, b4))) => Some((b3 - a3).abs().max((b4 - a4).abs())),
                _ => None,
            })
            .fold(0.0, f64::max)
    }

    pub fn statistics(&self) -> Vec<(String, String)> {
        let total_iterations: usize = self.samples.iter().map(|s| s.iterations).sum();
        vec![
            ("number of samples".to_string(), self.len().to_string()),
            ("converged".to_string(), self.converged_count().to_string()),
            (
                "singular Jacobian".to_string(),
                self.count_status(SolveStatus::SingularJacobian).to_string(),
            ),
            (
                "iteration cap reached".to_string(),
                self.count_status(SolveStatus::NotConverged).to_string(),
            ),
            ("total iterations".to_string(), total_iterations.to_string()),
            (
                "max step between samples, deg".to_string(),
                format!("{:.4}", self.max_step_deg()),
            ),
        ]
    }

    pub fn log_statistics(&self) {
        let mut builder = Builder::default();
        for (key, value) in self.statistics() {
            builder.push_record([key, value]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n SWEEP STATISTICS \n \n {}", table.to_string());
    }
}

/// Inclusive sequence start, start + step, ... up to `end_deg`, at most `MAX_SAMPLES` long
pub fn angle_range(
    start_deg: f64,
    end_deg: f64,
    step_deg: f64,
) -> Result<Vec<f64>, KinematicsError> {
    if !(start_deg.is_finite() && end_deg.is_finite()) {
        return Err(KinematicsError::InvalidAngleSequence(
            "range bounds must be finite".to_string(),
        ));
    }
    if !(step_deg.is_finite() && step_deg > 0.0) {
        return Err(KinematicsError::InvalidAngleSequence(format!(
            "step = {} must be positive",
            step_deg
        )));
    }
    if end_deg < start_deg {
        return Err(KinematicsError::InvalidAngleSequence(format!(
            "end = {} is below start = {}",
            end_deg, start_deg
        )));
    }
    let n_steps = ((end_deg - start_deg) / step_deg + 1e-9).floor();
    if !n_steps.is_finite() || n_steps >= MAX_SAMPLES as f64 {
        return Err(KinematicsError::InvalidAngleSequence(format!(
            "range {}..{} with step {} exceeds {} samples",
            start_deg, end_deg, step_deg, MAX_SAMPLES
        )));
    }
    let n_steps = n_steps as usize;
    Ok((0..=n_steps)
        .map(|i| start_deg + i as f64 * step_deg)
        .collect())
}

fn validate_sequence(theta2_deg_sequence: &[f64]) -> Result<(), KinematicsError> {
    if theta2_deg_sequence.is_empty() {
        return Err(KinematicsError::InvalidAngleSequence(
            "sequence is empty".to_string(),
        ));
    }
    if let Some(i) = theta2_deg_sequence.iter().position(|t| !t.is_finite()) {
        return Err(KinematicsError::InvalidAngleSequence(format!(
            "sample {} is not a finite angle",
            i
        )));
    }
    Ok(())
}

/// Sweep driver: a Newton-Raphson solver plus the seeding policy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContinuationSweep {
    pub solver: NewtonRaphsonSolver,
    pub seeding: SeedingStrategy,
    pub track_history: bool,
    /// while no sample has converged yet, seed each sample from the closed form
    pub anchor_from_closed_form: bool,
}

impl ContinuationSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_solver(solver: NewtonRaphsonSolver) -> Self {
        Self {
            solver,
            ..Self::default()
        }
    }

    pub fn run(
        &self,
        params: &LinkageParameters,
        theta2_deg_sequence: &[f64],
    ) -> Result<SweepResult, KinematicsError> {
        params.validate()?;
        validate_sequence(theta2_deg_sequence)?;
        let begin = Instant::now();
        let samples = match self.seeding {
            SeedingStrategy::WarmStart => self.warm_started(params, theta2_deg_sequence),
            SeedingStrategy::Reseed => self.reseeded(params, theta2_deg_sequence),
        };
        elapsed_time(begin.elapsed());
        let result = SweepResult { samples };
        info!(
            "sweep of {} samples ({}): {} converged, {} missing",
            result.len(),
            self.seeding,
            result.converged_count(),
            result.missing_count()
        );
        Ok(result)
    }

    fn warm_started(
        &self,
        params: &LinkageParameters,
        theta2_deg_sequence: &[f64],
    ) -> Vec<SweepSample> {
        let mut guess = initial_guess(params, theta2_deg_sequence[0]).unwrap_or_else(|| {
            warn!(
                "no closed-form guess at theta2 = {:.1}°, using fallback {:?}°",
                theta2_deg_sequence[0], FALLBACK_GUESS_DEG
            );
            fallback_guess()
        });
        let mut anchored = false;
        let mut samples = Vec::with_capacity(theta2_deg_sequence.len());
        for (i, &theta2_deg) in theta2_deg_sequence.iter().enumerate() {
            if i > 0 && !anchored && self.anchor_from_closed_form {
                if let Some(seed) = initial_guess(params, theta2_deg) {
                    guess = seed;
                }
            }
            let outcome = self
                .solver
                .solve(params, theta2_deg.to_radians(), guess, self.track_history);
            if outcome.converged {
                guess = (outcome.theta3, outcome.theta4);
                anchored = true;
            } else {
                // keep the previous seed, not the failed iterate
                warn!(
                    "sample {} (theta2 = {:.1}°) recorded as missing: {}",
                    i, theta2_deg, outcome.status
                );
            }
            samples.push(SweepSample::from(outcome));
        }
        samples
    }

    fn reseeded(
        &self,
        params: &LinkageParameters,
        theta2_deg_sequence: &[f64],
    ) -> Vec<SweepSample> {
        theta2_deg_sequence
            .par_iter()
            .map(|&theta2_deg| {
                let guess = initial_guess(params, theta2_deg).unwrap_or_else(fallback_guess);
                let outcome = self
                    .solver
                    .solve(params, theta2_deg.to_radians(), guess, self.track_history);
                SweepSample::from(outcome)
            })
            .collect()
    }

    /// One warm-started chain per parameter set, the chains run in parallel
    pub fn sweep_independent(
        &self,
        params_list: &[LinkageParameters],
        theta2_deg_sequence: &[f64],
    ) -> Result<Vec<SweepResult>, KinematicsError> {
        params_list
            .par_iter()
            .map(|params| self.run(params, theta2_deg_sequence))
            .collect()
    }
}

/// Sweeps `theta2_deg_sequence` with the default solver and warm starts
pub fn sweep(
    params: &LinkageParameters,
    theta2_deg_sequence: &[f64],
) -> Result<SweepResult, KinematicsError> {
    ContinuationSweep::new().run(params, theta2_deg_sequence)
}
