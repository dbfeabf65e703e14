//! Linkage task read from a TOML document
//!
//! ```toml
//! [linkage]
//! r1 = 6.0
//! r2 = 2.0
//! r3 = 5.0
//! r4 = 5.0
//!
//! [solver]
//! tolerance = 1e-9
//! max_iterations = 100
//! singularity_threshold = 1e-9
//! loglevel = "info"
//! log_to_file = false
//!
//! [sweep]
//! start_deg = 0.0
//! end_deg = 360.0
//! step_deg = 1.0
//! seeding = "warm_start"   # or "reseed"
//! track_history = false
//! anchor_from_closed_form = false
//! ```
//! Every section and key is optional, missing ones take the defaults shown above.
use crate::kinematics::NR_loop_closure::NewtonRaphsonSolver;
use crate::kinematics::error::KinematicsError;
use crate::kinematics::linkage::LinkageParameters;
use crate::kinematics::sweep::{ContinuationSweep, SeedingStrategy, SweepResult, angle_range};
use crate::Utils::logger::{init_logger, parse_loglevel};
use log::info;
use std::path::Path;
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkageTask {
    pub params: LinkageParameters,
    pub solver: NewtonRaphsonSolver,
    pub loglevel: String,
    pub log_to_file: bool,
    pub start_deg: f64,
    pub end_deg: f64,
    pub step_deg: f64,
    pub seeding: SeedingStrategy,
    pub track_history: bool,
    pub anchor_from_closed_form: bool,
}

impl Default for LinkageTask {
    fn default() -> Self {
        Self {
            params: LinkageParameters::default(),
            solver: NewtonRaphsonSolver::new(),
            loglevel: "info".to_string(),
            log_to_file: false,
            start_deg: 0.0,
            end_deg: 360.0,
            step_deg: 1.0,
            seeding: SeedingStrategy::default(),
            track_history: false,
            anchor_from_closed_form: false,
        }
    }
}

fn section<'a>(doc: &'a Table, name: &str) -> Result<Option<&'a Table>, KinematicsError> {
    match doc.get(name) {
        None => Ok(None),
        Some(Value::Table(table)) => Ok(Some(table)),
        Some(other) => Err(KinematicsError::Config(format!(
            "[{}] must be a table, got {}",
            name,
            other.type_str()
        ))),
    }
}

fn get_float(table: Option<&Table>, key: &str, default: f64) -> Result<f64, KinematicsError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(default),
        Some(Value::Float(x)) => Ok(*x),
        Some(Value::Integer(i)) => Ok(*i as f64),
        Some(other) => Err(KinematicsError::Config(format!(
            "{} must be a number, got {}",
            key,
            other.type_str()
        ))),
    }
}

fn get_usize(table: Option<&Table>, key: &str, default: usize) -> Result<usize, KinematicsError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(default),
        Some(Value::Integer(i)) if *i >= 0 => Ok(*i as usize),
        Some(other) => Err(KinematicsError::Config(format!(
            "{} must be a non-negative integer, got {}",
            key, other
        ))),
    }
}

fn get_bool(table: Option<&Table>, key: &str, default: bool) -> Result<bool, KinematicsError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(default),
        Some(Value::Boolean(b)) => Ok(*b),
        Some(other) => Err(KinematicsError::Config(format!(
            "{} must be true or false, got {}",
            key, other
        ))),
    }
}

fn get_str<'a>(
    table: Option<&'a Table>,
    key: &str,
    default: &'a str,
) -> Result<&'a str, KinematicsError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(default),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(KinematicsError::Config(format!(
            "{} must be a string, got {}",
            key, other
        ))),
    }
}

impl FromStr for LinkageTask {
    type Err = KinematicsError;

    fn from_str(document: &str) -> Result<Self, Self::Err> {
        let doc: Table = document.parse()?;
        for name in doc.keys() {
            if !["linkage", "solver", "sweep"].contains(&name.as_str()) {
                return Err(KinematicsError::Config(format!("unknown section [{}]", name)));
            }
        }
        let default = LinkageTask::default();
        let linkage = section(&doc, "linkage")?;
        let solver_section = section(&doc, "solver")?;
        let sweep_section = section(&doc, "sweep")?;

        let params = LinkageParameters::new(
            get_float(linkage, "r1", default.params.r1)?,
            get_float(linkage, "r2", default.params.r2)?,
            get_float(linkage, "r3", default.params.r3)?,
            get_float(linkage, "r4", default.params.r4)?,
        )
        .map_err(|e| KinematicsError::Config(e.to_string()))?;

        let mut solver = NewtonRaphsonSolver::new();
        solver
            .set_solver_params(
                Some(get_float(solver_section, "tolerance", default.solver.tolerance)?),
                Some(get_usize(solver_section, "max_iterations", default.solver.max_iterations)?),
                Some(get_float(
                    solver_section,
                    "singularity_threshold",
                    default.solver.singularity_threshold,
                )?),
            )
            .map_err(|e| KinematicsError::Config(e.to_string()))?;
        let loglevel = get_str(solver_section, "loglevel", &default.loglevel)?.to_string();
        parse_loglevel(&loglevel).map_err(|e| KinematicsError::Config(e.to_string()))?;

        let seeding_str = get_str(sweep_section, "seeding", "warm_start")?;
        let seeding = SeedingStrategy::from_str(seeding_str).map_err(|_| {
            KinematicsError::Config(format!(
                "seeding must be warm_start or reseed, got {}",
                seeding_str
            ))
        })?;
        let task = LinkageTask {
            params,
            solver,
            loglevel,
            log_to_file: get_bool(solver_section, "log_to_file", default.log_to_file)?,
            start_deg: get_float(sweep_section, "start_deg", default.start_deg)?,
            end_deg: get_float(sweep_section, "end_deg", default.end_deg)?,
            step_deg: get_float(sweep_section, "step_deg", default.step_deg)?,
            seeding,
            track_history: get_bool(sweep_section, "track_history", default.track_history)?,
            anchor_from_closed_form: get_bool(
                sweep_section,
                "anchor_from_closed_form",
                default.anchor_from_closed_form,
            )?,
        };
        // reject a bad range now rather than at run time
        task.theta2_sequence()
            .map_err(|e| KinematicsError::Config(e.to_string()))?;
        Ok(task)
    }
}

impl LinkageTask {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, KinematicsError> {
        let document = std::fs::read_to_string(path)?;
        document.parse()
    }

    pub fn theta2_sequence(&self) -> Result<Vec<f64>, KinematicsError> {
        angle_range(self.start_deg, self.end_deg, self.step_deg)
    }

    pub fn sweep(&self) -> ContinuationSweep {
        ContinuationSweep {
            solver: self.solver.clone(),
            seeding: self.seeding,
            track_history: self.track_history,
            anchor_from_closed_form: self.anchor_from_closed_form,
        }
    }

    /// Starts the logger the task asks for and runs the sweep
    pub fn run(&self) -> Result<SweepResult, KinematicsError> {
        init_logger(&self.loglevel, self.log_to_file)?;
        info!(
            "linkage r1 = {}, r2 = {}, r3 = {}, r4 = {} ({})",
            self.params.r1,
            self.params.r2,
            self.params.r3,
            self.params.r4,
            self.params.mechanism_type()
        );
        let result = self.sweep().run(&self.params, &self.theta2_sequence()?)?;
        result.log_statistics();
        Ok(result)
    }
}
