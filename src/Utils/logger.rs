//! logger set-up shared by the solvers and the demo binary
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;
use std::time::Duration;

use crate::kinematics::error::KinematicsError;

/// Maps "debug", "info", "warn", "error", "off"/"none" onto a level filter
pub fn parse_loglevel(loglevel: &str) -> Result<LevelFilter, KinematicsError> {
    match loglevel.to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(KinematicsError::InvalidSettings(format!(
            "loglevel must be debug, info, warn, error or off, got {}",
            other
        ))),
    }
}

/// Installs the global logger: terminal output and, when `log_to_file` is set,
/// a copy in log_<date_time>.txt.
///
/// Returns false when logging is switched off or a logger was already installed,
/// which is not an error: the first logger of the process keeps running.
pub fn init_logger(loglevel: &str, log_to_file: bool) -> Result<bool, KinematicsError> {
    let level = parse_loglevel(loglevel)?;
    if level == LevelFilter::Off {
        return Ok(false);
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("logger started with loglevel: {}", level);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Logs the elapsed wall time in the most readable unit
pub fn elapsed_time(elapsed: Duration) -> (String, f64) {
    let time = elapsed.as_millis();
    if time < 1000 {
        info!("Elapsed {} ms", time);
        (" ms ".to_string(), time as f64)
    } else if time < 60_000 {
        info!("Elapsed {} s", elapsed.as_secs());
        (" s".to_string(), elapsed.as_secs() as f64)
    } else {
        info!("Elapsed {} min", elapsed.as_secs() / 60);
        (" min".to_string(), elapsed.as_secs() as f64 / 60.0)
    }
}
