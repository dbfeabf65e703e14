//! different utility modules used throughout the project
/// logger set-up and wall-time reporting
pub mod logger;
/// linkage task read from a TOML document
pub mod task_config;
