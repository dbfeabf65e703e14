//! examples of usage of RustedLinkage
/// crank sweeps, single solves, coupler curves and TOML tasks
pub mod linkage_examples;
