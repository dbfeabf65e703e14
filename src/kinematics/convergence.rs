use log::info;
use tabled::{builder::Builder, settings::Style};

/// Error norms of a single Newton-Raphson solve, in iteration order.
///
/// The record is created by the solve that fills it and handed back inside its
/// `SolveOutcome`; nothing else appends to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvergenceRecord {
    entries: Vec<(usize, f64)>,
}

impl ConvergenceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, iteration: usize, error_norm: f64) {
        self.entries.push((iteration, error_norm));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (iteration index, error norm) pairs
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, f64)> {
        self.entries.iter()
    }

    pub fn error_norms(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, norm)| norm).collect()
    }

    pub fn final_norm(&self) -> Option<f64> {
        self.entries.last().map(|&(_, norm)| norm)
    }

    /// longest run of consecutive iterations whose error norm grew
    pub fn max_consecutive_increases(&self) -> usize {
        let mut longest = 0;
        let mut run = 0;
        for pair in self.entries.windows(2) {
            if pair[1].1 > pair[0].1 {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        longest
    }

    pub fn log_history(&self) {
        let mut builder = Builder::default();
        builder.push_record(["iteration", "error norm"]);
        for (iteration, norm) in &self.entries {
            builder.push_record([iteration.to_string(), format!("{:.3e}", norm)]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CONVERGENCE HISTORY \n \n {}", table.to_string());
    }
}

impl<'a> IntoIterator for &'a ConvergenceRecord {
    type Item = &'a (usize, f64);
    type IntoIter = std::slice::Iter<'a, (usize, f64)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
