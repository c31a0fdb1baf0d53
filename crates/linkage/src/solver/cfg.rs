//! Solver configuration.
//!
//! Defaults: stop error `1e-6`, `1000` iterations, one hour wall clock,
//! Jacobian step `1e-9`, free-variable reselection every 10 iterations.

use std::time::Duration;

/// How the selection heuristic picks among a row's eligible columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Largest `|∂f/∂x|` wins, lowest index among equals.
    #[default]
    LargestMagnitude,
    /// Lowest column index wins.
    LowestIndex,
    /// Uniform pick from a `StdRng` seeded with this value.
    Seeded(u64),
}

/// Newton-Raphson stopping rules and numerical knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverCfg {
    /// Converged once `max |f(x)| < stop_error`.
    pub stop_error: f64,
    /// Iteration budget; `usize::MAX` is effectively unbounded.
    pub max_iterations: usize,
    /// Wall-clock budget, checked at the top of every iteration.
    pub timeout: Duration,
    /// Forward-difference step for the numerical Jacobian.
    pub jacobian_delta: f64,
    /// Underdetermined systems recompute the free variables every this many iterations.
    pub reselect_every: usize,
    /// Reselections tried after a singular sub-Jacobian before giving up.
    pub max_reselections: usize,
    pub tie_break: TieBreak,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self {
            stop_error: 1e-6,
            max_iterations: 1000,
            timeout: Duration::from_millis(3_600_000),
            jacobian_delta: 1e-9,
            reselect_every: 10,
            max_reselections: 32,
            tie_break: TieBreak::LargestMagnitude,
        }
    }
}

impl SolverCfg {
    pub fn with_stop_error(mut self, stop_error: f64) -> Self {
        self.stop_error = stop_error;
        self
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_jacobian_delta(mut self, delta: f64) -> Self {
        self.jacobian_delta = delta;
        self
    }
    pub fn with_reselect_every(mut self, every: usize) -> Self {
        self.reselect_every = every;
        self
    }
    pub fn with_max_reselections(mut self, max_reselections: usize) -> Self {
        self.max_reselections = max_reselections;
        self
    }
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}
