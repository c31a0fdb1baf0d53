//! Solver outcome.

use std::fmt;

use nalgebra::DVector;

/// Why the Newton loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Converged,
    TimedOut,
    MaxIterationsReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Termination::Converged => "solution found",
            Termination::TimedOut => "timed out before converging",
            Termination::MaxIterationsReached => "maximum number of iterations reached",
        };
        f.write_str(text)
    }
}

/// Final (or best-effort) state vector plus how the solver got there.
///
/// Only the three named constructors exist, so `solved` and the message
/// always agree.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    x: DVector<f64>,
    termination: Termination,
    iterations: usize,
    error: f64,
}

impl Solution {
    pub fn success(x: DVector<f64>, iterations: usize, error: f64) -> Self {
        Self::build(x, Termination::Converged, iterations, error)
    }

    pub fn timed_out(x: DVector<f64>, iterations: usize, error: f64) -> Self {
        Self::build(x, Termination::TimedOut, iterations, error)
    }

    pub fn max_iterations_reached(x: DVector<f64>, iterations: usize, error: f64) -> Self {
        Self::build(x, Termination::MaxIterationsReached, iterations, error)
    }

    fn build(x: DVector<f64>, termination: Termination, iterations: usize, error: f64) -> Self {
        Self {
            x,
            termination,
            iterations,
            error,
        }
    }

    #[inline]
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }
    #[inline]
    pub fn into_x(self) -> DVector<f64> {
        self.x
    }
    #[inline]
    pub fn solved(&self) -> bool {
        self.termination == Termination::Converged
    }
    #[inline]
    pub fn termination(&self) -> Termination {
        self.termination
    }
    pub fn message(&self) -> String {
        self.termination.to_string()
    }
    /// Newton steps taken (singular retries excluded).
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    /// `max |f(x)|` at the returned `x`.
    #[inline]
    pub fn error(&self) -> f64 {
        self.error
    }
}
