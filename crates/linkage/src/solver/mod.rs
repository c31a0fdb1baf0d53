//! Newton-Raphson root finding with a numerical Jacobian.
//!
//! Purpose
//! - Drive a residual function `f: ℝⁿ → ℝᵐ` to zero from an initial guess.
//! - Handle underdetermined systems (`n > m`) by solving for `m` "free"
//!   variables per step and holding the other `n − m` at their current value.
//!
//! Loop (both cases)
//! - `error = max |f(x)|`; iterate while `error ≥ stop_error`.
//! - At the top of each iteration check the iteration budget, then the
//!   wall-clock budget; either one ends the run with a best-effort `Solution`.
//! - Step: `J_free · h = -f(x)` by LU with partial pivoting, `x_free += h`.
//!
//! Underdetermined specifics
//! - The free set comes from `select::select_free_columns` on iteration 0 and
//!   every `reselect_every` iterations afterwards.
//! - A singular free sub-Jacobian triggers a reselection against the same
//!   Jacobian (no iteration consumed, no budget check). After
//!   `max_reselections` failed reselections the system is reported as
//!   structurally singular.
//!
//! Errors vs outcomes
//! - `Err(SolverConfigurationError)`: the problem is not well posed here
//!   (`n < m`, dependent rows, persistent singularity).
//! - `Ok(Solution)` with `solved() == false`: the budget ran out.

mod cfg;
mod jacobian;
mod select;
mod solution;

pub use cfg::{SolverCfg, TieBreak};
pub use jacobian::numerical_jacobian;
pub use select::select_free_columns;
pub use solution::{Solution, Termination};

use std::time::Instant;

use nalgebra::{DMatrix, DVector};

use crate::error::SolverConfigurationError;

/// Newton-Raphson solver; holds only its configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Solver {
    cfg: SolverCfg,
}

impl Solver {
    pub fn new(cfg: SolverCfg) -> Self {
        Self { cfg }
    }

    #[inline]
    pub fn cfg(&self) -> &SolverCfg {
        &self.cfg
    }

    /// Solve `f(x) = 0` starting from `x0`.
    pub fn solve<F>(&self, f: F, x0: DVector<f64>) -> Result<Solution, SolverConfigurationError>
    where
        F: Fn(&DVector<f64>) -> DVector<f64>,
    {
        let cfg = &self.cfg;
        let start = Instant::now();
        let n = x0.len();
        let mut x = x0;
        let mut y = f(&x);
        let m = y.len();
        if n < m {
            return Err(SolverConfigurationError::Overdetermined {
                variables: n,
                equations: m,
            });
        }
        let determined = n == m;
        let reselect_every = cfg.reselect_every.max(1);

        let mut error = max_abs(&y);
        let mut iterations = 0usize;
        let mut free: Vec<usize> = (0..n).collect();

        // Negated test so a NaN error never counts as converged.
        while !(error < cfg.stop_error) {
            if iterations >= cfg.max_iterations {
                tracing::debug!(iterations, error, "iteration budget exhausted");
                return Ok(Solution::max_iterations_reached(x, iterations, error));
            }
            if start.elapsed() >= cfg.timeout {
                tracing::debug!(iterations, error, "time budget exhausted");
                return Ok(Solution::timed_out(x, iterations, error));
            }

            let jac = numerical_jacobian(&f, &x, &y, cfg.jacobian_delta);
            let h = if determined {
                jac.lu()
                    .solve(&-&y)
                    .ok_or(SolverConfigurationError::SingularJacobian { attempts: 0 })?
            } else {
                let reselect = iterations % reselect_every == 0;
                self.free_step(&jac, &y, &mut free, reselect, iterations)?
            };

            for (k, &col) in free.iter().enumerate() {
                x[col] += h[k];
            }
            y = f(&x);
            error = max_abs(&y);
            iterations += 1;
            tracing::debug!(iteration = iterations, error, "newton step");
        }
        Ok(Solution::success(x, iterations, error))
    }

    /// Step for the free columns of an underdetermined system.
    ///
    /// A singular sub-Jacobian reselects against the same `jac`, up to
    /// `max_reselections` times, without consuming an iteration.
    fn free_step(
        &self,
        jac: &DMatrix<f64>,
        y: &DVector<f64>,
        free: &mut Vec<usize>,
        mut reselect: bool,
        iteration: usize,
    ) -> Result<DVector<f64>, SolverConfigurationError> {
        let cfg = &self.cfg;
        let mut attempt = 0usize;
        loop {
            if reselect {
                match select_free_columns(jac, cfg.tie_break, attempt) {
                    Ok(cols) => {
                        tracing::debug!(iteration, attempt, free = ?cols, "selected free variables");
                        *free = cols;
                    }
                    Err(e) if attempt == 0 => return Err(e),
                    Err(_) => {
                        attempt = next_attempt(attempt, cfg.max_reselections)?;
                        continue;
                    }
                }
            }
            if let Some(h) = jac.select_columns(free.iter()).lu().solve(&-y) {
                return Ok(h);
            }
            tracing::warn!(iteration, attempt, "singular sub-Jacobian, reselecting");
            attempt = next_attempt(attempt, cfg.max_reselections)?;
            reselect = true;
        }
    }
}

fn next_attempt(attempt: usize, limit: usize) -> Result<usize, SolverConfigurationError> {
    if attempt >= limit {
        return Err(SolverConfigurationError::SingularJacobian { attempts: attempt });
    }
    Ok(attempt + 1)
}

/// `max |v_i|`, or infinity if any component is not finite; 0 for an empty vector.
pub fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, e| {
        if e.is_finite() {
            acc.max(e.abs())
        } else {
            f64::INFINITY
        }
    })
}
