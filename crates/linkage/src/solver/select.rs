//! Free-variable selection for underdetermined Newton steps.
//!
//! Picks `m` of the `n` Jacobian columns so the `m×m` sub-Jacobian has a
//! chance of being invertible:
//! - Rows with fewer nonzero entries go first (stable order), so tightly
//!   constrained equations get first pick among their few columns.
//! - Each row claims its most preferred unclaimed column with a nonzero entry.
//!   By default the candidate with the largest `|∂f/∂x|` wins, which for pin
//!   joints prefers translations over rotations and keeps steps well scaled.
//! - A row that finds every candidate claimed tries to reroute an earlier
//!   row onto another of its columns (augmenting path), so closed loops do
//!   not fail just because an earlier row grabbed a shared column.
//! - A row that still has no column means the constraints are dependent at
//!   the current pose.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::cfg::TieBreak;
use crate::error::SolverConfigurationError;

/// Returns the selected column indices in ascending order.
///
/// `attempt > 0` marks a retry after a singular sub-Jacobian; retries always
/// break ties through a `StdRng` derived from `(seed, attempt)` so they can
/// land on a different partition while staying reproducible.
pub fn select_free_columns(
    jac: &DMatrix<f64>,
    tie_break: TieBreak,
    attempt: usize,
) -> Result<Vec<usize>, SolverConfigurationError> {
    let (m, n) = jac.shape();
    let mut rows: Vec<usize> = (0..m).collect();
    rows.sort_by_key(|&row| (0..n).filter(|&col| jac[(row, col)] != 0.0).count());

    let rng = match (tie_break, attempt) {
        (TieBreak::Seeded(seed), k) => Some(StdRng::seed_from_u64(mix(seed, k))),
        (_, 0) => None,
        (_, k) => Some(StdRng::seed_from_u64(mix(0, k))),
    };
    let mut claims = Claims {
        jac,
        tie_break,
        rng,
        owner: vec![None; n],
    };

    for row in rows {
        let ranked = claims.ranked(row);
        if let Some(&col) = ranked.iter().find(|&&col| claims.owner[col].is_none()) {
            claims.owner[col] = Some(row);
            continue;
        }
        let mut seen = vec![false; n];
        if !claims.reroute(row, &mut seen) {
            return Err(SolverConfigurationError::InsufficientIndependentVariables { row });
        }
    }
    Ok((0..n).filter(|&col| claims.owner[col].is_some()).collect())
}

/// Column ownership during one selection pass.
struct Claims<'a> {
    jac: &'a DMatrix<f64>,
    tie_break: TieBreak,
    rng: Option<StdRng>,
    /// Row that currently holds each column.
    owner: Vec<Option<usize>>,
}

impl Claims<'_> {
    /// Nonzero columns of `row`, most preferred first.
    fn ranked(&mut self, row: usize) -> Vec<usize> {
        let (jac, tie_break) = (self.jac, self.tie_break);
        let mut cols: Vec<usize> = (0..jac.ncols())
            .filter(|&col| jac[(row, col)] != 0.0)
            .collect();
        match self.rng.as_mut() {
            Some(rng) => cols.shuffle(rng),
            // Stable sort: equal magnitudes keep ascending index.
            None if tie_break == TieBreak::LargestMagnitude => {
                cols.sort_by(|&a, &b| jac[(row, b)].abs().total_cmp(&jac[(row, a)].abs()))
            }
            None => {}
        }
        cols
    }

    /// Give `row` a column, moving earlier holders along alternating paths.
    /// `seen` marks columns already visited in this search.
    fn reroute(&mut self, row: usize, seen: &mut [bool]) -> bool {
        for col in self.ranked(row) {
            if seen[col] {
                continue;
            }
            seen[col] = true;
            let available = match self.owner[col] {
                None => true,
                Some(holder) => self.reroute(holder, seen),
            };
            if available {
                self.owner[col] = Some(row);
                return true;
            }
        }
        false
    }
}

#[inline]
fn mix(seed: u64, attempt: usize) -> u64 {
    seed ^ (attempt as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
