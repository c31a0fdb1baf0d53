//! World: body registry, equation assembly, and solve.
//!
//! Purpose
//! - Turn a constraint topology into one residual function over a flat state
//!   vector and hand it to the Newton solver.
//! - Validate the topology once, up front, reporting every problem together.
//!
//! Layout
//! - Bodies are registered by visiting constraints in residual order
//!   (rotational first, then fixed) and keeping the first handle seen per id.
//!   Body `i` owns state slots `[3i, 3i+1, 3i+2]` = `(x, y, theta)`.
//! - Residuals: every rotational pair in input order, then every fixed triple.
//! - `dof = 3·bodies − 2·rotational − 3·fixed`; negative is rejected.
//!
//! Mutation
//! - Poses are read from the live bodies at the start of each solve and
//!   written back through the registry only when the solver converged.

use std::collections::HashMap;
use std::rc::Rc;

use nalgebra::DVector;

use crate::body::{BodyRef, Pose};
use crate::constraint::{Constraint, FixedConstraint, RotationalConstraint};
use crate::error::{SetupIssue, SolveError, UnableToSolveError, WorldSetupError};
use crate::solver::{max_abs, Solution, Solver, SolverCfg};

/// Validated constraint system over a set of shared bodies.
#[derive(Debug)]
pub struct World {
    registry: HashMap<String, BodyRef>,
    /// Body ids in slot order.
    order: Vec<String>,
    /// Rotational constraints first, then fixed ones.
    constraints: Vec<Constraint>,
    /// Body slot indices per constraint, parallel to `constraints`.
    slots: Vec<Vec<usize>>,
    n_rotational: usize,
    n_fixed: usize,
    dof: i64,
    solver: Solver,
}

impl World {
    /// Build and validate a world from constraints of either kind.
    pub fn new(constraints: Vec<Constraint>) -> Result<Self, WorldSetupError> {
        let (rotational, fixed): (Vec<_>, Vec<_>) = constraints
            .into_iter()
            .partition(|c| matches!(c, Constraint::Rotational(_)));
        let n_rotational = rotational.len();
        let n_fixed = fixed.len();
        let constraints: Vec<Constraint> = rotational.into_iter().chain(fixed).collect();

        let mut issues = Vec::new();
        let mut registry: HashMap<String, BodyRef> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut slots = Vec::with_capacity(constraints.len());
        for c in &constraints {
            if let Constraint::Rotational(rc) = c {
                if rc.is_self_referencing() {
                    issues.push(SetupIssue::SelfConstrained {
                        body: rc.body_a.borrow().id.clone(),
                    });
                }
            }
            let mut body_slots = Vec::with_capacity(2);
            for body in c.bodies() {
                let id = body.borrow().id.clone();
                let slot = match index.get(&id) {
                    Some(&slot) => slot,
                    None => {
                        registry.insert(id.clone(), Rc::clone(body));
                        index.insert(id.clone(), order.len());
                        order.push(id);
                        order.len() - 1
                    }
                };
                body_slots.push(slot);
            }
            slots.push(body_slots);
        }

        let dof = 3 * order.len() as i64 - 2 * n_rotational as i64 - 3 * n_fixed as i64;
        if dof < 0 {
            issues.push(SetupIssue::OverConstrained { dof });
        }
        if !issues.is_empty() {
            return Err(WorldSetupError { issues });
        }

        tracing::debug!(
            bodies = order.len(),
            rotational = n_rotational,
            fixed = n_fixed,
            dof,
            "world assembled"
        );
        Ok(Self {
            registry,
            order,
            constraints,
            slots,
            n_rotational,
            n_fixed,
            dof,
            solver: Solver::default(),
        })
    }

    /// Same as [`World::new`] with the two constraint kinds given separately.
    pub fn from_parts(
        rotational: Vec<RotationalConstraint>,
        fixed: Vec<FixedConstraint>,
    ) -> Result<Self, WorldSetupError> {
        Self::new(
            rotational
                .into_iter()
                .map(Constraint::from)
                .chain(fixed.into_iter().map(Constraint::from))
                .collect(),
        )
    }

    /// Replace the solver configuration used by [`World::solve`].
    pub fn with_solver_cfg(mut self, cfg: SolverCfg) -> Self {
        self.solver = Solver::new(cfg);
        self
    }

    #[inline]
    pub fn solver_cfg(&self) -> &SolverCfg {
        self.solver.cfg()
    }

    /// Id → body registry.
    #[inline]
    pub fn bodies(&self) -> &HashMap<String, BodyRef> {
        &self.registry
    }

    #[inline]
    pub fn body(&self, id: &str) -> Option<&BodyRef> {
        self.registry.get(id)
    }

    /// Bodies in slot order.
    pub fn ordered_bodies(&self) -> impl Iterator<Item = &BodyRef> + '_ {
        self.order.iter().filter_map(|id| self.registry.get(id))
    }

    /// First state slot (`x`) of body `id`.
    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|known| known == id).map(|i| 3 * i)
    }

    #[inline]
    pub fn dof(&self) -> i64 {
        self.dof
    }

    #[inline]
    pub fn variable_count(&self) -> usize {
        3 * self.order.len()
    }

    #[inline]
    pub fn equation_count(&self) -> usize {
        RotationalConstraint::EQUATIONS * self.n_rotational
            + FixedConstraint::EQUATIONS * self.n_fixed
    }

    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// State vector seeded from the bodies' live poses.
    pub fn state(&self) -> DVector<f64> {
        let mut x = DVector::zeros(self.variable_count());
        for (i, body) in self.ordered_bodies().enumerate() {
            let p = body.borrow().pose.to_array();
            x.rows_mut(3 * i, 3).copy_from_slice(&p);
        }
        x
    }

    /// Residual vector for `state`; zero exactly when every constraint holds.
    pub fn residual(&self, state: &DVector<f64>) -> DVector<f64> {
        let s = state.as_slice();
        let mut out = Vec::with_capacity(self.equation_count());
        let mut poses: Vec<Pose> = Vec::with_capacity(2);
        for (c, body_slots) in self.constraints.iter().zip(&self.slots) {
            poses.clear();
            poses.extend(
                body_slots
                    .iter()
                    .map(|&i| Pose::from_slice(&s[3 * i..3 * i + 3])),
            );
            c.append_residuals(&poses, &mut out);
        }
        DVector::from_vec(out)
    }

    /// `max |residual|` at the bodies' current poses.
    pub fn max_residual(&self) -> f64 {
        max_abs(&self.residual(&self.state()))
    }

    /// Run the solver from the live poses; on convergence write poses back.
    ///
    /// Leaves every body untouched on error.
    pub fn solve(&mut self) -> Result<&mut Self, SolveError> {
        let solution = self.run_solver()?;
        if !solution.solved() {
            tracing::info!(
                iterations = solution.iterations(),
                error = solution.error(),
                reason = %solution.termination(),
                "solve failed"
            );
            return Err(UnableToSolveError {
                message: solution.message(),
            }
            .into());
        }
        tracing::info!(
            iterations = solution.iterations(),
            error = solution.error(),
            "solve converged"
        );
        self.write_back(solution.x());
        Ok(self)
    }

    /// Solver outcome without touching the bodies.
    pub fn run_solver(&self) -> Result<Solution, SolveError> {
        let x0 = self.state();
        self.solver
            .solve(|x| self.residual(x), x0)
            .map_err(SolveError::from)
    }

    fn write_back(&self, x: &DVector<f64>) {
        for (i, body) in self.ordered_bodies().enumerate() {
            body.borrow_mut().pose = Pose::from_slice(&x.as_slice()[3 * i..3 * i + 3]);
        }
    }
}
