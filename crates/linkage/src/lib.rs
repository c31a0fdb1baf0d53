//! Planar rigid-body positioning by constraint solving.
//!
//! Bodies carry a pose `(x, y, theta)`. Constraints pin bodies to fixed poses
//! or pin two bodies together at matching anchor points. A `World` turns the
//! constraint topology into a residual function over all pose scalars and
//! solves it with Newton-Raphson on a numerical Jacobian, choosing a subset of
//! free variables when there are more unknowns than equations.
//!
//! Module map
//! - `geom`: vector algebra and frame transforms over `nalgebra::Vector2`.
//! - `body`, `constraint`: data model.
//! - `world`: registry, validation, residual assembly, write-back.
//! - `solver`: Newton loop, Jacobian, free-variable selection, `Solution`.
//! - `error`: setup and solve errors.

pub mod body;
pub mod constraint;
pub mod error;
pub mod geom;
pub mod solver;
pub mod world;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use body::{Body, BodyRef, Pose};
pub use constraint::{Constraint, FixedConstraint, ResidualForm, RotationalConstraint};
pub use error::{
    SetupIssue, SolveError, SolverConfigurationError, UnableToSolveError, WorldSetupError,
};
pub use geom::Vec2;
pub use solver::{Solution, Solver, SolverCfg, Termination, TieBreak};
pub use world::World;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::body::{Body, BodyRef, Pose};
    pub use crate::constraint::{Constraint, FixedConstraint, ResidualForm, RotationalConstraint};
    pub use crate::error::{SolveError, WorldSetupError};
    pub use crate::geom::Vec2;
    pub use crate::solver::{SolverCfg, TieBreak};
    pub use crate::world::World;
    pub use nalgebra::vector;
}
