//! Error types for world setup and solving.
//!
//! - `WorldSetupError`: every topology problem found while building a `World`.
//! - `SolverConfigurationError`: the system is structurally unsolvable at the
//!   current pose (not a convergence failure).
//! - `UnableToSolveError`: the solver ran out of budget.
//! - `SolveError`: what `World::solve` returns, one of the two above.

use std::fmt;

/// One problem found during `World::new`.
#[derive(Clone, Debug, PartialEq)]
pub enum SetupIssue {
    /// A rotational constraint names the same body on both ends.
    SelfConstrained { body: String },
    /// More equations than pose scalars.
    OverConstrained { dof: i64 },
}

impl fmt::Display for SetupIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupIssue::SelfConstrained { body } => write!(
                f,
                "rotational constraint binds body '{body}' to itself"
            ),
            SetupIssue::OverConstrained { dof } => write!(
                f,
                "system is over-constrained ({dof} degrees of freedom)"
            ),
        }
    }
}

/// Accumulated setup failures; never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSetupError {
    pub issues: Vec<SetupIssue>,
}

impl WorldSetupError {
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for WorldSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid world ({} issue(s)): ", self.issues.len())?;
        for (k, issue) in self.issues.iter().enumerate() {
            if k > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for WorldSetupError {}

/// The equation system cannot be handled by the solver as posed.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverConfigurationError {
    /// Fewer variables than residual equations.
    Overdetermined { variables: usize, equations: usize },
    /// Residual row `row` has no unclaimed variable with a nonzero derivative.
    InsufficientIndependentVariables { row: usize },
    /// The free sub-Jacobian stayed singular after `attempts` reselections.
    SingularJacobian { attempts: usize },
}

impl fmt::Display for SolverConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overdetermined {
                variables,
                equations,
            } => write!(
                f,
                "over-determined system: {equations} equations for {variables} variables"
            ),
            Self::InsufficientIndependentVariables { row } => write!(
                f,
                "insufficient independent variables: residual row {row} has no free column left"
            ),
            Self::SingularJacobian { attempts } => write!(
                f,
                "singular Jacobian after {attempts} variable reselection(s)"
            ),
        }
    }
}

impl std::error::Error for SolverConfigurationError {}

/// The solver stopped without converging; carries its termination message.
#[derive(Clone, Debug, PartialEq)]
pub struct UnableToSolveError {
    pub message: String,
}

impl fmt::Display for UnableToSolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to solve: {}", self.message)
    }
}

impl std::error::Error for UnableToSolveError {}

/// Failure of `World::solve`.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    Configuration(SolverConfigurationError),
    Unsolved(UnableToSolveError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Configuration(e) => write!(f, "{e}"),
            SolveError::Unsolved(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Configuration(e) => Some(e),
            SolveError::Unsolved(e) => Some(e),
        }
    }
}

impl From<SolverConfigurationError> for SolveError {
    fn from(e: SolverConfigurationError) -> Self {
        SolveError::Configuration(e)
    }
}

impl From<UnableToSolveError> for SolveError {
    fn from(e: UnableToSolveError) -> Self {
        SolveError::Unsolved(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_error_lists_every_issue() {
        let err = WorldSetupError {
            issues: vec![
                SetupIssue::SelfConstrained { body: "a".into() },
                SetupIssue::OverConstrained { dof: -1 },
            ],
        };
        let text = err.to_string();
        assert!(text.contains("2 issue(s)"));
        assert!(text.contains("'a'"));
        assert!(text.contains("-1 degrees"));
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn solve_error_wraps_sources() {
        let e: SolveError = SolverConfigurationError::InsufficientIndependentVariables { row: 3 }.into();
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("row 3"));
    }
}
