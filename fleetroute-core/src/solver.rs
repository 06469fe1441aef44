use std::time::Duration;

use thiserror::Error;

use crate::model::{Assignment, RoutingModel};

/// Default wall-clock budget for a solve.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(100);

/// Parameters for a solve request.
///
/// # Examples
/// ```rust
/// use std::time::Duration;
/// use fleetroute_core::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.time_limit, Duration::from_secs(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock budget; backends stop searching once it is spent.
    pub time_limit: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
        }
    }
}

/// How a solve ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// The assignment is proven optimal.
    Optimal,
    /// A feasible assignment was found but not proven optimal within the limit.
    Feasible,
    /// The model has no feasible assignment.
    Infeasible,
    /// The limit was reached before any feasible assignment was found.
    TimeLimitReached,
    /// The backend failed without a usable answer.
    Error,
}

impl SolveStatus {
    /// Whether the outcome carries an assignment worth decoding.
    pub const fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Search statistics reported by a backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Time spent inside the backend.
    pub solve_time: Duration,
    /// Search nodes visited, when the backend counts them.
    pub nodes_explored: u64,
}

/// Response from a solve.
///
/// Carries one value per model variable. Outcomes without a solution hold
/// an all-unassigned assignment and no objective.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub assignment: Assignment,
    pub objective: Option<f64>,
    pub diagnostics: Diagnostics,
}

impl SolveOutcome {
    /// An outcome without a solution for a model with `variable_count` variables.
    pub fn without_solution(
        status: SolveStatus,
        variable_count: usize,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            status,
            assignment: Assignment::unassigned(variable_count),
            objective: None,
            diagnostics,
        }
    }
}

/// Errors returned by [`ModelSolver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The solver configuration cannot be honoured, e.g. a zero time limit.
    #[error("invalid solver configuration: {reason}")]
    InvalidConfig { reason: String },
    /// The backend returned values for a different number of variables.
    #[error("solver returned {actual} values for a model with {expected} variables")]
    AssignmentLength { expected: usize, actual: usize },
    /// The backend failed internally.
    #[error("solver backend failed: {message}")]
    Backend { message: String },
}

/// Resolve a [`RoutingModel`] into variable values.
///
/// Infeasibility and exhausted time limits are reported through
/// [`SolveStatus`], not as errors. Implementations return [`SolveError`] only
/// when they cannot run at all. Solvers must be `Send + Sync` to operate
/// safely across threads.
pub trait ModelSolver: Send + Sync {
    /// Solve `model` within the budget in `config`.
    fn solve(&self, model: &RoutingModel, config: &SolverConfig)
    -> Result<SolveOutcome, SolveError>;
}

impl<T: ModelSolver + ?Sized> ModelSolver for Box<T> {
    fn solve(
        &self,
        model: &RoutingModel,
        config: &SolverConfig,
    ) -> Result<SolveOutcome, SolveError> {
        (**self).solve(model, config)
    }
}
