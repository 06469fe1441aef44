//! Record builders and stub solvers used by unit and behaviour tests.

use std::sync::Mutex;

use geo::Coord;

use crate::{
    Client, Depot, Diagnostics, ModelSolver, RoutingModel, SolveError, SolveOutcome, SolveStatus,
    SolverConfig, Vehicle,
};

/// Depot at `(lon, lat)` holding the default inventory.
pub fn depot(id: &str, lon: f64, lat: f64) -> Depot {
    Depot::new(id, Coord { x: lon, y: lat })
}

/// Client at `(lon, lat)` asking for `demand` units.
pub fn client(id: &str, demand: u32, lon: f64, lat: f64) -> Client {
    Client::new(id, demand, Coord { x: lon, y: lat })
}

pub fn vehicle(id: &str, capacity: u32, range_km: f64) -> Vehicle {
    Vehicle::new(id, capacity, range_km)
}

/// `ModelSolver` that answers with the model's warm start.
///
/// The warm start is returned as [`SolveStatus::Feasible`] when it satisfies
/// the model; otherwise the outcome is [`SolveStatus::Infeasible`].
#[derive(Debug, Default, Copy, Clone)]
pub struct WarmStartSolver;

impl ModelSolver for WarmStartSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        _config: &SolverConfig,
    ) -> Result<SolveOutcome, SolveError> {
        match model.warm_start() {
            Some(warm) if model.is_feasible(warm) => Ok(SolveOutcome {
                status: SolveStatus::Feasible,
                assignment: warm.clone(),
                objective: model.objective_value(warm),
                diagnostics: Diagnostics::default(),
            }),
            _ => Ok(SolveOutcome::without_solution(
                SolveStatus::Infeasible,
                model.variable_count(),
                Diagnostics::default(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
enum Fixed {
    Outcome(SolveOutcome),
    NoSolution(SolveStatus),
    Failure(SolveError),
}

/// `ModelSolver` returning a canned answer and recording the configs it saw.
#[derive(Debug)]
pub struct FixedOutcomeSolver {
    answer: Fixed,
    seen: Mutex<Vec<SolverConfig>>,
}

impl FixedOutcomeSolver {
    /// Always return `outcome` verbatim.
    pub fn new(outcome: SolveOutcome) -> Self {
        Self::from_answer(Fixed::Outcome(outcome))
    }

    /// Return `status` with an unassigned assignment sized to the model.
    pub fn without_solution(status: SolveStatus) -> Self {
        Self::from_answer(Fixed::NoSolution(status))
    }

    /// Fail every call with `error`.
    pub fn failing(error: SolveError) -> Self {
        Self::from_answer(Fixed::Failure(error))
    }

    fn from_answer(answer: Fixed) -> Self {
        Self {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Configs passed to [`ModelSolver::solve`], in call order.
    pub fn seen_configs(&self) -> Vec<SolverConfig> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

impl ModelSolver for FixedOutcomeSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        config: &SolverConfig,
    ) -> Result<SolveOutcome, SolveError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(*config);
        }
        match &self.answer {
            Fixed::Outcome(outcome) => Ok(outcome.clone()),
            Fixed::NoSolution(status) => Ok(SolveOutcome::without_solution(
                *status,
                model.variable_count(),
                Diagnostics::default(),
            )),
            Fixed::Failure(error) => Err(error.clone()),
        }
    }
}
