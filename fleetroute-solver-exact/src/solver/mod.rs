//! `ExactSolver` implementation of [`ModelSolver`].

use std::time::Instant;

use fleetroute_core::{
    ClientIndex, Diagnostics, ModelSolver, RoutingModel, SolveError, SolveOutcome, SolveStatus,
    SolverConfig,
};

use crate::search::{Budget, Incumbent, Search, SearchResult};

/// Configuration for [`ExactSolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactSolverConfig {
    /// Upper bound on search nodes; `None` leaves only the time limit.
    pub max_nodes: Option<u64>,
}

/// Branch-and-bound solver over depot-rooted tours.
///
/// The search starts from the model's warm start when it is feasible and
/// explores every capacity- and range-respecting tour assignment, with each
/// vehicle free to start and end at any one depot, pruning
/// with the cheapest entry arc of each unserved client. A finished search
/// reports [`SolveStatus::Optimal`] or [`SolveStatus::Infeasible`]; a search
/// cut short by the budget reports [`SolveStatus::Feasible`] with the best
/// assignment so far, or [`SolveStatus::TimeLimitReached`] without one.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::{
///     ArcNetwork, Client, CostParameters, Depot, FleetProblem, ModelSolver, RoutingModel,
///     SolveStatus, SolverConfig, Vehicle,
/// };
/// use fleetroute_solver_exact::ExactSolver;
///
/// let problem = FleetProblem::new(
///     vec![Depot::new("D1", Coord { x: 0.0, y: 0.0 })],
///     vec![Client::new("C1", 2, Coord { x: 0.01, y: 0.0 })],
///     vec![Vehicle::new("V1", 5, 10.0)],
/// )
/// .expect("valid problem");
/// let network = ArcNetwork::for_problem(&problem);
/// let model = RoutingModel::builder(&problem, &network, CostParameters::default()).build();
/// let outcome = ExactSolver::new()
///     .solve(&model, &SolverConfig::default())
///     .expect("solve");
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExactSolver {
    config: ExactSolverConfig,
}

impl ExactSolver {
    /// Construct a solver with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: ExactSolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ExactSolverConfig {
        &self.config
    }
}

impl ModelSolver for ExactSolver {
    fn solve(
        &self,
        model: &RoutingModel,
        config: &SolverConfig,
    ) -> Result<SolveOutcome, SolveError> {
        if config.time_limit.is_zero() {
            return Err(SolveError::InvalidConfig {
                reason: "time limit must be positive".to_owned(),
            });
        }
        let started = Instant::now();

        if let Some(reason) = infeasibility_reason(model) {
            log::info!("model is infeasible: {reason}");
            return Ok(SolveOutcome::without_solution(
                SolveStatus::Infeasible,
                model.variable_count(),
                Diagnostics {
                    solve_time: started.elapsed(),
                    nodes_explored: 0,
                },
            ));
        }

        let warm = model
            .warm_start()
            .filter(|warm| model.is_feasible(warm))
            .and_then(|warm| {
                model.objective_value(warm).map(|objective| Incumbent {
                    objective,
                    assignment: warm.clone(),
                })
            });
        if warm.is_none() {
            log::debug!("no feasible warm start; searching from scratch");
        }

        let budget = Budget {
            started,
            time_limit: config.time_limit,
            max_nodes: self.config.max_nodes,
        };
        let result = Search::new(model, budget, warm).run();
        Ok(outcome_from(model, result, started))
    }
}

fn outcome_from(model: &RoutingModel, result: SearchResult, started: Instant) -> SolveOutcome {
    let diagnostics = Diagnostics {
        solve_time: started.elapsed(),
        nodes_explored: result.nodes,
    };
    match (result.incumbent, result.completed) {
        (Some(best), completed) => SolveOutcome {
            status: if completed {
                SolveStatus::Optimal
            } else {
                log::warn!("search budget spent; returning best assignment found");
                SolveStatus::Feasible
            },
            objective: Some(best.objective),
            assignment: best.assignment,
            diagnostics,
        },
        (None, true) => SolveOutcome::without_solution(
            SolveStatus::Infeasible,
            model.variable_count(),
            diagnostics,
        ),
        (None, false) => {
            log::warn!("search budget spent before any feasible assignment");
            SolveOutcome::without_solution(
                SolveStatus::TimeLimitReached,
                model.variable_count(),
                diagnostics,
            )
        }
    }
}

/// A reason no assignment can satisfy `model`, found without searching.
#[expect(
    clippy::float_arithmetic,
    reason = "inventory check scales demand by the loss factor"
)]
fn infeasibility_reason(model: &RoutingModel) -> Option<String> {
    let parameters = model.parameters();
    let network = model.network();
    let shipped: f64 = parameters
        .demands
        .iter()
        .map(|demand| f64::from(*demand) * parameters.costs.inventory_loss_factor)
        .sum();
    if shipped > f64::from(parameters.reference_inventory) {
        return Some(format!(
            "total demand {shipped} exceeds depot inventory {}",
            parameters.reference_inventory
        ));
    }
    let largest_capacity = parameters.capacities.iter().copied().max().unwrap_or(0);
    for (idx, demand) in parameters.demands.iter().enumerate() {
        let node = parameters.client_node(ClientIndex(idx));
        if network.incoming(node).is_empty() || network.outgoing(node).is_empty() {
            return Some(format!("client node {} has no feasible arc", node.get()));
        }
        if *demand > largest_capacity {
            return Some(format!(
                "client node {} demands {demand} units, more than any vehicle carries",
                node.get()
            ));
        }
    }
    None
}
