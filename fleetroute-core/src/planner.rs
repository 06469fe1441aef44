//! Sequential planning pipeline around a [`ModelSolver`].
//!
//! network -> heuristic seed -> routing model -> solver -> decoder.

use thiserror::Error;

use crate::costs::CostParameters;
use crate::decode::{DEFAULT_AVERAGE_SPEED_KMH, DecodeError, SolutionDecoder, VehicleRoute};
use crate::heuristic::HeuristicSeed;
use crate::model::RoutingModel;
use crate::network::ArcNetwork;
use crate::problem::FleetProblem;
use crate::solver::{Diagnostics, ModelSolver, SolveError, SolveStatus, SolverConfig};

/// Settings for one planning run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    pub costs: CostParameters,
    pub solver: SolverConfig,
    /// Speed used for reported driving times.
    pub average_speed_kmh: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            costs: CostParameters::default(),
            solver: SolverConfig::default(),
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
        }
    }
}

/// Result of a planning run.
///
/// Infeasible and time-limited runs are plans too: they carry no routes and
/// list every vehicle as idle.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetPlan {
    pub status: SolveStatus,
    pub routes: Vec<VehicleRoute>,
    pub idle_vehicles: Vec<String>,
    /// Clients no feasible arc reaches.
    pub unreachable_clients: Vec<String>,
    /// Objective value of the returned assignment.
    pub objective: Option<f64>,
    /// Objective cost of the greedy seed.
    pub seed_cost: f64,
    /// Whether the seed served every client within the model's constraints.
    pub seed_feasible: bool,
    pub diagnostics: Diagnostics,
}

impl FleetPlan {
    pub fn has_routes(&self) -> bool {
        !self.routes.is_empty()
    }
}

/// Errors returned by [`FleetPlanner::plan`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The solver could not run.
    #[error("solver failed: {0}")]
    Solve(#[from] SolveError),
    /// The solver's assignment does not describe valid routes.
    #[error("solution could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// Runs the planning pipeline with solver `S`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::{
///     Client, Depot, Diagnostics, FleetPlanner, FleetProblem, ModelSolver, RoutingModel,
///     SolveError, SolveOutcome, SolveStatus, SolverConfig, Vehicle,
/// };
///
/// /// Accepts the greedy seed as the answer.
/// struct SeedOnly;
///
/// impl ModelSolver for SeedOnly {
///     fn solve(
///         &self,
///         model: &RoutingModel,
///         _config: &SolverConfig,
///     ) -> Result<SolveOutcome, SolveError> {
///         let assignment = model.warm_start().cloned().unwrap_or_default();
///         Ok(SolveOutcome {
///             status: SolveStatus::Feasible,
///             objective: model.objective_value(&assignment),
///             assignment,
///             diagnostics: Diagnostics::default(),
///         })
///     }
/// }
///
/// let problem = FleetProblem::new(
///     vec![Depot::new("D1", Coord { x: 0.0, y: 0.0 })],
///     vec![Client::new("C1", 3, Coord { x: 0.01, y: 0.0 })],
///     vec![Vehicle::new("V1", 5, 10.0)],
/// )
/// .expect("valid problem");
/// let plan = FleetPlanner::new(SeedOnly).plan(&problem).expect("plan");
/// assert_eq!(plan.routes[0].route_sequence(), "D1-C1-D1");
/// ```
#[derive(Debug, Clone)]
pub struct FleetPlanner<S> {
    solver: S,
    config: PlannerConfig,
}

impl<S: ModelSolver> FleetPlanner<S> {
    pub fn new(solver: S) -> Self {
        Self::with_config(solver, PlannerConfig::default())
    }

    pub const fn with_config(solver: S, config: PlannerConfig) -> Self {
        Self { solver, config }
    }

    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan routes for `problem`.
    ///
    /// # Errors
    /// Returns [`PlanError::Solve`] when the solver cannot run or returns an
    /// assignment of the wrong size, and [`PlanError::Decode`] when a
    /// solution does not describe valid routes.
    pub fn plan(&self, problem: &FleetProblem) -> Result<FleetPlan, PlanError> {
        let network = ArcNetwork::for_problem(problem);
        let unreachable_clients: Vec<String> = network
            .unreachable_clients(problem)
            .into_iter()
            .filter_map(|client| problem.client(client).map(|c| c.id.clone()))
            .collect();
        if !unreachable_clients.is_empty() {
            log::warn!(
                "no feasible arc reaches clients: {}",
                unreachable_clients.join(", ")
            );
        }

        let seed = HeuristicSeed::construct(problem, &network);
        let model = RoutingModel::builder(problem, &network, self.config.costs)
            .with_warm_start(seed.tours())
            .build();
        let seed_feasible = model
            .warm_start()
            .is_some_and(|warm| model.is_feasible(warm));
        if !seed_feasible {
            log::debug!("greedy seed is not feasible for the routing model");
        }

        let outcome = self.solver.solve(&model, &self.config.solver)?;
        if outcome.assignment.len() != model.variable_count() {
            return Err(SolveError::AssignmentLength {
                expected: model.variable_count(),
                actual: outcome.assignment.len(),
            }
            .into());
        }
        log::info!(
            "solver finished with {:?} after {:?}",
            outcome.status,
            outcome.diagnostics.solve_time
        );

        let (routes, idle_vehicles) = if outcome.status.has_solution() {
            let decoded = SolutionDecoder::new(problem, &model)
                .with_average_speed(self.config.average_speed_kmh)
                .decode(&outcome.assignment)?;
            (decoded.routes, decoded.idle_vehicles)
        } else {
            let idle = problem.vehicles().iter().map(|v| v.id.clone()).collect();
            (Vec::new(), idle)
        };

        Ok(FleetPlan {
            status: outcome.status,
            routes,
            idle_vehicles,
            unreachable_clients,
            objective: outcome.objective,
            seed_cost: seed.cost(&self.config.costs),
            seed_feasible,
            diagnostics: outcome.diagnostics,
        })
    }
}
