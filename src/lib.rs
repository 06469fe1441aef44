//! Facade crate for the fleetroute planning engine.
//!
//! This crate re-exports the core planning types and exposes the default
//! exact solver behind the `solver-exact` feature.

#![forbid(unsafe_code)]

pub use fleetroute_core::{
    Client, CostParameters, DecodeError, DecodedPlan, Depot, Diagnostics, FleetPlan,
    FleetPlanner, FleetProblem, ModelSolver, PlanError, PlannerConfig, ProblemError,
    RoutingModel, SolutionDecoder, SolveError, SolveOutcome, SolveStatus, SolverConfig, Vehicle,
    VehicleRoute,
};

#[cfg(feature = "solver-exact")]
pub use fleetroute_solver_exact::{ExactSolver, ExactSolverConfig};

#[cfg(feature = "test-support")]
pub use fleetroute_core::test_support;
