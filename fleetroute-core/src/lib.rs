//! Core planning engine for capacity- and range-limited delivery fleets.
//!
//! The crate turns depot, client and vehicle records into a feasible arc
//! network, seeds one greedy tour per vehicle, declares the routing model
//! handed to a [`ModelSolver`] backend, and decodes the returned assignment
//! into per-vehicle routes. [`FleetPlanner`] wires these stages into a single
//! synchronous pipeline.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use fleetroute_core::{ArcNetwork, Client, Depot, FleetProblem, HeuristicSeed, Vehicle};
//!
//! # fn main() -> Result<(), fleetroute_core::ProblemError> {
//! let problem = FleetProblem::new(
//!     vec![Depot::new("D1", Coord { x: -74.08, y: 4.60 })],
//!     vec![Client::new("C1", 4, Coord { x: -74.07, y: 4.61 })],
//!     vec![Vehicle::new("V1", 10, 50.0)],
//! )?;
//! let network = ArcNetwork::for_problem(&problem);
//! let seed = HeuristicSeed::construct(&problem, &network);
//! assert_eq!(seed.tours().len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod costs;
pub mod decode;
pub mod distance;
pub mod heuristic;
pub mod model;
pub mod network;
pub mod planner;
pub mod problem;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use costs::CostParameters;
pub use decode::{
    DEFAULT_AVERAGE_SPEED_KMH, DecodeError, DecodedPlan, SolutionDecoder, TRAVERSAL_THRESHOLD,
    VehicleRoute,
};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use heuristic::{ClientPool, HeuristicSeed, construct_tour};
pub use model::{
    Assignment, Constraint, ConstraintFamily, Domain, FEASIBILITY_TOLERANCE, LinearExpr,
    ModelParameters, Relation, RoutingModel, RoutingModelBuilder, Tour, VarId, Variable,
    VariableKey, Violation,
};
pub use network::{Arc, ArcId, ArcNetwork};
pub use planner::{FleetPlan, FleetPlanner, PlanError, PlannerConfig};
pub use problem::{
    Client, ClientIndex, DEFAULT_INVENTORY_CEILING, Depot, DepotIndex, FleetProblem, NodeIndex,
    NodeKind, ProblemError, Vehicle, VehicleIndex,
};
pub use solver::{
    DEFAULT_TIME_LIMIT, Diagnostics, ModelSolver, SolveError, SolveOutcome, SolveStatus,
    SolverConfig,
};
