//! Exact branch-and-bound backend for fleetroute routing models.
//!
//! [`ExactSolver`] implements [`ModelSolver`](fleetroute_core::ModelSolver)
//! without an external MILP engine. It enumerates depot-rooted tours for each
//! vehicle in turn, prunes with a per-client entry-cost bound, and verifies
//! every complete candidate against the model's constraints before accepting
//! it. The search honours the wall-clock limit in
//! [`SolverConfig`](fleetroute_core::SolverConfig) and an optional node budget.

#![forbid(unsafe_code)]

mod search;
mod solver;

pub use solver::{ExactSolver, ExactSolverConfig};
