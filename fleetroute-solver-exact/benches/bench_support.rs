//! Deterministic instance generation for solver benchmarks.

use fleetroute_core::test_support::{client, depot, vehicle};
use fleetroute_core::{FleetProblem, ProblemError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Half-width of the square clients are scattered over (in degrees).
/// 0.03 degrees is roughly 3.3 km at the equator.
const AREA_HALF_WIDTH: f64 = 0.03;

/// Build a single-depot instance with `clients` clients and `vehicles`
/// identical vehicles.
///
/// Demands fall in `1..=4` and each vehicle carries 8 units over 40 km, so
/// larger instances need more than one tour.
///
/// # Errors
///
/// Returns the validation error if the generated instance is rejected.
pub fn generate_problem(
    clients: usize,
    vehicles: usize,
    seed: u64,
) -> Result<FleetProblem, ProblemError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let clients = (1..=clients)
        .map(|i| {
            client(
                &format!("C{i}"),
                rng.gen_range(1..=4),
                rng.gen_range(-AREA_HALF_WIDTH..AREA_HALF_WIDTH),
                rng.gen_range(-AREA_HALF_WIDTH..AREA_HALF_WIDTH),
            )
        })
        .collect();
    let vehicles = (1..=vehicles)
        .map(|i| vehicle(&format!("V{i}"), 8, 40.0))
        .collect();
    FleetProblem::new(vec![depot("D1", 0.0, 0.0)], clients, vehicles)
}
