//! Greedy nearest-client tours used to seed the solver.
//!
//! Vehicles are processed in input order and draw from one shared
//! [`ClientPool`]. Each tour starts at the reference depot and repeatedly
//! moves to the closest unclaimed client whose demand fits the remaining
//! capacity and which a feasible arc reaches. Range is not checked; the seed
//! only has to be a useful starting point.

use std::collections::BTreeSet;

use crate::costs::CostParameters;
use crate::model::Tour;
use crate::network::ArcNetwork;
use crate::problem::{ClientIndex, FleetProblem, VehicleIndex};

/// Clients no tour has claimed yet, iterated in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPool {
    unclaimed: BTreeSet<ClientIndex>,
}

impl ClientPool {
    /// A pool holding every client of `problem`.
    pub fn full(problem: &FleetProblem) -> Self {
        Self {
            unclaimed: problem.client_indices().collect(),
        }
    }

    /// Remove `client`, returning whether it was still unclaimed.
    pub fn claim(&mut self, client: ClientIndex) -> bool {
        self.unclaimed.remove(&client)
    }

    pub fn contains(&self, client: ClientIndex) -> bool {
        self.unclaimed.contains(&client)
    }

    pub fn iter(&self) -> impl Iterator<Item = ClientIndex> + '_ {
        self.unclaimed.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.unclaimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unclaimed.is_empty()
    }
}

/// Build one greedy tour for `vehicle`, claiming its clients from `pool`.
///
/// Ties on distance go to the client that comes first in input order. A
/// vehicle that cannot reach or carry any remaining client gets an empty
/// tour.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::{
///     ArcNetwork, Client, ClientIndex, ClientPool, Depot, FleetProblem, Vehicle, VehicleIndex,
///     construct_tour,
/// };
///
/// # fn main() -> Result<(), fleetroute_core::ProblemError> {
/// let problem = FleetProblem::new(
///     vec![Depot::new("D1", Coord { x: 0.0, y: 0.0 })],
///     vec![
///         Client::new("far", 1, Coord { x: 0.05, y: 0.0 }),
///         Client::new("near", 1, Coord { x: 0.01, y: 0.0 }),
///     ],
///     vec![Vehicle::new("V1", 5, 50.0)],
/// )?;
/// let network = ArcNetwork::for_problem(&problem);
/// let mut pool = ClientPool::full(&problem);
/// let tour = construct_tour(&problem, &network, VehicleIndex(0), &mut pool);
/// assert_eq!(tour.clients, vec![ClientIndex(1), ClientIndex(0)]);
/// assert!(pool.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn construct_tour(
    problem: &FleetProblem,
    network: &ArcNetwork,
    vehicle: VehicleIndex,
    pool: &mut ClientPool,
) -> Tour {
    let depot = problem.reference_depot();
    let mut tour = Tour::idle(vehicle, depot);
    let Some(record) = problem.vehicle(vehicle) else {
        return tour;
    };
    let mut remaining = record.capacity;
    let mut position = problem.depot_node(depot);

    loop {
        let mut best: Option<(ClientIndex, f64)> = None;
        for candidate in pool.iter() {
            let Some(client) = problem.client(candidate) else {
                continue;
            };
            if client.demand > remaining {
                continue;
            }
            let Some(distance) = network.distance(position, problem.client_node(candidate))
            else {
                continue;
            };
            if best.is_none_or(|(_, shortest)| distance < shortest) {
                best = Some((candidate, distance));
            }
        }
        let Some((next, _)) = best else {
            break;
        };
        pool.claim(next);
        remaining -= problem.client(next).map_or(0, |client| client.demand);
        position = problem.client_node(next);
        tour.clients.push(next);
    }
    tour
}

/// Greedy tours for the whole fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicSeed {
    tours: Vec<Tour>,
    unclaimed: Vec<ClientIndex>,
    distance_km: f64,
}

impl HeuristicSeed {
    /// Build one tour per vehicle in input order over a shared pool.
    pub fn construct(problem: &FleetProblem, network: &ArcNetwork) -> Self {
        let mut pool = ClientPool::full(problem);
        let tours: Vec<Tour> = problem
            .vehicle_indices()
            .map(|vehicle| construct_tour(problem, network, vehicle, &mut pool))
            .collect();
        let distance_km = tours
            .iter()
            .map(|tour| seeded_distance(problem, network, tour))
            .sum();
        let unclaimed: Vec<ClientIndex> = pool.iter().collect();
        log::debug!(
            "seeded {} tours covering {} of {} clients over {distance_km:.2} km",
            tours.iter().filter(|tour| !tour.is_empty()).count(),
            problem.clients().len() - unclaimed.len(),
            problem.clients().len()
        );
        Self {
            tours,
            unclaimed,
            distance_km,
        }
    }

    /// One tour per vehicle, in vehicle order.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    /// Clients no vehicle could take.
    pub fn unclaimed(&self) -> &[ClientIndex] {
        &self.unclaimed
    }

    /// Whether every client was claimed.
    pub fn is_complete(&self) -> bool {
        self.unclaimed.is_empty()
    }

    /// Distance over the tour legs present in the network.
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Objective cost of the seed under `costs`.
    pub fn cost(&self, costs: &CostParameters) -> f64 {
        costs.travel_cost(self.distance_km)
    }
}

/// Legs without a feasible arc add nothing.
fn seeded_distance(problem: &FleetProblem, network: &ArcNetwork, tour: &Tour) -> f64 {
    let nodes = tour.nodes(problem.depots().len());
    network.leg_distances(&nodes).flatten().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoutingModel;
    use crate::test_support::{client, depot, vehicle};
    use rstest::{fixture, rstest};

    #[fixture]
    fn problem() -> FleetProblem {
        FleetProblem::new(
            vec![depot("D1", 0.0, 0.0)],
            vec![
                client("C1", 4, 0.03, 0.0),
                client("C2", 6, 0.01, 0.0),
                client("C3", 5, 0.02, 0.0),
            ],
            vec![vehicle("V1", 10, 50.0), vehicle("V2", 10, 50.0)],
        )
        .expect("valid problem")
    }

    #[rstest]
    fn nearest_feasible_client_is_chosen(problem: FleetProblem) {
        let network = ArcNetwork::for_problem(&problem);
        let seed = HeuristicSeed::construct(&problem, &network);
        // V1: C2 (6) then C1 (4) fills capacity; C3 (5) would overflow.
        assert_eq!(seed.tours()[0].clients, vec![ClientIndex(1), ClientIndex(0)]);
        assert_eq!(seed.tours()[1].clients, vec![ClientIndex(2)]);
        assert!(seed.is_complete());
    }

    #[rstest]
    fn shared_pool_never_duplicates_clients(problem: FleetProblem) {
        let network = ArcNetwork::for_problem(&problem);
        let seed = HeuristicSeed::construct(&problem, &network);
        let mut served: Vec<ClientIndex> = seed
            .tours()
            .iter()
            .flat_map(|tour| tour.clients.iter().copied())
            .collect();
        served.sort_unstable();
        served.dedup();
        assert_eq!(served.len(), 3);
    }

    #[rstest]
    fn equidistant_clients_follow_input_order() {
        let problem = FleetProblem::new(
            vec![depot("D1", 0.0, 0.0)],
            vec![client("east", 1, 0.01, 0.0), client("west", 1, -0.01, 0.0)],
            vec![vehicle("V1", 1, 50.0)],
        )
        .expect("valid problem");
        let network = ArcNetwork::for_problem(&problem);
        let mut pool = ClientPool::full(&problem);
        let tour = construct_tour(&problem, &network, VehicleIndex(0), &mut pool);
        assert_eq!(tour.clients, vec![ClientIndex(0)]);
        assert!(pool.contains(ClientIndex(1)));
    }

    #[rstest]
    fn oversized_demand_stays_unclaimed() {
        let problem = FleetProblem::new(
            vec![depot("D1", 0.0, 0.0)],
            vec![client("C1", 12, 0.01, 0.0)],
            vec![vehicle("V1", 10, 50.0)],
        )
        .expect("valid problem");
        let network = ArcNetwork::for_problem(&problem);
        let seed = HeuristicSeed::construct(&problem, &network);
        assert!(seed.tours()[0].is_empty());
        assert_eq!(seed.unclaimed(), &[ClientIndex(0)]);
        assert_eq!(seed.distance_km(), 0.0);
    }

    #[rstest]
    fn seed_cost_matches_warm_start_objective(problem: FleetProblem) {
        let network = ArcNetwork::for_problem(&problem);
        let seed = HeuristicSeed::construct(&problem, &network);
        let costs = CostParameters::default();
        let model = RoutingModel::builder(&problem, &network, costs)
            .with_warm_start(seed.tours())
            .build();
        let warm = model.warm_start().expect("warm start");
        assert!(model.is_feasible(warm));
        let objective = model.objective_value(warm).expect("assigned");
        assert!((objective - seed.cost(&costs)).abs() < 1e-6);
    }
}
