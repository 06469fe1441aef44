//! Depth-first branch and bound over depot-rooted tours.
//!
//! Vehicles are filled one after another. A vehicle opens its tour at any
//! depot, reference depot first. At each node the current vehicle either
//! drives to an unserved client that fits its remaining capacity and from
//! which it can still return to its depot within range, or closes its tour
//! and hands over to the next vehicle. Idle vehicles are only enumerated at
//! the reference depot. Complete assignments are encoded through the
//! model and kept only when the model accepts them.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use fleetroute_core::{
    Assignment, ClientIndex, DepotIndex, NodeIndex, RoutingModel, Tour, VarId, VariableKey,
    VehicleIndex,
};

const IMPROVEMENT_EPSILON: f64 = 1e-9;
const RANGE_EPSILON_KM: f64 = 1e-6;

/// Limits that stop the search early.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Budget {
    pub started: Instant,
    pub time_limit: Duration,
    pub max_nodes: Option<u64>,
}

impl Budget {
    fn spent(&self, nodes: u64) -> bool {
        self.max_nodes.is_some_and(|max| nodes >= max) || self.started.elapsed() >= self.time_limit
    }
}

/// Best complete assignment found so far.
#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    pub objective: f64,
    pub assignment: Assignment,
}

/// How the search ended.
#[derive(Debug, Clone)]
pub(crate) struct SearchResult {
    pub incumbent: Option<Incumbent>,
    /// Whether the whole tree was explored or pruned.
    pub completed: bool,
    pub nodes: u64,
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    vehicle: usize,
    depot: DepotIndex,
    depot_node: NodeIndex,
    position: NodeIndex,
    load: u64,
    distance_km: f64,
    cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct Leg {
    client: ClientIndex,
    distance_km: f64,
    cost: f64,
}

pub(crate) struct Search<'m> {
    model: &'m RoutingModel,
    traverse_cost: HashMap<VarId, f64>,
    cheapest_entry: Vec<f64>,
    budget: Budget,
    tours: Vec<Tour>,
    served: Vec<bool>,
    incumbent: Option<Incumbent>,
    nodes: u64,
    exhausted: bool,
}

#[expect(
    clippy::float_arithmetic,
    reason = "tour costs and distances are accumulated in floating point"
)]
impl<'m> Search<'m> {
    pub(crate) fn new(
        model: &'m RoutingModel,
        budget: Budget,
        incumbent: Option<Incumbent>,
    ) -> Self {
        let parameters = model.parameters();
        let mut traverse_cost: HashMap<VarId, f64> = HashMap::new();
        for &(var, coefficient) in model.objective().terms() {
            *traverse_cost.entry(var).or_insert(0.0) += coefficient;
        }
        let mut search = Self {
            model,
            traverse_cost,
            cheapest_entry: Vec::new(),
            budget,
            tours: (0..parameters.vehicle_count())
                .map(|vehicle| Tour::idle(VehicleIndex(vehicle), DepotIndex(0)))
                .collect(),
            served: vec![false; parameters.client_count()],
            incumbent,
            nodes: 0,
            exhausted: false,
        };
        search.cheapest_entry = (0..parameters.client_count())
            .map(|idx| search.cheapest_entry_cost(ClientIndex(idx)))
            .collect();
        search
    }

    pub(crate) fn run(mut self) -> SearchResult {
        self.open(0, 0.0);
        log::debug!(
            "branch and bound visited {} nodes ({})",
            self.nodes,
            if self.exhausted {
                "budget spent"
            } else {
                "tree closed"
            }
        );
        SearchResult {
            incumbent: self.incumbent,
            completed: !self.exhausted,
            nodes: self.nodes,
        }
    }

    /// Start `vehicle`'s tour at each depot in turn.
    ///
    /// Past the last vehicle a single branch records the leaf.
    fn open(&mut self, vehicle: usize, cost: f64) {
        let parameters = self.model.parameters();
        let depots = if vehicle < parameters.vehicle_count() {
            parameters.depot_count
        } else {
            1
        };
        for depot in (0..depots).map(DepotIndex) {
            let depot_node = parameters.depot_node(depot);
            self.descend(Cursor {
                vehicle,
                depot,
                depot_node,
                position: depot_node,
                load: 0,
                distance_km: 0.0,
                cost,
            });
            if self.exhausted {
                return;
            }
        }
    }

    fn descend(&mut self, cursor: Cursor) {
        if self.exhausted {
            return;
        }
        if self.budget.spent(self.nodes) {
            self.exhausted = true;
            return;
        }
        self.nodes += 1;
        if self.is_dominated(cursor.cost) {
            return;
        }

        let parameters = self.model.parameters();
        let (Some(&capacity), Some(&range_km)) = (
            parameters.capacities.get(cursor.vehicle),
            parameters.ranges_km.get(cursor.vehicle),
        ) else {
            self.record_leaf();
            return;
        };
        let vehicle = VehicleIndex(cursor.vehicle);

        for leg in self.extensions(&cursor, vehicle, u64::from(capacity), range_km) {
            let demand = u64::from(parameters.demand(leg.client));
            self.claim(&cursor, leg.client);
            self.descend(Cursor {
                position: parameters.client_node(leg.client),
                load: cursor.load + demand,
                distance_km: cursor.distance_km + leg.distance_km,
                cost: cursor.cost + leg.cost,
                ..cursor
            });
            self.release(cursor.vehicle, leg.client);
            if self.exhausted {
                return;
            }
        }

        let closing_cost = if cursor.position == cursor.depot_node {
            // An idle vehicle looks the same at every depot.
            (cursor.depot == DepotIndex(0)).then_some(0.0)
        } else {
            self.leg(cursor.position, cursor.depot_node, vehicle)
                .map(|(_, cost)| cost)
        };
        if let Some(closing_cost) = closing_cost {
            self.open(cursor.vehicle + 1, cursor.cost + closing_cost);
        }
    }

    /// Unserved clients the vehicle may drive to next, cheapest first.
    fn extensions(
        &self,
        cursor: &Cursor,
        vehicle: VehicleIndex,
        capacity: u64,
        range_km: f64,
    ) -> Vec<Leg> {
        let parameters = self.model.parameters();
        let mut legs: Vec<Leg> = self
            .served
            .iter()
            .enumerate()
            .filter(|(_, served)| !**served)
            .filter_map(|(idx, _)| {
                let client = ClientIndex(idx);
                if cursor.load + u64::from(parameters.demand(client)) > capacity {
                    return None;
                }
                let node = parameters.client_node(client);
                let (distance_km, cost) = self.leg(cursor.position, node, vehicle)?;
                let (return_km, _) = self.leg(node, cursor.depot_node, vehicle)?;
                let committed = cursor.distance_km + distance_km + return_km;
                (committed <= range_km + RANGE_EPSILON_KM).then_some(Leg {
                    client,
                    distance_km,
                    cost,
                })
            })
            .collect();
        legs.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        legs
    }

    /// Distance and objective cost of `from -> to` for `vehicle`.
    fn leg(&self, from: NodeIndex, to: NodeIndex, vehicle: VehicleIndex) -> Option<(f64, f64)> {
        let network = self.model.network();
        let arc = network.arc_between(from, to)?;
        let distance_km = network.arc(arc)?.distance_km;
        let var = self.model.var(VariableKey::Traverse { arc, vehicle })?;
        let cost = self.traverse_cost.get(&var).copied().unwrap_or(0.0);
        Some((distance_km, cost))
    }

    fn cheapest_entry_cost(&self, client: ClientIndex) -> f64 {
        let parameters = self.model.parameters();
        let node = parameters.client_node(client);
        let network = self.model.network();
        network
            .incoming(node)
            .iter()
            .flat_map(|arc| {
                (0..parameters.vehicle_count()).filter_map(move |vehicle| {
                    self.model.var(VariableKey::Traverse {
                        arc: *arc,
                        vehicle: VehicleIndex(vehicle),
                    })
                })
            })
            .map(|var| self.traverse_cost.get(&var).copied().unwrap_or(0.0))
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether `cost` plus the cheapest way to enter every unserved client
    /// cannot beat the incumbent.
    fn is_dominated(&self, cost: f64) -> bool {
        let Some(best) = &self.incumbent else {
            return false;
        };
        let remaining: f64 = self
            .served
            .iter()
            .zip(&self.cheapest_entry)
            .filter(|(served, _)| !**served)
            .map(|(_, entry)| *entry)
            .sum();
        cost + remaining >= best.objective - IMPROVEMENT_EPSILON
    }

    fn claim(&mut self, cursor: &Cursor, client: ClientIndex) {
        if let Some(flag) = self.served.get_mut(client.0) {
            *flag = true;
        }
        if let Some(tour) = self.tours.get_mut(cursor.vehicle) {
            tour.depot = cursor.depot;
            tour.clients.push(client);
        }
    }

    fn release(&mut self, vehicle: usize, client: ClientIndex) {
        if let Some(flag) = self.served.get_mut(client.0) {
            *flag = false;
        }
        if let Some(tour) = self.tours.get_mut(vehicle) {
            tour.clients.pop();
        }
    }

    fn record_leaf(&mut self) {
        if self.served.iter().any(|served| !*served) {
            return;
        }
        let assignment = self.model.encode_tours(&self.tours);
        if !self.model.is_feasible(&assignment) {
            return;
        }
        let Some(objective) = self.model.objective_value(&assignment) else {
            return;
        };
        let improves = self
            .incumbent
            .as_ref()
            .is_none_or(|best| objective < best.objective - IMPROVEMENT_EPSILON);
        if improves {
            log::debug!("new incumbent with objective {objective:.2}");
            self.incumbent = Some(Incumbent {
                objective,
                assignment,
            });
        }
    }
}
