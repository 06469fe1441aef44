//! Backend-agnostic constraint model of the fleet routing problem.
//!
//! [`RoutingModelBuilder`] declares one variable per entity tuple, a
//! distance-proportional objective and nine constraint families. The model
//! never solves anything itself; it hands its structure to a
//! [`ModelSolver`](crate::ModelSolver) and can check any assignment the
//! solver returns.

mod assignment;
mod builder;
mod expr;
mod variables;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

pub use assignment::Assignment;
pub use builder::RoutingModelBuilder;
pub use expr::{Constraint, ConstraintFamily, LinearExpr, Relation};
pub use variables::{Domain, VarId, Variable, VariableKey};

use crate::costs::CostParameters;
use crate::network::ArcNetwork;
use crate::problem::{ClientIndex, DepotIndex, FleetProblem, NodeIndex, VehicleIndex};

/// Slack allowed when checking constraints and domains.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// A depot-rooted tour: depot, clients in visiting order, back to the depot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub vehicle: VehicleIndex,
    pub depot: DepotIndex,
    pub clients: Vec<ClientIndex>,
}

impl Tour {
    /// A tour that never leaves `depot`.
    pub const fn idle(vehicle: VehicleIndex, depot: DepotIndex) -> Self {
        Self {
            vehicle,
            depot,
            clients: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Nodes visited from the depot back to it; empty for an idle tour.
    ///
    /// Node indices follow the depot-then-client ordering of a problem with
    /// `depot_count` depots.
    pub fn nodes(&self, depot_count: usize) -> Vec<NodeIndex> {
        if self.is_empty() {
            return Vec::new();
        }
        let depot = NodeIndex(self.depot.0);
        std::iter::once(depot)
            .chain(
                self.clients
                    .iter()
                    .map(|client| NodeIndex(depot_count + client.0)),
            )
            .chain(std::iter::once(depot))
            .collect()
    }
}

/// Problem data the constraints were generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub depot_count: usize,
    /// Demand per client.
    pub demands: Vec<u32>,
    /// Capacity per vehicle.
    pub capacities: Vec<u32>,
    /// Range per vehicle.
    pub ranges_km: Vec<f64>,
    /// Inventory of the reference depot.
    pub reference_inventory: u32,
    pub costs: CostParameters,
}

impl ModelParameters {
    fn from_problem(problem: &FleetProblem, costs: CostParameters) -> Self {
        let reference_inventory = problem
            .depot(problem.reference_depot())
            .map_or(0, |depot| depot.inventory_capacity);
        Self {
            depot_count: problem.depots().len(),
            demands: problem.clients().iter().map(|c| c.demand).collect(),
            capacities: problem.vehicles().iter().map(|v| v.capacity).collect(),
            ranges_km: problem.vehicles().iter().map(|v| v.range_km).collect(),
            reference_inventory,
            costs,
        }
    }

    pub fn client_count(&self) -> usize {
        self.demands.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.capacities.len()
    }

    pub const fn depot_node(&self, depot: DepotIndex) -> NodeIndex {
        NodeIndex(depot.0)
    }

    pub const fn client_node(&self, client: ClientIndex) -> NodeIndex {
        NodeIndex(self.depot_count + client.0)
    }

    /// The client at `node`, or `None` for depots and unknown nodes.
    pub fn node_client(&self, node: NodeIndex) -> Option<ClientIndex> {
        node.0
            .checked_sub(self.depot_count)
            .filter(|idx| *idx < self.demands.len())
            .map(ClientIndex)
    }

    pub fn demand(&self, client: ClientIndex) -> u32 {
        self.demands.get(client.0).copied().unwrap_or(0)
    }
}

/// Why an assignment fails to satisfy the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The assignment has a different number of values than the model has variables.
    LengthMismatch { expected: usize, actual: usize },
    /// The variable carries no value.
    Unassigned { var: VarId },
    /// The value lies outside the variable's domain.
    Domain { var: VarId, value: f64 },
    /// A constraint does not hold.
    Constraint {
        family: ConstraintFamily,
        label: String,
    },
}

/// The declared routing model.
///
/// # Examples
/// ```
/// use fleetroute_core::{
///     ArcNetwork, Client, CostParameters, Depot, FleetProblem, HeuristicSeed, RoutingModel,
///     Vehicle,
/// };
/// use geo::Coord;
///
/// # fn main() -> Result<(), fleetroute_core::ProblemError> {
/// let problem = FleetProblem::new(
///     vec![Depot::new("D1", Coord { x: 0.0, y: 0.0 })],
///     vec![Client::new("C1", 2, Coord { x: 0.01, y: 0.0 })],
///     vec![Vehicle::new("V1", 5, 10.0)],
/// )?;
/// let network = ArcNetwork::for_problem(&problem);
/// let seed = HeuristicSeed::construct(&problem, &network);
/// let model = RoutingModel::builder(&problem, &network, CostParameters::default())
///     .with_warm_start(seed.tours())
///     .build();
/// let warm = model.warm_start().expect("warm start");
/// assert!(model.is_feasible(warm));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RoutingModel {
    variables: Vec<Variable>,
    index: HashMap<VariableKey, VarId>,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
    warm_start: Option<Assignment>,
    network: ArcNetwork,
    parameters: ModelParameters,
}

impl RoutingModel {
    /// Start declaring a model over `problem` and its feasible `network`.
    pub fn builder<'a>(
        problem: &'a FleetProblem,
        network: &'a ArcNetwork,
        costs: CostParameters,
    ) -> RoutingModelBuilder<'a> {
        RoutingModelBuilder::new(problem, network, costs)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> Option<&Variable> {
        self.variables.get(var.0)
    }

    /// Look up the variable declared for `key`.
    ///
    /// Traversal keys for arcs outside the network have no variable.
    pub fn var(&self, key: VariableKey) -> Option<VarId> {
        self.index.get(&key).copied()
    }

    /// The minimised objective.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_of(&self, family: ConstraintFamily) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(move |constraint| constraint.family == family)
    }

    pub fn warm_start(&self) -> Option<&Assignment> {
        self.warm_start.as_ref()
    }

    pub fn network(&self) -> &ArcNetwork {
        &self.network
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Objective value of `values`, or `None` if a costed variable is unassigned.
    pub fn objective_value(&self, values: &Assignment) -> Option<f64> {
        self.objective.evaluate(values)
    }

    /// Every way `values` fails the model, in variable then constraint order.
    pub fn violations(&self, values: &Assignment) -> Vec<Violation> {
        if values.len() != self.variables.len() {
            return vec![Violation::LengthMismatch {
                expected: self.variables.len(),
                actual: values.len(),
            }];
        }
        let mut found = Vec::new();
        for (idx, variable) in self.variables.iter().enumerate() {
            let var = VarId(idx);
            match values.get(var) {
                None => found.push(Violation::Unassigned { var }),
                Some(value) if !variable.domain.admits(value, FEASIBILITY_TOLERANCE) => {
                    found.push(Violation::Domain { var, value });
                }
                Some(_) => {}
            }
        }
        for constraint in &self.constraints {
            if constraint.is_satisfied_by(values, FEASIBILITY_TOLERANCE) == Some(false) {
                found.push(Violation::Constraint {
                    family: constraint.family,
                    label: constraint.label.clone(),
                });
            }
        }
        found
    }

    pub fn is_feasible(&self, values: &Assignment) -> bool {
        self.violations(values).is_empty()
    }

    /// Nodes visited by `tour`, starting and ending at its depot.
    pub fn tour_nodes(&self, tour: &Tour) -> Vec<NodeIndex> {
        tour.nodes(self.parameters.depot_count)
    }

    /// Length of `tour`, or `None` if a leg has no feasible arc.
    ///
    /// An empty tour has length zero.
    pub fn tour_distance_km(&self, tour: &Tour) -> Option<f64> {
        let nodes = self.tour_nodes(tour);
        self.network.leg_distances(&nodes).sum()
    }

    /// Encode `tours` as a full assignment.
    ///
    /// Every variable starts at zero. A non-empty tour departs its depot,
    /// traverses each consecutive leg that exists in the network, and serves
    /// every client it reaches over such a leg with its full demand. Order
    /// markers hold each client's 1-based position on its tour.
    pub fn encode_tours(&self, tours: &[Tour]) -> Assignment {
        let mut values = Assignment::zeroed(self.variables.len());
        for tour in tours.iter().filter(|tour| !tour.is_empty()) {
            let vehicle = tour.vehicle;
            self.set_key(
                &mut values,
                VariableKey::Depart {
                    depot: tour.depot,
                    vehicle,
                },
                1.0,
            );
            for leg in self.tour_nodes(tour).windows(2) {
                let Some(arc) = self.network.arc_between(leg[0], leg[1]) else {
                    continue;
                };
                self.set_key(&mut values, VariableKey::Traverse { arc, vehicle }, 1.0);
                if let Some(client) = self.parameters.node_client(leg[1]) {
                    let demand = f64::from(self.parameters.demand(client));
                    self.set_key(&mut values, VariableKey::Serve { client, vehicle }, 1.0);
                    self.set_key(&mut values, VariableKey::Quantity { client, vehicle }, demand);
                }
            }
            for (position, client) in (1_u32..).zip(&tour.clients) {
                self.set_key(
                    &mut values,
                    VariableKey::Order { client: *client },
                    f64::from(position),
                );
            }
        }
        values
    }

    fn set_key(&self, values: &mut Assignment, key: VariableKey, value: f64) {
        if let Some(var) = self.var(key) {
            values.set(var, value);
        }
    }
}
