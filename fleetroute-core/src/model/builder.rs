//! Declares variables, objective and constraints from problem data.

use std::collections::HashMap;

use super::{
    Assignment, Constraint, ConstraintFamily, Domain, LinearExpr, ModelParameters, Relation,
    RoutingModel, Tour, VarId, Variable, VariableKey,
};
use crate::costs::CostParameters;
use crate::network::ArcNetwork;
use crate::problem::FleetProblem;

/// Builder for [`RoutingModel`].
///
/// Variables are declared in a fixed order: traversals (arc-major, then
/// vehicle), serve flags, delivered quantities, depot departures and finally
/// order markers.
#[derive(Debug)]
pub struct RoutingModelBuilder<'a> {
    problem: &'a FleetProblem,
    network: &'a ArcNetwork,
    costs: CostParameters,
    warm_start: Option<Vec<Tour>>,
}

impl<'a> RoutingModelBuilder<'a> {
    pub(super) const fn new(
        problem: &'a FleetProblem,
        network: &'a ArcNetwork,
        costs: CostParameters,
    ) -> Self {
        Self {
            problem,
            network,
            costs,
            warm_start: None,
        }
    }

    /// Attach `tours` as the warm start handed to the solver.
    #[must_use]
    pub fn with_warm_start(mut self, tours: &[Tour]) -> Self {
        self.warm_start = Some(tours.to_vec());
        self
    }

    pub fn build(self) -> RoutingModel {
        let mut declared = Declared::default();
        self.declare_variables(&mut declared);
        let objective = self.objective(&declared);
        let mut constraints = Vec::new();
        self.demand_satisfaction(&declared, &mut constraints);
        self.vehicle_capacity(&declared, &mut constraints);
        self.vehicle_range(&declared, &mut constraints);
        self.depot_inventory(&declared, &mut constraints);
        self.serve_flow(&declared, &mut constraints);
        self.quantity_serve(&declared, &mut constraints);
        self.flow_conservation(&declared, &mut constraints);
        self.depot_departure(&declared, &mut constraints);
        self.subtour_elimination(&declared, &mut constraints);

        log::debug!(
            "routing model declares {} variables and {} constraints",
            declared.variables.len(),
            constraints.len()
        );

        let mut model = RoutingModel {
            variables: declared.variables,
            index: declared.index,
            objective,
            constraints,
            warm_start: None,
            network: self.network.clone(),
            parameters: ModelParameters::from_problem(self.problem, self.costs),
        };
        if let Some(tours) = self.warm_start {
            let encoded: Assignment = model.encode_tours(&tours);
            model.warm_start = Some(encoded);
        }
        model
    }

    fn declare_variables(&self, declared: &mut Declared) {
        let problem = self.problem;
        for (arc, _) in self.network.iter() {
            for vehicle in problem.vehicle_indices() {
                declared.push(VariableKey::Traverse { arc, vehicle }, Domain::Binary);
            }
        }
        for client in problem.client_indices() {
            for vehicle in problem.vehicle_indices() {
                declared.push(VariableKey::Serve { client, vehicle }, Domain::Binary);
            }
        }
        for client in problem.client_indices() {
            for vehicle in problem.vehicle_indices() {
                declared.push(
                    VariableKey::Quantity { client, vehicle },
                    Domain::NonNegativeInteger,
                );
            }
        }
        for depot in problem.depot_indices() {
            for vehicle in problem.vehicle_indices() {
                declared.push(VariableKey::Depart { depot, vehicle }, Domain::Binary);
            }
        }
        for client in problem.client_indices() {
            declared.push(VariableKey::Order { client }, Domain::NonNegativeReal);
        }
    }

    fn objective(&self, declared: &Declared) -> LinearExpr {
        let rate = self.costs.rate_per_km();
        let mut objective = LinearExpr::new();
        for (arc_id, arc) in self.network.iter() {
            for vehicle in self.problem.vehicle_indices() {
                if let Some(var) = declared.get(VariableKey::Traverse {
                    arc: arc_id,
                    vehicle,
                }) {
                    objective.add_term(var, arc.distance_km * rate);
                }
            }
        }
        objective
    }

    fn demand_satisfaction(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        for (client, record) in self.problem.client_indices().zip(self.problem.clients()) {
            let lhs = self
                .problem
                .vehicle_indices()
                .filter_map(|vehicle| declared.get(VariableKey::Quantity { client, vehicle }))
                .map(|var| (var, 1.0))
                .collect();
            out.push(Constraint {
                family: ConstraintFamily::DemandSatisfaction,
                label: format!("demand[{}]", record.id),
                lhs,
                relation: Relation::Equal,
                rhs: f64::from(record.demand),
            });
        }
    }

    fn vehicle_capacity(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        for (vehicle, record) in self.problem.vehicle_indices().zip(self.problem.vehicles()) {
            let lhs = self
                .problem
                .client_indices()
                .zip(self.problem.clients())
                .filter_map(|(client, client_record)| {
                    declared
                        .get(VariableKey::Serve { client, vehicle })
                        .map(|var| (var, f64::from(client_record.demand)))
                })
                .collect();
            out.push(Constraint {
                family: ConstraintFamily::VehicleCapacity,
                label: format!("capacity[{}]", record.id),
                lhs,
                relation: Relation::LessOrEqual,
                rhs: f64::from(record.capacity),
            });
        }
    }

    fn vehicle_range(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        for (vehicle, record) in self.problem.vehicle_indices().zip(self.problem.vehicles()) {
            let lhs = self
                .network
                .iter()
                .filter_map(|(arc, details)| {
                    declared
                        .get(VariableKey::Traverse { arc, vehicle })
                        .map(|var| (var, details.distance_km))
                })
                .collect();
            out.push(Constraint {
                family: ConstraintFamily::VehicleRange,
                label: format!("range[{}]", record.id),
                lhs,
                relation: Relation::LessOrEqual,
                rhs: record.range_km,
            });
        }
    }

    fn depot_inventory(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        let Some(reference) = problem.depot(problem.reference_depot()) else {
            return;
        };
        let alpha = self.costs.inventory_loss_factor;
        let mut lhs = LinearExpr::new();
        for client in problem.client_indices() {
            for vehicle in problem.vehicle_indices() {
                if let Some(var) = declared.get(VariableKey::Quantity { client, vehicle }) {
                    lhs.add_term(var, alpha);
                }
            }
        }
        out.push(Constraint {
            family: ConstraintFamily::DepotInventory,
            label: format!("inventory[{}]", reference.id),
            lhs,
            relation: Relation::LessOrEqual,
            rhs: f64::from(reference.inventory_capacity),
        });
    }

    fn serve_flow(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        for (client, record) in problem.client_indices().zip(problem.clients()) {
            let node = problem.client_node(client);
            for (vehicle, vehicle_record) in problem.vehicle_indices().zip(problem.vehicles()) {
                let mut lhs: LinearExpr = self
                    .network
                    .incoming(node)
                    .iter()
                    .filter_map(|arc| declared.get(VariableKey::Traverse { arc: *arc, vehicle }))
                    .map(|var| (var, 1.0))
                    .collect();
                if let Some(serve) = declared.get(VariableKey::Serve { client, vehicle }) {
                    lhs.add_term(serve, -1.0);
                }
                out.push(Constraint {
                    family: ConstraintFamily::ServeFlow,
                    label: format!("serve_flow[{},{}]", record.id, vehicle_record.id),
                    lhs,
                    relation: Relation::Equal,
                    rhs: 0.0,
                });
            }
        }
    }

    fn quantity_serve(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        for (client, record) in problem.client_indices().zip(problem.clients()) {
            for (vehicle, vehicle_record) in problem.vehicle_indices().zip(problem.vehicles()) {
                let mut lhs = LinearExpr::new();
                if let Some(quantity) = declared.get(VariableKey::Quantity { client, vehicle }) {
                    lhs.add_term(quantity, 1.0);
                }
                if let Some(serve) = declared.get(VariableKey::Serve { client, vehicle }) {
                    lhs.add_term(serve, -f64::from(record.demand));
                }
                out.push(Constraint {
                    family: ConstraintFamily::QuantityServe,
                    label: format!("quantity[{},{}]", record.id, vehicle_record.id),
                    lhs,
                    relation: Relation::Equal,
                    rhs: 0.0,
                });
            }
        }
    }

    fn flow_conservation(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        for (client, record) in problem.client_indices().zip(problem.clients()) {
            let node = problem.client_node(client);
            for (vehicle, vehicle_record) in problem.vehicle_indices().zip(problem.vehicles()) {
                let inbound = self
                    .network
                    .incoming(node)
                    .iter()
                    .filter_map(|arc| declared.get(VariableKey::Traverse { arc: *arc, vehicle }))
                    .map(|var| (var, 1.0));
                let outbound = self
                    .network
                    .outgoing(node)
                    .iter()
                    .filter_map(|arc| declared.get(VariableKey::Traverse { arc: *arc, vehicle }))
                    .map(|var| (var, -1.0));
                out.push(Constraint {
                    family: ConstraintFamily::FlowConservation,
                    label: format!("flow[{},{}]", record.id, vehicle_record.id),
                    lhs: inbound.chain(outbound).collect(),
                    relation: Relation::Equal,
                    rhs: 0.0,
                });
            }
        }
    }

    fn depot_departure(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        for (depot, record) in problem.depot_indices().zip(problem.depots()) {
            let node = problem.depot_node(depot);
            for (vehicle, vehicle_record) in problem.vehicle_indices().zip(problem.vehicles()) {
                let mut lhs: LinearExpr = self
                    .network
                    .outgoing(node)
                    .iter()
                    .filter_map(|arc| declared.get(VariableKey::Traverse { arc: *arc, vehicle }))
                    .map(|var| (var, 1.0))
                    .collect();
                if let Some(depart) = declared.get(VariableKey::Depart { depot, vehicle }) {
                    lhs.add_term(depart, -1.0);
                }
                out.push(Constraint {
                    family: ConstraintFamily::DepotDeparture,
                    label: format!("departure[{},{}]", record.id, vehicle_record.id),
                    lhs,
                    relation: Relation::GreaterOrEqual,
                    rhs: 0.0,
                });
            }
        }
    }

    /// Miller-Tucker-Zemlin rows for every ordered client pair and vehicle.
    ///
    /// The traversal term is present only when the pair is joined by a
    /// feasible arc; otherwise the row bounds the markers alone.
    fn subtour_elimination(&self, declared: &Declared, out: &mut Vec<Constraint>) {
        let problem = self.problem;
        let n = problem.clients().len() as f64;
        for (from, from_record) in problem.client_indices().zip(problem.clients()) {
            for (to, to_record) in problem.client_indices().zip(problem.clients()) {
                if from == to {
                    continue;
                }
                let (Some(from_order), Some(to_order)) = (
                    declared.get(VariableKey::Order { client: from }),
                    declared.get(VariableKey::Order { client: to }),
                ) else {
                    continue;
                };
                let arc = self
                    .network
                    .arc_between(problem.client_node(from), problem.client_node(to));
                for (vehicle, vehicle_record) in problem.vehicle_indices().zip(problem.vehicles()) {
                    let mut lhs = LinearExpr::new()
                        .with_term(from_order, 1.0)
                        .with_term(to_order, -1.0);
                    if let Some(traverse) =
                        arc.and_then(|arc| declared.get(VariableKey::Traverse { arc, vehicle }))
                    {
                        lhs.add_term(traverse, n);
                    }
                    out.push(Constraint {
                        family: ConstraintFamily::SubtourElimination,
                        label: format!("mtz[{},{},{}]", from_record.id, to_record.id, vehicle_record.id),
                        lhs,
                        relation: Relation::LessOrEqual,
                        rhs: n - 1.0,
                    });
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Declared {
    variables: Vec<Variable>,
    index: HashMap<VariableKey, VarId>,
}

impl Declared {
    fn push(&mut self, key: VariableKey, domain: Domain) {
        let id = VarId(self.variables.len());
        self.variables.push(Variable { key, domain });
        self.index.insert(key, id);
    }

    fn get(&self, key: VariableKey) -> Option<VarId> {
        self.index.get(&key).copied()
    }
}
