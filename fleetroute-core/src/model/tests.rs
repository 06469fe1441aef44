//! Unit tests for model declaration and assignment checks.

use super::*;
use crate::network::ArcNetwork;
use crate::problem::{ClientIndex, DepotIndex, NodeIndex, VehicleIndex};
use crate::test_support::{client, depot, vehicle};
use rstest::{fixture, rstest};

#[fixture]
fn problem() -> FleetProblem {
    FleetProblem::new(
        vec![depot("D1", -74.08, 4.60)],
        vec![
            client("C1", 4, -74.07, 4.61),
            client("C2", 6, -74.06, 4.62),
            client("C3", 3, -74.09, 4.59),
        ],
        vec![vehicle("V1", 10, 40.0), vehicle("V2", 5, 40.0)],
    )
    .expect("valid problem")
}

fn model_for(problem: &FleetProblem) -> RoutingModel {
    let network = ArcNetwork::for_problem(problem);
    RoutingModel::builder(problem, &network, CostParameters::default()).build()
}

fn tour(vehicle: usize, clients: &[usize]) -> Tour {
    Tour {
        vehicle: VehicleIndex(vehicle),
        depot: DepotIndex(0),
        clients: clients.iter().copied().map(ClientIndex).collect(),
    }
}

#[rstest]
fn declares_one_variable_per_entity_tuple(problem: FleetProblem) {
    let model = model_for(&problem);
    let arcs = model.network().len();
    // 4 nodes, all within range: 12 arcs.
    assert_eq!(arcs, 12);
    let expected = arcs * 2 + 3 * 2 + 3 * 2 + 2 + 3;
    assert_eq!(model.variable_count(), expected);
}

#[rstest]
fn traversal_variables_follow_the_network(problem: FleetProblem) {
    let model = model_for(&problem);
    for (arc, _) in model.network().iter() {
        for vehicle in problem.vehicle_indices() {
            let var = model
                .var(VariableKey::Traverse { arc, vehicle })
                .expect("traversal variable");
            assert_eq!(
                model.variable(var).map(|v| v.domain),
                Some(Domain::Binary)
            );
        }
    }
    let missing = crate::network::ArcId(model.network().len());
    assert!(
        model
            .var(VariableKey::Traverse {
                arc: missing,
                vehicle: VehicleIndex(0),
            })
            .is_none()
    );
}

#[rstest]
fn objective_charges_combined_rate_per_km(problem: FleetProblem) {
    let model = model_for(&problem);
    let rate = CostParameters::default().rate_per_km();
    for (arc, details) in model.network().iter() {
        let var = model
            .var(VariableKey::Traverse {
                arc,
                vehicle: VehicleIndex(1),
            })
            .expect("traversal variable");
        assert_eq!(model.objective().coefficient(var), details.distance_km * rate);
    }
}

#[rstest]
fn every_family_is_generated(problem: FleetProblem) {
    let model = model_for(&problem);
    let count = |family| model.constraints_of(family).count();
    assert_eq!(count(ConstraintFamily::DemandSatisfaction), 3);
    assert_eq!(count(ConstraintFamily::VehicleCapacity), 2);
    assert_eq!(count(ConstraintFamily::VehicleRange), 2);
    assert_eq!(count(ConstraintFamily::DepotInventory), 1);
    assert_eq!(count(ConstraintFamily::ServeFlow), 6);
    assert_eq!(count(ConstraintFamily::QuantityServe), 6);
    assert_eq!(count(ConstraintFamily::FlowConservation), 6);
    assert_eq!(count(ConstraintFamily::DepotDeparture), 2);
    // 6 ordered client pairs for each of 2 vehicles.
    assert_eq!(count(ConstraintFamily::SubtourElimination), 12);
}

#[rstest]
fn encoded_tours_are_feasible(problem: FleetProblem) {
    let model = model_for(&problem);
    let values = model.encode_tours(&[tour(0, &[0, 1]), tour(1, &[2])]);
    assert_eq!(model.violations(&values), Vec::new());

    let distance = model.tour_distance_km(&tour(0, &[0, 1])).expect("tour")
        + model.tour_distance_km(&tour(1, &[2])).expect("tour");
    let objective = model.objective_value(&values).expect("assigned");
    let expected = CostParameters::default().travel_cost(distance);
    assert!((objective - expected).abs() < 1e-6);
}

#[rstest]
fn encoding_sets_orders_and_quantities(problem: FleetProblem) {
    let model = model_for(&problem);
    let values = model.encode_tours(&[tour(0, &[1, 0])]);
    let get = |key| model.var(key).and_then(|var| values.get(var));
    assert_eq!(get(VariableKey::Order { client: ClientIndex(1) }), Some(1.0));
    assert_eq!(get(VariableKey::Order { client: ClientIndex(0) }), Some(2.0));
    assert_eq!(
        get(VariableKey::Quantity {
            client: ClientIndex(1),
            vehicle: VehicleIndex(0),
        }),
        Some(6.0)
    );
    assert_eq!(
        get(VariableKey::Depart {
            depot: DepotIndex(0),
            vehicle: VehicleIndex(0),
        }),
        Some(1.0)
    );
    assert_eq!(
        get(VariableKey::Depart {
            depot: DepotIndex(0),
            vehicle: VehicleIndex(1),
        }),
        Some(0.0)
    );
}

#[rstest]
fn over_capacity_tour_is_reported(problem: FleetProblem) {
    let model = model_for(&problem);
    let values = model.encode_tours(&[tour(1, &[0, 1, 2])]);
    let violations = model.violations(&values);
    assert!(violations.contains(&Violation::Constraint {
        family: ConstraintFamily::VehicleCapacity,
        label: "capacity[V2]".into(),
    }));
}

#[rstest]
fn unserved_client_breaks_demand_satisfaction(problem: FleetProblem) {
    let model = model_for(&problem);
    let values = model.encode_tours(&[tour(0, &[0, 1])]);
    let violations = model.violations(&values);
    assert_eq!(
        violations,
        vec![Violation::Constraint {
            family: ConstraintFamily::DemandSatisfaction,
            label: "demand[C3]".into(),
        }]
    );
}

#[rstest]
fn client_cycle_without_depot_breaks_ordering(problem: FleetProblem) {
    let model = model_for(&problem);
    let mut values = model.encode_tours(&[tour(1, &[2])]);
    let network = model.network();
    let c1 = problem.client_node(ClientIndex(0));
    let c2 = problem.client_node(ClientIndex(1));
    let vehicle = VehicleIndex(0);
    for (from, to) in [(c1, c2), (c2, c1)] {
        let arc = network.arc_between(from, to).expect("arc");
        let var = model.var(VariableKey::Traverse { arc, vehicle }).expect("var");
        values.set(var, 1.0);
    }
    for client in [ClientIndex(0), ClientIndex(1)] {
        let demand = f64::from(problem.client(client).expect("client").demand);
        let serve = model.var(VariableKey::Serve { client, vehicle }).expect("var");
        let quantity = model.var(VariableKey::Quantity { client, vehicle }).expect("var");
        values.set(serve, 1.0);
        values.set(quantity, demand);
    }
    let families: Vec<ConstraintFamily> = model
        .violations(&values)
        .into_iter()
        .filter_map(|violation| match violation {
            Violation::Constraint { family, .. } => Some(family),
            _ => None,
        })
        .collect();
    assert!(!families.is_empty());
    assert!(
        families
            .iter()
            .all(|family| *family == ConstraintFamily::SubtourElimination)
    );
}

#[rstest]
fn ordering_rows_cover_client_pairs_without_arcs() {
    // C1 and C2 sit 8.9 km apart, beyond the 6 km range.
    let problem = FleetProblem::new(
        vec![depot("D1", 0.0, 0.0)],
        vec![client("C1", 1, 0.04, 0.0), client("C2", 1, -0.04, 0.0)],
        vec![vehicle("V1", 10, 6.0)],
    )
    .expect("valid problem");
    let model = model_for(&problem);
    let c1 = problem.client_node(ClientIndex(0));
    let c2 = problem.client_node(ClientIndex(1));
    assert!(model.network().arc_between(c1, c2).is_none());

    let rows: Vec<&Constraint> = model
        .constraints_of(ConstraintFamily::SubtourElimination)
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.lhs.terms().len() == 2));

    let mut values = Assignment::zeroed(model.variable_count());
    let marker = model
        .var(VariableKey::Order {
            client: ClientIndex(0),
        })
        .expect("var");
    values.set(marker, 5.0);
    assert!(model.violations(&values).contains(&Violation::Constraint {
        family: ConstraintFamily::SubtourElimination,
        label: "mtz[C1,C2,V1]".into(),
    }));
}

#[rstest]
fn depot_inventory_bounds_total_shipment() {
    let problem = FleetProblem::new(
        vec![depot("D1", 0.0, 0.0).with_inventory_capacity(5)],
        vec![client("C1", 4, 0.01, 0.0), client("C2", 6, 0.02, 0.0)],
        vec![vehicle("V1", 10, 50.0)],
    )
    .expect("valid problem");
    let model = model_for(&problem);
    let values = model.encode_tours(&[tour(0, &[0, 1])]);
    assert_eq!(
        model.violations(&values),
        vec![Violation::Constraint {
            family: ConstraintFamily::DepotInventory,
            label: "inventory[D1]".into(),
        }]
    );
}

#[rstest]
fn unassigned_and_out_of_domain_values_are_reported(problem: FleetProblem) {
    let model = model_for(&problem);
    let len = model.variable_count();
    assert_eq!(
        model.violations(&Assignment::unassigned(len + 1)),
        vec![Violation::LengthMismatch {
            expected: len,
            actual: len + 1,
        }]
    );

    let mut values = model.encode_tours(&[tour(0, &[0, 1]), tour(1, &[2])]);
    let depart = model
        .var(VariableKey::Depart {
            depot: DepotIndex(0),
            vehicle: VehicleIndex(0),
        })
        .expect("var");
    values.set(depart, 0.5);
    let mut raw = values.values().to_vec();
    raw[0] = None;
    let values = Assignment::from_values(raw);
    let violations = model.violations(&values);
    assert!(violations.contains(&Violation::Unassigned { var: VarId(0) }));
    assert!(violations.contains(&Violation::Domain {
        var: depart,
        value: 0.5,
    }));
}

#[rstest]
fn idle_fleet_is_feasible_without_clients() {
    let problem = FleetProblem::new(
        vec![depot("D1", 0.0, 0.0)],
        Vec::new(),
        vec![vehicle("V1", 10, 50.0)],
    )
    .expect("valid problem");
    let model = model_for(&problem);
    let values = model.encode_tours(&[Tour::idle(VehicleIndex(0), DepotIndex(0))]);
    assert!(model.is_feasible(&values));
    assert_eq!(model.objective_value(&values), Some(0.0));
}

#[rstest]
fn tour_nodes_place_clients_after_depots() {
    let problem = FleetProblem::new(
        vec![depot("D1", 0.0, 0.0), depot("D2", 0.01, 0.0)],
        vec![client("C1", 1, 0.02, 0.0), client("C2", 1, 0.03, 0.0)],
        vec![vehicle("V1", 10, 50.0)],
    )
    .expect("valid problem");
    let model = model_for(&problem);
    let from_d2 = Tour {
        vehicle: VehicleIndex(0),
        depot: DepotIndex(1),
        clients: vec![ClientIndex(1), ClientIndex(0)],
    };
    assert_eq!(
        model.tour_nodes(&from_d2),
        vec![NodeIndex(1), NodeIndex(3), NodeIndex(2), NodeIndex(1)]
    );
    assert!(
        model
            .tour_nodes(&Tour::idle(VehicleIndex(0), DepotIndex(1)))
            .is_empty()
    );
}

#[rstest]
fn tour_distance_requires_feasible_legs() {
    let problem = FleetProblem::new(
        vec![depot("D1", 0.0, 0.0)],
        vec![client("near", 1, 0.01, 0.0), client("far", 1, 3.0, 0.0)],
        vec![vehicle("V1", 10, 5.0)],
    )
    .expect("valid problem");
    let model = model_for(&problem);
    assert!(model.tour_distance_km(&tour(0, &[0])).is_some());
    assert!(model.tour_distance_km(&tour(0, &[1])).is_none());
    assert_eq!(
        model.tour_distance_km(&Tour::idle(VehicleIndex(0), DepotIndex(0))),
        Some(0.0)
    );
}
