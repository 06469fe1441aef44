//! Turn solver assignments into validated per-vehicle routes.
//!
//! A traversal counts when its value exceeds [`TRAVERSAL_THRESHOLD`];
//! unassigned values count as not traversed. Each vehicle's arcs must form
//! exactly one closed walk from a depot back to the same depot. Anything else
//! is reported as a [`DecodeError`] rather than silently trimmed.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::model::{Assignment, RoutingModel, VariableKey};
use crate::problem::{FleetProblem, NodeIndex, NodeKind, VehicleIndex};

/// Values above this mark an arc as traversed.
pub const TRAVERSAL_THRESHOLD: f64 = 0.5;

/// Speed used to convert route distance into driving time.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 25.0;

const RANGE_TOLERANCE_KM: f64 = 1e-6;

/// Errors returned by [`SolutionDecoder::decode`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// A node is left by more than one traversed arc of the same vehicle.
    #[error("vehicle {vehicle} leaves node {node} more than once")]
    Branching { vehicle: String, node: String },
    /// The vehicle drives arcs but none leaves a depot.
    #[error("vehicle {vehicle} drives arcs without departing a depot")]
    MissingDepotDeparture { vehicle: String },
    /// The vehicle departs from more than one depot.
    #[error("vehicle {vehicle} departs from more than one depot")]
    MultipleDepotDepartures { vehicle: String },
    /// The walk stops at a node no traversed arc leaves.
    #[error("route of vehicle {vehicle} stops at {node} without returning")]
    BrokenChain { vehicle: String, node: String },
    /// The walk ends at a depot other than the one it left.
    #[error("vehicle {vehicle} leaves depot {start} but ends at {end}")]
    OpenRoute {
        vehicle: String,
        start: String,
        end: String,
    },
    /// Traversed arcs remain after the depot walk closes.
    #[error("vehicle {vehicle} drives {count} arcs detached from its route")]
    DetachedArcs { vehicle: String, count: usize },
    /// A client is visited twice, on one route or across the fleet.
    #[error("client {client} is visited more than once")]
    ClientServedTwice { client: String },
    /// The route carries more than the vehicle holds.
    #[error("vehicle {vehicle} carries {load} units over capacity {capacity}")]
    CapacityExceeded {
        vehicle: String,
        load: u64,
        capacity: u32,
    },
    /// The route is longer than the vehicle's range.
    #[error("vehicle {vehicle} drives {distance_km:.2} km over range {range_km:.2} km")]
    RangeExceeded {
        vehicle: String,
        distance_km: f64,
        range_km: f64,
    },
}

/// The decoded route of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    pub vehicle: VehicleIndex,
    pub vehicle_id: String,
    pub depot_id: String,
    /// Visited nodes, starting and ending at the depot.
    pub nodes: Vec<NodeIndex>,
    /// Identifiers of [`Self::nodes`].
    pub sequence: Vec<String>,
    /// Demand of each served client in visiting order.
    pub client_demands: Vec<u32>,
    /// Units loaded at the depot.
    pub initial_load: u64,
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    /// Fuel price times distance, truncated.
    pub fuel_cost: u64,
}

impl VehicleRoute {
    pub fn clients_served(&self) -> usize {
        self.client_demands.len()
    }

    /// Node identifiers joined with `-`, e.g. `D1-C2-C1-D1`.
    pub fn route_sequence(&self) -> String {
        self.sequence.join("-")
    }

    /// Served demands joined with `-`.
    pub fn demands_satisfied(&self) -> String {
        self.client_demands
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Consecutive `(from, to)` identifier pairs.
    pub fn legs(&self) -> Vec<(&str, &str)> {
        self.sequence
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect()
    }
}

/// Routes of every active vehicle plus the identifiers of idle ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPlan {
    pub routes: Vec<VehicleRoute>,
    pub idle_vehicles: Vec<String>,
}

impl DecodedPlan {
    pub fn total_distance_km(&self) -> f64 {
        self.routes.iter().map(|route| route.total_distance_km).sum()
    }

    pub fn total_fuel_cost(&self) -> u64 {
        self.routes.iter().map(|route| route.fuel_cost).sum()
    }
}

/// Reads traversal values back into routes.
#[derive(Debug, Clone, Copy)]
pub struct SolutionDecoder<'a> {
    problem: &'a FleetProblem,
    model: &'a RoutingModel,
    average_speed_kmh: f64,
}

impl<'a> SolutionDecoder<'a> {
    pub const fn new(problem: &'a FleetProblem, model: &'a RoutingModel) -> Self {
        Self {
            problem,
            model,
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
        }
    }

    #[must_use]
    pub const fn with_average_speed(mut self, average_speed_kmh: f64) -> Self {
        self.average_speed_kmh = average_speed_kmh;
        self
    }

    /// Decode every vehicle and check clients are not shared between routes.
    ///
    /// # Errors
    /// Returns the first [`DecodeError`] found, in vehicle order.
    pub fn decode(&self, values: &Assignment) -> Result<DecodedPlan, DecodeError> {
        let mut plan = DecodedPlan::default();
        let mut served = HashSet::new();
        for (vehicle, record) in self.problem.vehicle_indices().zip(self.problem.vehicles()) {
            let Some(route) = self.decode_vehicle(vehicle, values)? else {
                log::debug!("vehicle {} has no traversed arcs", record.id);
                plan.idle_vehicles.push(record.id.clone());
                continue;
            };
            for node in &route.nodes {
                if matches!(self.problem.node_kind(*node), Some(NodeKind::Client(_)))
                    && !served.insert(*node)
                {
                    return Err(DecodeError::ClientServedTwice {
                        client: self.id(*node),
                    });
                }
            }
            plan.routes.push(route);
        }
        Ok(plan)
    }

    /// Decode one vehicle; `None` when it drives no arc.
    ///
    /// # Errors
    /// Returns a [`DecodeError`] when the traversed arcs do not form a single
    /// closed depot tour within capacity and range.
    pub fn decode_vehicle(
        &self,
        vehicle: VehicleIndex,
        values: &Assignment,
    ) -> Result<Option<VehicleRoute>, DecodeError> {
        let vehicle_id = self
            .problem
            .vehicle(vehicle)
            .map(|record| record.id.clone())
            .unwrap_or_default();
        let traversed = self.traversed_arcs(vehicle, values);
        if traversed.is_empty() {
            return Ok(None);
        }

        let mut successors: HashMap<NodeIndex, (NodeIndex, f64)> = HashMap::new();
        let mut starts = Vec::new();
        for &(from, to, distance) in &traversed {
            if successors.insert(from, (to, distance)).is_some() {
                return Err(DecodeError::Branching {
                    vehicle: vehicle_id,
                    node: self.id(from),
                });
            }
            if self.is_depot(from) {
                starts.push(from);
            }
        }
        let start = match starts.as_slice() {
            [] => {
                return Err(DecodeError::MissingDepotDeparture {
                    vehicle: vehicle_id,
                });
            }
            [start] => *start,
            _ => {
                return Err(DecodeError::MultipleDepotDepartures {
                    vehicle: vehicle_id,
                });
            }
        };

        let mut nodes = vec![start];
        let mut visited = HashSet::new();
        let mut client_demands = Vec::new();
        let mut total_distance_km = 0.0;
        let mut current = start;
        loop {
            let Some(&(next, distance)) = successors.get(&current) else {
                return Err(DecodeError::BrokenChain {
                    vehicle: vehicle_id,
                    node: self.id(current),
                });
            };
            total_distance_km += distance;
            nodes.push(next);
            match self.problem.node_kind(next) {
                Some(NodeKind::Client(client)) => {
                    if !visited.insert(next) {
                        return Err(DecodeError::ClientServedTwice {
                            client: self.id(next),
                        });
                    }
                    client_demands.push(self.problem.client(client).map_or(0, |c| c.demand));
                    current = next;
                }
                _ if next == start => break,
                _ => {
                    return Err(DecodeError::OpenRoute {
                        vehicle: vehicle_id,
                        start: self.id(start),
                        end: self.id(next),
                    });
                }
            }
        }

        let used = nodes.len() - 1;
        if used < traversed.len() {
            return Err(DecodeError::DetachedArcs {
                vehicle: vehicle_id,
                count: traversed.len() - used,
            });
        }

        let initial_load: u64 = client_demands.iter().copied().map(u64::from).sum();
        if let Some(record) = self.problem.vehicle(vehicle) {
            if initial_load > u64::from(record.capacity) {
                return Err(DecodeError::CapacityExceeded {
                    vehicle: vehicle_id,
                    load: initial_load,
                    capacity: record.capacity,
                });
            }
            if total_distance_km > record.range_km + RANGE_TOLERANCE_KM {
                return Err(DecodeError::RangeExceeded {
                    vehicle: vehicle_id,
                    distance_km: total_distance_km,
                    range_km: record.range_km,
                });
            }
        }

        let fuel_price = self.model.parameters().costs.fuel_price_per_km;
        Ok(Some(VehicleRoute {
            vehicle,
            vehicle_id,
            depot_id: self.id(start),
            sequence: nodes.iter().map(|node| self.id(*node)).collect(),
            nodes,
            client_demands,
            initial_load,
            total_distance_km,
            total_time_minutes: total_distance_km / self.average_speed_kmh * 60.0,
            fuel_cost: (total_distance_km * fuel_price).trunc() as u64,
        }))
    }

    fn traversed_arcs(
        &self,
        vehicle: VehicleIndex,
        values: &Assignment,
    ) -> Vec<(NodeIndex, NodeIndex, f64)> {
        let network = self.model.network();
        network
            .iter()
            .filter(|(arc, _)| {
                self.model
                    .var(VariableKey::Traverse { arc: *arc, vehicle })
                    .and_then(|var| values.get(var))
                    .is_some_and(|value| value > TRAVERSAL_THRESHOLD)
            })
            .map(|(_, arc)| (arc.from, arc.to, arc.distance_km))
            .collect()
    }

    fn is_depot(&self, node: NodeIndex) -> bool {
        matches!(self.problem.node_kind(node), Some(NodeKind::Depot(_)))
    }

    fn id(&self, node: NodeIndex) -> String {
        self.problem.node_id(node).unwrap_or_default().to_owned()
    }
}
