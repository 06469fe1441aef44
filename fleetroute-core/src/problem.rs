//! Depots, clients and vehicles describing one planning run.
//!
//! Nodes are numbered depots first, then clients, both in input order. The
//! first depot is the reference depot every seeded tour starts from and whose
//! inventory bounds the total shipped quantity.

use std::collections::HashSet;

use geo::Coord;
use thiserror::Error;

/// Inventory ceiling assigned to depot records that do not state their own.
pub const DEFAULT_INVENTORY_CEILING: u32 = 1000;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);

        impl $name {
            /// Position within the owning collection.
            pub const fn get(self) -> usize {
                self.0
            }
        }
    };
}

index_type!(
    /// Position of a node in the combined depot-then-client ordering.
    NodeIndex
);
index_type!(
    /// Position of a depot in [`FleetProblem::depots`].
    DepotIndex
);
index_type!(
    /// Position of a client in [`FleetProblem::clients`].
    ClientIndex
);
index_type!(
    /// Position of a vehicle in [`FleetProblem::vehicles`].
    VehicleIndex
);

/// A source warehouse. Coordinates are WGS84 with `x = longitude`.
#[derive(Debug, Clone, PartialEq)]
pub struct Depot {
    pub id: String,
    pub location: Coord<f64>,
    pub inventory_capacity: u32,
}

impl Depot {
    /// Construct a depot holding [`DEFAULT_INVENTORY_CEILING`] units.
    pub fn new(id: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            location,
            inventory_capacity: DEFAULT_INVENTORY_CEILING,
        }
    }

    /// Replace the inventory capacity.
    #[must_use]
    pub const fn with_inventory_capacity(mut self, inventory_capacity: u32) -> Self {
        self.inventory_capacity = inventory_capacity;
        self
    }
}

/// A delivery point requiring its full demand from exactly one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: String,
    pub demand: u32,
    pub location: Coord<f64>,
}

impl Client {
    pub fn new(id: impl Into<String>, demand: u32, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            demand,
            location,
        }
    }
}

/// A delivery vehicle with a load capacity and a per-tour range in kilometres.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub capacity: u32,
    pub range_km: f64,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, capacity: u32, range_km: f64) -> Self {
        Self {
            id: id.into(),
            capacity,
            range_km,
        }
    }
}

/// Role of a node in the combined ordering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Depot(DepotIndex),
    Client(ClientIndex),
}

/// Errors returned by [`FleetProblem::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    /// No depot records were supplied.
    #[error("at least one depot is required")]
    NoDepots,
    /// No vehicle records were supplied.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// A depot or client identifier appears twice.
    #[error("node identifier {id:?} is used more than once")]
    DuplicateNodeId { id: String },
    /// A vehicle identifier appears twice.
    #[error("vehicle identifier {id:?} is used more than once")]
    DuplicateVehicleId { id: String },
    /// A client asks for nothing.
    #[error("client {id:?} must have a positive demand")]
    ZeroDemand { id: String },
    /// A vehicle cannot carry anything.
    #[error("vehicle {id:?} must have a positive capacity")]
    ZeroCapacity { id: String },
    /// A vehicle range is zero, negative or not a number.
    #[error("vehicle {id:?} has invalid range {range_km}")]
    InvalidRange { id: String, range_km: f64 },
    /// A node coordinate is not finite.
    #[error("node {id:?} has non-finite coordinates")]
    InvalidLocation { id: String },
}

/// Validated input records for one planning run.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::{Client, Depot, FleetProblem, NodeIndex, NodeKind, Vehicle};
///
/// # fn main() -> Result<(), fleetroute_core::ProblemError> {
/// let problem = FleetProblem::new(
///     vec![Depot::new("D1", Coord { x: 0.0, y: 0.0 })],
///     vec![Client::new("C1", 3, Coord { x: 0.01, y: 0.0 })],
///     vec![Vehicle::new("V1", 5, 10.0)],
/// )?;
/// assert_eq!(problem.node_count(), 2);
/// assert!(matches!(problem.node_kind(NodeIndex(1)), Some(NodeKind::Client(_))));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FleetProblem {
    depots: Vec<Depot>,
    clients: Vec<Client>,
    vehicles: Vec<Vehicle>,
}

impl FleetProblem {
    /// Validate and assemble the planning input.
    ///
    /// # Errors
    /// Returns [`ProblemError`] for missing depots or vehicles, duplicate
    /// identifiers, zero demand or capacity, invalid ranges and non-finite
    /// coordinates.
    pub fn new(
        depots: Vec<Depot>,
        clients: Vec<Client>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, ProblemError> {
        if depots.is_empty() {
            return Err(ProblemError::NoDepots);
        }
        if vehicles.is_empty() {
            return Err(ProblemError::NoVehicles);
        }

        let mut node_ids = HashSet::new();
        let nodes = depots
            .iter()
            .map(|depot| (&depot.id, depot.location))
            .chain(clients.iter().map(|client| (&client.id, client.location)));
        for (id, location) in nodes {
            if !node_ids.insert(id.as_str()) {
                return Err(ProblemError::DuplicateNodeId { id: id.clone() });
            }
            if !(location.x.is_finite() && location.y.is_finite()) {
                return Err(ProblemError::InvalidLocation { id: id.clone() });
            }
        }
        if let Some(client) = clients.iter().find(|client| client.demand == 0) {
            return Err(ProblemError::ZeroDemand {
                id: client.id.clone(),
            });
        }

        let mut vehicle_ids = HashSet::new();
        for vehicle in &vehicles {
            if !vehicle_ids.insert(vehicle.id.as_str()) {
                return Err(ProblemError::DuplicateVehicleId {
                    id: vehicle.id.clone(),
                });
            }
            if vehicle.capacity == 0 {
                return Err(ProblemError::ZeroCapacity {
                    id: vehicle.id.clone(),
                });
            }
            if !(vehicle.range_km.is_finite() && vehicle.range_km > 0.0) {
                return Err(ProblemError::InvalidRange {
                    id: vehicle.id.clone(),
                    range_km: vehicle.range_km,
                });
            }
        }

        Ok(Self {
            depots,
            clients,
            vehicles,
        })
    }

    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn depot(&self, depot: DepotIndex) -> Option<&Depot> {
        self.depots.get(depot.0)
    }

    pub fn client(&self, client: ClientIndex) -> Option<&Client> {
        self.clients.get(client.0)
    }

    pub fn vehicle(&self, vehicle: VehicleIndex) -> Option<&Vehicle> {
        self.vehicles.get(vehicle.0)
    }

    /// The first depot in input order.
    ///
    /// Seeded tours start here and its inventory bounds the shipped total.
    pub const fn reference_depot(&self) -> DepotIndex {
        DepotIndex(0)
    }

    pub fn depot_indices(&self) -> impl Iterator<Item = DepotIndex> + '_ {
        (0..self.depots.len()).map(DepotIndex)
    }

    pub fn client_indices(&self) -> impl Iterator<Item = ClientIndex> + '_ {
        (0..self.clients.len()).map(ClientIndex)
    }

    pub fn vehicle_indices(&self) -> impl Iterator<Item = VehicleIndex> + '_ {
        (0..self.vehicles.len()).map(VehicleIndex)
    }

    /// Number of depots plus clients.
    pub fn node_count(&self) -> usize {
        self.depots.len() + self.clients.len()
    }

    pub const fn depot_node(&self, depot: DepotIndex) -> NodeIndex {
        NodeIndex(depot.0)
    }

    pub fn client_node(&self, client: ClientIndex) -> NodeIndex {
        NodeIndex(self.depots.len() + client.0)
    }

    pub fn node_kind(&self, node: NodeIndex) -> Option<NodeKind> {
        if node.0 < self.depots.len() {
            Some(NodeKind::Depot(DepotIndex(node.0)))
        } else if node.0 < self.node_count() {
            Some(NodeKind::Client(ClientIndex(node.0 - self.depots.len())))
        } else {
            None
        }
    }

    /// Identifier of the depot or client at `node`.
    pub fn node_id(&self, node: NodeIndex) -> Option<&str> {
        match self.node_kind(node)? {
            NodeKind::Depot(depot) => self.depot(depot).map(|d| d.id.as_str()),
            NodeKind::Client(client) => self.client(client).map(|c| c.id.as_str()),
        }
    }

    /// Coordinates of every node in node order.
    pub fn locations(&self) -> Vec<Coord<f64>> {
        self.depots
            .iter()
            .map(|depot| depot.location)
            .chain(self.clients.iter().map(|client| client.location))
            .collect()
    }

    /// Largest range across the fleet, used to prefilter arcs.
    pub fn max_range_km(&self) -> f64 {
        self.vehicles
            .iter()
            .map(|vehicle| vehicle.range_km)
            .fold(0.0, f64::max)
    }

    pub fn total_demand(&self) -> u64 {
        self.clients
            .iter()
            .map(|client| u64::from(client.demand))
            .sum()
    }
}
