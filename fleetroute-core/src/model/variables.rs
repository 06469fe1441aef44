//! Typed decision variables keyed by the entities they describe.

use crate::network::ArcId;
use crate::problem::{ClientIndex, DepotIndex, VehicleIndex};

/// Position of a variable in [`RoutingModel::variables`](super::RoutingModel::variables).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Entity key identifying a decision variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariableKey {
    /// Vehicle drives the arc. Only declared for feasible arcs.
    Traverse { arc: ArcId, vehicle: VehicleIndex },
    /// Vehicle serves the client.
    Serve {
        client: ClientIndex,
        vehicle: VehicleIndex,
    },
    /// Units the vehicle delivers to the client.
    Quantity {
        client: ClientIndex,
        vehicle: VehicleIndex,
    },
    /// Vehicle departs from the depot.
    Depart {
        depot: DepotIndex,
        vehicle: VehicleIndex,
    },
    /// Sequence-position marker used by subtour elimination.
    Order { client: ClientIndex },
}

/// Value domain of a variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Domain {
    Binary,
    NonNegativeInteger,
    NonNegativeReal,
}

impl Domain {
    /// Whether `value` lies in the domain, allowing `tolerance` of slack.
    pub fn admits(self, value: f64, tolerance: f64) -> bool {
        if !value.is_finite() || value < -tolerance {
            return false;
        }
        match self {
            Self::Binary => value.abs() <= tolerance || (value - 1.0).abs() <= tolerance,
            Self::NonNegativeInteger => (value - value.round()).abs() <= tolerance,
            Self::NonNegativeReal => true,
        }
    }
}

/// A declared variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Variable {
    pub key: VariableKey,
    pub domain: Domain,
}
