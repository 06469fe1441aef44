//! Feasible directed arcs between planning nodes.
//!
//! An arc exists for every ordered pair of distinct nodes whose haversine
//! distance does not exceed the largest range in the fleet. The filter is a
//! necessary condition only; per-vehicle ranges are enforced by the routing
//! model.

use std::collections::HashMap;

use geo::Coord;

use crate::distance::haversine_km;
use crate::problem::{ClientIndex, FleetProblem, NodeIndex};

/// Position of an arc in [`ArcNetwork::arcs`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcId(pub usize);

/// A directed, distance-weighted connection between two nodes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Arc {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub distance_km: f64,
}

/// The sparse set of feasible arcs with adjacency lookups.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetroute_core::{ArcNetwork, NodeIndex};
///
/// let locations = [
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.01, y: 0.0 },
///     Coord { x: 5.0, y: 0.0 },
/// ];
/// let network = ArcNetwork::build(&locations, 10.0);
/// assert_eq!(network.len(), 2);
/// assert!(network.arc_between(NodeIndex(0), NodeIndex(1)).is_some());
/// assert!(network.arc_between(NodeIndex(0), NodeIndex(2)).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcNetwork {
    arcs: Vec<Arc>,
    by_endpoints: HashMap<(NodeIndex, NodeIndex), ArcId>,
    outgoing: Vec<Vec<ArcId>>,
    incoming: Vec<Vec<ArcId>>,
    max_range_km: f64,
}

impl ArcNetwork {
    /// Build the arcs between `locations` no longer than `max_range_km`.
    ///
    /// Arcs are numbered origin-major in node order, so identical inputs
    /// always produce identical networks.
    pub fn build(locations: &[Coord<f64>], max_range_km: f64) -> Self {
        let node_count = locations.len();
        let mut network = Self {
            arcs: Vec::new(),
            by_endpoints: HashMap::new(),
            outgoing: vec![Vec::new(); node_count],
            incoming: vec![Vec::new(); node_count],
            max_range_km,
        };
        for (from, origin) in locations.iter().enumerate() {
            for (to, destination) in locations.iter().enumerate() {
                if from == to {
                    continue;
                }
                let distance_km = haversine_km(*origin, *destination);
                if distance_km <= max_range_km {
                    network.push(NodeIndex(from), NodeIndex(to), distance_km);
                }
            }
        }
        log::debug!(
            "built {} feasible arcs over {node_count} nodes within {max_range_km:.2} km",
            network.arcs.len()
        );
        network
    }

    /// Build the network for every depot and client of `problem`.
    pub fn for_problem(problem: &FleetProblem) -> Self {
        Self::build(&problem.locations(), problem.max_range_km())
    }

    fn push(&mut self, from: NodeIndex, to: NodeIndex, distance_km: f64) {
        let id = ArcId(self.arcs.len());
        self.arcs.push(Arc {
            from,
            to,
            distance_km,
        });
        self.by_endpoints.insert((from, to), id);
        if let Some(out) = self.outgoing.get_mut(from.0) {
            out.push(id);
        }
        if let Some(inc) = self.incoming.get_mut(to.0) {
            inc.push(id);
        }
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArcId, &Arc)> + '_ {
        self.arcs.iter().enumerate().map(|(idx, arc)| (ArcId(idx), arc))
    }

    pub fn arc(&self, id: ArcId) -> Option<&Arc> {
        self.arcs.get(id.0)
    }

    pub fn arc_between(&self, from: NodeIndex, to: NodeIndex) -> Option<ArcId> {
        self.by_endpoints.get(&(from, to)).copied()
    }

    /// Distance of the arc `from -> to`, if that arc is feasible.
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.arc_between(from, to)
            .and_then(|id| self.arc(id))
            .map(|arc| arc.distance_km)
    }

    /// Distance of each consecutive leg of `nodes`, `None` where no arc exists.
    pub fn leg_distances<'a>(
        &'a self,
        nodes: &'a [NodeIndex],
    ) -> impl Iterator<Item = Option<f64>> + 'a {
        nodes.windows(2).map(|leg| self.distance(leg[0], leg[1]))
    }

    /// Arcs leaving `node`.
    pub fn outgoing(&self, node: NodeIndex) -> &[ArcId] {
        self.outgoing.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Arcs entering `node`.
    pub fn incoming(&self, node: NodeIndex) -> &[ArcId] {
        self.incoming.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub const fn max_range_km(&self) -> f64 {
        self.max_range_km
    }

    /// Clients that no feasible arc enters.
    pub fn unreachable_clients(&self, problem: &FleetProblem) -> Vec<ClientIndex> {
        problem
            .client_indices()
            .filter(|client| self.incoming(problem.client_node(*client)).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, depot, vehicle};
    use rstest::{fixture, rstest};

    #[fixture]
    fn locations() -> Vec<Coord<f64>> {
        vec![
            Coord { x: -74.08, y: 4.60 },
            Coord { x: -74.07, y: 4.61 },
            Coord { x: -74.05, y: 4.65 },
            Coord { x: -75.50, y: 6.25 },
        ]
    }

    #[rstest]
    fn arc_distances_match_haversine(locations: Vec<Coord<f64>>) {
        let network = ArcNetwork::build(&locations, 50.0);
        for arc in network.arcs() {
            let expected = haversine_km(locations[arc.from.0], locations[arc.to.0]);
            assert_eq!(arc.distance_km, expected);
            assert_eq!(network.distance(arc.to, arc.from), Some(expected));
        }
    }

    #[rstest]
    fn far_node_is_excluded(locations: Vec<Coord<f64>>) {
        let network = ArcNetwork::build(&locations, 50.0);
        assert!(network.incoming(NodeIndex(3)).is_empty());
        assert!(network.outgoing(NodeIndex(3)).is_empty());
        assert_eq!(network.len(), 6);
    }

    #[rstest]
    fn arcs_are_ordered_origin_major(locations: Vec<Coord<f64>>) {
        let network = ArcNetwork::build(&locations, 1000.0);
        let endpoints: Vec<(usize, usize)> = network
            .arcs()
            .iter()
            .map(|arc| (arc.from.0, arc.to.0))
            .collect();
        let mut sorted = endpoints.clone();
        sorted.sort_unstable();
        assert_eq!(endpoints, sorted);
        assert_eq!(network.len(), 12);
        assert!(network.arcs().iter().all(|arc| arc.from != arc.to));
    }

    #[rstest]
    fn build_is_deterministic(locations: Vec<Coord<f64>>) {
        assert_eq!(
            ArcNetwork::build(&locations, 50.0),
            ArcNetwork::build(&locations, 50.0)
        );
    }

    #[rstest]
    fn adjacency_lists_agree_with_arcs(locations: Vec<Coord<f64>>) {
        let network = ArcNetwork::build(&locations, 50.0);
        for (id, arc) in network.iter() {
            assert!(network.outgoing(arc.from).contains(&id));
            assert!(network.incoming(arc.to).contains(&id));
            assert_eq!(network.arc_between(arc.from, arc.to), Some(id));
        }
        assert!(network.outgoing(NodeIndex(99)).is_empty());
    }

    #[rstest]
    fn leg_distances_mark_missing_arcs(locations: Vec<Coord<f64>>) {
        let network = ArcNetwork::build(&locations, 20.0);
        let nodes = [NodeIndex(0), NodeIndex(1), NodeIndex(3), NodeIndex(0)];
        let legs: Vec<Option<f64>> = network.leg_distances(&nodes).collect();
        assert_eq!(legs.len(), 3);
        assert_eq!(legs[0], network.distance(NodeIndex(0), NodeIndex(1)));
        assert!(legs[0].is_some());
        assert_eq!(legs[1..], [None, None]);
        assert_eq!(network.leg_distances(&[]).count(), 0);
    }

    #[rstest]
    fn reports_unreachable_clients() {
        let problem = FleetProblem::new(
            vec![depot("D1", -74.08, 4.60)],
            vec![client("near", 1, -74.07, 4.61), client("far", 1, -75.5, 6.25)],
            vec![vehicle("V1", 5, 20.0)],
        )
        .expect("valid problem");
        let network = ArcNetwork::for_problem(&problem);
        assert_eq!(network.unreachable_clients(&problem), vec![ClientIndex(1)]);
        assert_eq!(network.node_count(), 3);
    }
}
