//! Linear expressions and constraints over model variables.

use super::assignment::Assignment;
use super::variables::VarId;

/// A sum of `coefficient * variable` terms.
///
/// # Examples
/// ```
/// use fleetroute_core::{Assignment, LinearExpr, VarId};
///
/// let expr = LinearExpr::new()
///     .with_term(VarId(0), 2.0)
///     .with_term(VarId(1), -1.0);
/// let values = Assignment::from_values(vec![Some(3.0), Some(1.0)]);
/// assert_eq!(expr.evaluate(&values), Some(5.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    #[must_use]
    pub fn with_term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Total coefficient of `var` across all its terms.
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(term_var, _)| *term_var == var)
            .map(|(_, coefficient)| coefficient)
            .sum()
    }

    /// Value under `values`, or `None` when a referenced variable is unassigned.
    pub fn evaluate(&self, values: &Assignment) -> Option<f64> {
        self.terms.iter().try_fold(0.0, |acc, (var, coefficient)| {
            values.get(*var).map(|value| acc + coefficient * value)
        })
    }
}

impl Extend<(VarId, f64)> for LinearExpr {
    fn extend<I: IntoIterator<Item = (VarId, f64)>>(&mut self, iter: I) {
        self.terms.extend(iter);
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Comparison between a constraint's left-hand side and its bound.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl Relation {
    /// Whether `lhs relation rhs` holds within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Self::LessOrEqual => lhs <= rhs + tolerance,
            Self::Equal => (lhs - rhs).abs() <= tolerance,
            Self::GreaterOrEqual => lhs + tolerance >= rhs,
        }
    }
}

/// Constraint families of the routing model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Every client receives exactly its demand.
    DemandSatisfaction,
    /// Served demand fits in each vehicle.
    VehicleCapacity,
    /// Driven distance fits in each vehicle's range.
    VehicleRange,
    /// Shipped quantity fits in the reference depot.
    DepotInventory,
    /// A client is served by a vehicle iff the vehicle enters it once.
    ServeFlow,
    /// Deliveries are all-or-nothing.
    QuantityServe,
    /// A vehicle leaves every client it enters.
    FlowConservation,
    /// A departing vehicle drives an arc out of its depot.
    DepotDeparture,
    /// Miller-Tucker-Zemlin ordering forbids client-only cycles.
    SubtourElimination,
}

/// A linear constraint `lhs relation rhs` with a readable label.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub label: String,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Whether the constraint holds, or `None` if a variable is unassigned.
    pub fn is_satisfied_by(&self, values: &Assignment, tolerance: f64) -> Option<bool> {
        self.lhs
            .evaluate(values)
            .map(|lhs| self.relation.holds(lhs, self.rhs, tolerance))
    }
}
