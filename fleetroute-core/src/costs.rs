//! Global cost scalars shared by the objective and the report.

/// Per-kilometre cost components and the inventory loss factor.
///
/// The objective charges the sum of all three components for every
/// kilometre driven; reports price fuel alone.
///
/// # Examples
/// ```
/// use fleetroute_core::CostParameters;
///
/// let costs = CostParameters::default();
/// assert_eq!(costs.rate_per_km(), 20_700.0);
/// assert_eq!(costs.travel_cost(2.0), 41_400.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostParameters {
    pub fixed_cost_per_km: f64,
    pub maintenance_cost_per_km: f64,
    pub fuel_price_per_km: f64,
    /// Multiplier applied to shipped quantities when checking depot inventory.
    pub inventory_loss_factor: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            fixed_cost_per_km: 5000.0,
            maintenance_cost_per_km: 700.0,
            fuel_price_per_km: 15_000.0,
            inventory_loss_factor: 1.0,
        }
    }
}

impl CostParameters {
    /// Combined fixed, maintenance and fuel rate charged per kilometre.
    pub fn rate_per_km(&self) -> f64 {
        self.fixed_cost_per_km + self.maintenance_cost_per_km + self.fuel_price_per_km
    }

    /// Objective cost of driving `distance_km`.
    pub fn travel_cost(&self, distance_km: f64) -> f64 {
        distance_km * self.rate_per_km()
    }
}
