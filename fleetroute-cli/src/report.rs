//! Route report CSV and console summary.

use std::io::{self, Write};

use camino::Utf8Path;
use fleetroute_core::{FleetPlan, FleetProblem, VehicleRoute};
use serde::Serialize;

/// One report row per vehicle that leaves its depot.
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "VehicleId")]
    vehicle_id: &'a str,
    #[serde(rename = "DepotId")]
    depot_id: &'a str,
    #[serde(rename = "InitialLoad")]
    initial_load: u64,
    #[serde(rename = "RouteSequence")]
    route_sequence: String,
    #[serde(rename = "ClientsServed")]
    clients_served: usize,
    #[serde(rename = "DemandsSatisfied")]
    demands_satisfied: String,
    #[serde(rename = "TotalDistance")]
    total_distance: String,
    #[serde(rename = "TotalTime")]
    total_time: String,
    #[serde(rename = "FuelCost")]
    fuel_cost: u64,
}

impl<'a> From<&'a VehicleRoute> for ReportRow<'a> {
    fn from(route: &'a VehicleRoute) -> Self {
        Self {
            vehicle_id: &route.vehicle_id,
            depot_id: &route.depot_id,
            initial_load: route.initial_load,
            route_sequence: route.route_sequence(),
            clients_served: route.clients_served(),
            demands_satisfied: route.demands_satisfied(),
            total_distance: format!("{:.2}", route.total_distance_km),
            total_time: format!("{:.1}", route.total_time_minutes),
            fuel_cost: route.fuel_cost,
        }
    }
}

const HEADERS: [&str; 9] = [
    "VehicleId",
    "DepotId",
    "InitialLoad",
    "RouteSequence",
    "ClientsServed",
    "DemandsSatisfied",
    "TotalDistance",
    "TotalTime",
    "FuelCost",
];

/// Write the report table for `plan`; idle vehicles have no row.
///
/// The header row is written even when no vehicle leaves its depot.
pub(crate) fn write_report<W: Write>(writer: W, plan: &FleetPlan) -> Result<(), csv::Error> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(HEADERS)?;
    for route in &plan.routes {
        csv.serialize(ReportRow::from(route))?;
    }
    csv.flush()?;
    Ok(())
}

/// Print the run status and each vehicle's arcs in input order.
pub(crate) fn write_summary(
    writer: &mut dyn Write,
    problem: &FleetProblem,
    plan: &FleetPlan,
    report_path: &Utf8Path,
) -> io::Result<()> {
    match plan.objective {
        Some(objective) => writeln!(writer, "status: {:?} (objective {objective:.2})", plan.status)?,
        None => writeln!(writer, "status: {:?}", plan.status)?,
    }
    for vehicle in problem.vehicles() {
        let route = plan
            .routes
            .iter()
            .find(|route| route.vehicle_id == vehicle.id);
        match route {
            Some(route) => {
                let arcs: Vec<String> = route
                    .legs()
                    .into_iter()
                    .map(|(from, to)| format!("({from}, {to})"))
                    .collect();
                writeln!(writer, "Vehicle {}: [{}]", vehicle.id, arcs.join(", "))?;
            }
            None => writeln!(writer, "Vehicle {}: no arcs assigned", vehicle.id)?,
        }
    }
    if !plan.unreachable_clients.is_empty() {
        writeln!(
            writer,
            "unreachable clients: {}",
            plan.unreachable_clients.join(", ")
        )?;
    }
    writeln!(writer, "report written to {report_path}")
}
