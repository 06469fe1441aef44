//! CSV records for depots, clients and vehicles.
//!
//! Column names follow the dataset headers: `ClientID, Demand, Longitude,
//! Latitude`, `DepotID, Longitude, Latitude` and `VehicleID, Capacity,
//! Range`. Missing or malformed fields abort the run.

use std::io::{BufReader, Read};

use camino::Utf8Path;
use fleetroute_core::{Client, Depot, FleetProblem, Vehicle};
use geo::Coord;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::fs::open_utf8_file;
use crate::plan::PlanConfig;
use crate::{ARG_CLIENTS, ARG_DEPOTS, ARG_VEHICLES, CliError};

#[derive(Debug, Deserialize)]
struct ClientRecord {
    #[serde(rename = "ClientID")]
    id: String,
    #[serde(rename = "Demand")]
    demand: u32,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
}

#[derive(Debug, Deserialize)]
struct DepotRecord {
    #[serde(rename = "DepotID")]
    id: String,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Latitude")]
    latitude: f64,
}

#[derive(Debug, Deserialize)]
struct VehicleRecord {
    #[serde(rename = "VehicleID")]
    id: String,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(rename = "Range")]
    range_km: f64,
}

/// Read every record of type `T` from a headed CSV stream.
fn read_records<T, R: Read>(reader: R) -> Result<Vec<T>, csv::Error>
where
    T: DeserializeOwned,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(reader))
        .deserialize()
        .collect()
}

fn load_records<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<Vec<T>, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} {field} records from {path}", records.len());
    Ok(records)
}

/// Load and validate the planning input named by `config`.
pub(crate) fn load_problem(config: &PlanConfig) -> Result<FleetProblem, CliError> {
    let depots = load_records::<DepotRecord>(&config.depots, ARG_DEPOTS)?
        .into_iter()
        .map(|r| Depot::new(r.id, Coord { x: r.longitude, y: r.latitude }))
        .collect();
    let clients = load_records::<ClientRecord>(&config.clients, ARG_CLIENTS)?
        .into_iter()
        .map(|r| Client::new(r.id, r.demand, Coord { x: r.longitude, y: r.latitude }))
        .collect();
    let vehicles = load_records::<VehicleRecord>(&config.vehicles, ARG_VEHICLES)?
        .into_iter()
        .map(|r| Vehicle::new(r.id, r.capacity, r.range_km))
        .collect();
    Ok(FleetProblem::new(depots, clients, vehicles)?)
}
