//! Command-line interface for planning fleet routes from CSV records.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod input;
mod plan;
mod report;

pub use error::CliError;

use plan::{PlanArgs, run_plan};

pub(crate) const ARG_DATA_DIR: &str = "data-dir";
pub(crate) const ARG_CLIENTS: &str = "clients";
pub(crate) const ARG_DEPOTS: &str = "depots";
pub(crate) const ARG_VEHICLES: &str = "vehicles";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_TIME_LIMIT_SECS: &str = "time-limit-secs";
pub(crate) const ARG_AVERAGE_SPEED: &str = "average-speed-kmh";
pub(crate) const ARG_FUEL_PRICE: &str = "fuel-price-per-km";
pub(crate) const ARG_FIXED_COST: &str = "fixed-cost-per-km";
pub(crate) const ARG_MAINTENANCE_COST: &str = "maintenance-cost-per-km";
pub(crate) const ARG_MAX_NODES: &str = "max-nodes";

pub(crate) const DEFAULT_CLIENTS_FILE: &str = "clients.csv";
pub(crate) const DEFAULT_DEPOTS_FILE: &str = "depots.csv";
pub(crate) const DEFAULT_VEHICLES_FILE: &str = "vehicles.csv";
pub(crate) const DEFAULT_REPORT_FILE: &str = "verificacion_caso1.csv";

/// Run the fleetroute CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, input loading,
/// planning or report writing fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fleetroute",
    about = "Plan capacity- and range-limited delivery routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan routes for the depots, clients and vehicles in a data directory.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
