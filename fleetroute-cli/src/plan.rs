//! Plan command implementation for the fleetroute CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fleetroute_core::{CostParameters, FleetPlanner, ModelSolver, PlannerConfig, SolverConfig};
use fleetroute_solver_exact::{ExactSolver, ExactSolverConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::load_problem;
use crate::report::{write_report, write_summary};
use crate::{
    ARG_AVERAGE_SPEED, ARG_CLIENTS, ARG_DATA_DIR, ARG_DEPOTS, ARG_FIXED_COST, ARG_FUEL_PRICE,
    ARG_MAINTENANCE_COST, ARG_MAX_NODES, ARG_OUTPUT, ARG_TIME_LIMIT_SECS, ARG_VEHICLES, CliError,
    DEFAULT_CLIENTS_FILE, DEFAULT_DEPOTS_FILE, DEFAULT_REPORT_FILE, DEFAULT_VEHICLES_FILE,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan delivery routes from clients.csv, depots.csv and \
                 vehicles.csv. Paths and cost parameters can come from CLI \
                 flags, configuration files, or environment variables. The \
                 route report is written as CSV and a summary is printed.",
    about = "Plan routes for a delivery fleet"
)]
#[ortho_config(prefix = "FLEETROUTE")]
pub(crate) struct PlanArgs {
    /// Directory containing the default input filenames.
    #[arg(long = ARG_DATA_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) data_dir: Option<Utf8PathBuf>,
    /// Override the path to the client records (`clients.csv`).
    #[arg(long = ARG_CLIENTS, value_name = "path")]
    #[serde(default)]
    pub(crate) clients: Option<Utf8PathBuf>,
    /// Override the path to the depot records (`depots.csv`).
    #[arg(long = ARG_DEPOTS, value_name = "path")]
    #[serde(default)]
    pub(crate) depots: Option<Utf8PathBuf>,
    /// Override the path to the vehicle records (`vehicles.csv`).
    #[arg(long = ARG_VEHICLES, value_name = "path")]
    #[serde(default)]
    pub(crate) vehicles: Option<Utf8PathBuf>,
    /// Where to write the route report.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Wall-clock budget for the solver, in seconds.
    #[arg(long = ARG_TIME_LIMIT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Speed used for reported driving times.
    #[arg(long = ARG_AVERAGE_SPEED, value_name = "km/h")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
    /// Fuel price charged per kilometre.
    #[arg(long = ARG_FUEL_PRICE, value_name = "cost")]
    #[serde(default)]
    pub(crate) fuel_price_per_km: Option<f64>,
    /// Fixed cost charged per kilometre.
    #[arg(long = ARG_FIXED_COST, value_name = "cost")]
    #[serde(default)]
    pub(crate) fixed_cost_per_km: Option<f64>,
    /// Maintenance cost charged per kilometre.
    #[arg(long = ARG_MAINTENANCE_COST, value_name = "cost")]
    #[serde(default)]
    pub(crate) maintenance_cost_per_km: Option<f64>,
    /// Stop the exact search after this many nodes.
    #[arg(long = ARG_MAX_NODES, value_name = "count")]
    #[serde(default)]
    pub(crate) max_nodes: Option<u64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    pub(crate) clients: Utf8PathBuf,
    pub(crate) depots: Utf8PathBuf,
    pub(crate) vehicles: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) planner: PlannerConfig,
    pub(crate) max_nodes: Option<u64>,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.clients, ARG_CLIENTS)?;
        Self::require_existing(&self.depots, ARG_DEPOTS)?;
        Self::require_existing(&self.vehicles, ARG_VEHICLES)?;
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match crate::fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

fn positive(value: Option<f64>, default: f64, field: &'static str) -> Result<f64, CliError> {
    let resolved = value.unwrap_or(default);
    if resolved.is_finite() && resolved > 0.0 {
        Ok(resolved)
    } else {
        Err(CliError::InvalidOption {
            field,
            reason: "must be a positive number",
        })
    }
}

fn non_negative(value: Option<f64>, default: f64, field: &'static str) -> Result<f64, CliError> {
    let resolved = value.unwrap_or(default);
    if resolved.is_finite() && resolved >= 0.0 {
        Ok(resolved)
    } else {
        Err(CliError::InvalidOption {
            field,
            reason: "must be zero or a positive number",
        })
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let data_dir = args.data_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        let clients = args
            .clients
            .unwrap_or_else(|| data_dir.join(DEFAULT_CLIENTS_FILE));
        let depots = args
            .depots
            .unwrap_or_else(|| data_dir.join(DEFAULT_DEPOTS_FILE));
        let vehicles = args
            .vehicles
            .unwrap_or_else(|| data_dir.join(DEFAULT_VEHICLES_FILE));
        let output = args
            .output
            .unwrap_or_else(|| data_dir.join(DEFAULT_REPORT_FILE));

        let defaults = PlannerConfig::default();
        let time_limit = match args.time_limit_secs {
            Some(0) => {
                return Err(CliError::InvalidOption {
                    field: ARG_TIME_LIMIT_SECS,
                    reason: "must be at least one second",
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.solver.time_limit,
        };
        let costs = CostParameters {
            fixed_cost_per_km: non_negative(
                args.fixed_cost_per_km,
                defaults.costs.fixed_cost_per_km,
                ARG_FIXED_COST,
            )?,
            maintenance_cost_per_km: non_negative(
                args.maintenance_cost_per_km,
                defaults.costs.maintenance_cost_per_km,
                ARG_MAINTENANCE_COST,
            )?,
            fuel_price_per_km: non_negative(
                args.fuel_price_per_km,
                defaults.costs.fuel_price_per_km,
                ARG_FUEL_PRICE,
            )?,
            ..defaults.costs
        };
        let planner = PlannerConfig {
            costs,
            solver: SolverConfig { time_limit },
            average_speed_kmh: positive(
                args.average_speed_kmh,
                defaults.average_speed_kmh,
                ARG_AVERAGE_SPEED,
            )?,
        };

        Ok(Self {
            clients,
            depots,
            vehicles,
            output,
            planner,
            max_nodes: args.max_nodes,
        })
    }
}

/// Builds a solver instance for the current plan invocation.
pub(super) trait PlanSolverBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn ModelSolver>, CliError>;
}

pub(super) struct DefaultPlanSolverBuilder;

impl PlanSolverBuilder for DefaultPlanSolverBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn ModelSolver>, CliError> {
        Ok(Box::new(ExactSolver::with_config(ExactSolverConfig {
            max_nodes: config.max_nodes,
        })))
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &DefaultPlanSolverBuilder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanSolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let problem = load_problem(&config)?;
    log::info!(
        "planning {} clients from {} depots with {} vehicles",
        problem.clients().len(),
        problem.depots().len(),
        problem.vehicles().len()
    );

    let solver = builder.build(&config)?;
    let plan = FleetPlanner::with_config(solver, config.planner).plan(&problem)?;

    let file = crate::fs::create_utf8_file(&config.output).map_err(|source| {
        CliError::CreateReport {
            path: config.output.clone(),
            source,
        }
    })?;
    write_report(file, &plan).map_err(|source| CliError::WriteReport {
        path: config.output.clone(),
        source,
    })?;
    write_summary(writer, &problem, &plan, &config.output).map_err(CliError::WriteSummary)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
