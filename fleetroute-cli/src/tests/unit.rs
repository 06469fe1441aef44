//! Focused unit tests covering plan CLI configuration and execution.

use std::time::Duration;

use super::helpers::DataDir;
use super::*;
use crate::plan::{
    DefaultPlanSolverBuilder, PlanConfig, config_from_layers_for_test, run_plan_with,
};
use camino::Utf8PathBuf;
use clap::Parser;
use fleetroute_core::PlannerConfig;
use rstest::rstest;

#[derive(Debug, Copy, Clone)]
enum MissingInput {
    Clients,
    Depots,
    Vehicles,
}

fn config_for(dir: &DataDir) -> PlanConfig {
    PlanConfig::try_from(PlanArgs {
        data_dir: Some(dir.root().to_path_buf()),
        ..PlanArgs::default()
    })
    .expect("config should build")
}

#[rstest]
fn plan_config_derives_default_paths_and_parameters() {
    let args = PlanArgs {
        data_dir: Some(Utf8PathBuf::from("data")),
        ..PlanArgs::default()
    };

    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.clients, Utf8PathBuf::from("data/clients.csv"));
    assert_eq!(config.depots, Utf8PathBuf::from("data/depots.csv"));
    assert_eq!(config.vehicles, Utf8PathBuf::from("data/vehicles.csv"));
    assert_eq!(config.output, Utf8PathBuf::from("data/verificacion_caso1.csv"));
    assert_eq!(config.planner, PlannerConfig::default());
    assert_eq!(config.planner.solver.time_limit, Duration::from_secs(100));
    assert_eq!(config.max_nodes, None);
}

#[rstest]
fn explicit_options_override_defaults() {
    let args = PlanArgs {
        clients: Some(Utf8PathBuf::from("elsewhere/c.csv")),
        output: Some(Utf8PathBuf::from("out/report.csv")),
        time_limit_secs: Some(5),
        average_speed_kmh: Some(40.0),
        fuel_price_per_km: Some(12_000.0),
        max_nodes: Some(1_000),
        ..PlanArgs::default()
    };

    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.clients, Utf8PathBuf::from("elsewhere/c.csv"));
    assert_eq!(config.depots, Utf8PathBuf::from("./depots.csv"));
    assert_eq!(config.output, Utf8PathBuf::from("out/report.csv"));
    assert_eq!(config.planner.solver.time_limit, Duration::from_secs(5));
    assert_eq!(config.planner.average_speed_kmh, 40.0);
    assert_eq!(config.planner.costs.fuel_price_per_km, 12_000.0);
    assert_eq!(config.planner.costs.fixed_cost_per_km, 5_000.0);
    assert_eq!(config.max_nodes, Some(1_000));
}

#[rstest]
#[case::zero_time_limit(
    PlanArgs { time_limit_secs: Some(0), ..PlanArgs::default() },
    ARG_TIME_LIMIT_SECS
)]
#[case::zero_speed(
    PlanArgs { average_speed_kmh: Some(0.0), ..PlanArgs::default() },
    ARG_AVERAGE_SPEED
)]
#[case::negative_fuel_price(
    PlanArgs { fuel_price_per_km: Some(-1.0), ..PlanArgs::default() },
    ARG_FUEL_PRICE
)]
#[case::nan_fixed_cost(
    PlanArgs { fixed_cost_per_km: Some(f64::NAN), ..PlanArgs::default() },
    ARG_FIXED_COST
)]
fn out_of_range_options_are_rejected(#[case] args: PlanArgs, #[case] expected: &'static str) {
    let err = PlanConfig::try_from(args).expect_err("option should be rejected");
    match err {
        CliError::InvalidOption { field, .. } => assert_eq!(field, expected),
        other => panic!("expected InvalidOption, found {other:?}"),
    }
}

#[rstest]
#[case::missing_clients(ARG_CLIENTS, MissingInput::Clients)]
#[case::missing_depots(ARG_DEPOTS, MissingInput::Depots)]
#[case::missing_vehicles(ARG_VEHICLES, MissingInput::Vehicles)]
fn validate_sources_reports_missing_inputs(
    #[case] expected_field: &'static str,
    #[case] missing: MissingInput,
) {
    let dir = DataDir::with_default_files();
    match missing {
        MissingInput::Clients => dir.remove("clients.csv"),
        MissingInput::Depots => dir.remove("depots.csv"),
        MissingInput::Vehicles => dir.remove("vehicles.csv"),
    }

    let err = config_for(&dir)
        .validate_sources()
        .expect_err("expected failure");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let dir = DataDir::with_default_files();
    let clients = dir.path("clients-dir");
    std::fs::create_dir(clients.as_std_path()).expect("clients directory");
    let config = PlanConfig {
        clients: clients.clone(),
        ..config_for(&dir)
    };

    let err = config
        .validate_sources()
        .expect_err("expected directory path to fail validation");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_CLIENTS);
            assert_eq!(path, clients);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "time_limit_secs": "soon" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "data_dir": "from-file",
            "time_limit_secs": 30,
            "fuel_price_per_km": 9_000.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "data_dir": "from-env",
        "vehicles": "fleet/vehicles.csv",
    }));
    composer.push_cli(json!({
        "time_limit_secs": 10,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.clients, Utf8PathBuf::from("from-env/clients.csv"));
    assert_eq!(config.vehicles, Utf8PathBuf::from("fleet/vehicles.csv"));
    assert_eq!(config.planner.solver.time_limit, Duration::from_secs(10));
    assert_eq!(config.planner.costs.fuel_price_per_km, 9_000.0);
}

#[rstest]
fn plan_subcommand_parses_flags() {
    let cli = Cli::try_parse_from([
        "fleetroute",
        "plan",
        "--data-dir",
        "data",
        "--time-limit-secs",
        "5",
        "--max-nodes",
        "100",
    ])
    .expect("arguments parse");
    let Command::Plan(args) = cli.command;
    assert_eq!(args.data_dir, Some(Utf8PathBuf::from("data")));
    assert_eq!(args.time_limit_secs, Some(5));
    assert_eq!(args.max_nodes, Some(100));
}

#[rstest]
fn run_plan_writes_report_beside_inputs() {
    let dir = DataDir::with_default_files();
    let args = PlanArgs {
        data_dir: Some(dir.root().to_path_buf()),
        time_limit_secs: Some(10),
        ..PlanArgs::default()
    };
    let mut stdout = Vec::new();

    run_plan_with(args, &DefaultPlanSolverBuilder, &mut stdout).expect("plan should run");

    let report = dir.read("verificacion_caso1.csv");
    let rows: Vec<&str> = report.lines().collect();
    assert_eq!(rows.len(), 2);
    let row = rows.get(1).expect("route row");
    assert!(row.starts_with("V1,D1,10,D1-"));
    assert!(row.contains(",2,"));

    let summary = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(summary.contains("status: Optimal"));
    assert!(summary.contains("Vehicle V2: no arcs assigned"));
}

#[rstest]
fn run_plan_creates_missing_output_directories() {
    let dir = DataDir::with_default_files();
    let output = dir.path("reports/nested/plan.csv");
    let args = PlanArgs {
        data_dir: Some(dir.root().to_path_buf()),
        output: Some(output.clone()),
        ..PlanArgs::default()
    };
    let mut stdout = Vec::new();

    run_plan_with(args, &DefaultPlanSolverBuilder, &mut stdout).expect("plan should run");
    assert!(output.as_std_path().is_file());
}
