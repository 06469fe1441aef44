//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use fleetroute_cli::CliError;
use tracing_subscriber::filter::LevelFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(LevelFilter::INFO)
        .init();

    match fleetroute_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("fleetroute: {err}");
            std::process::exit(1);
        }
    }
}
