//! Error types emitted by the fleetroute CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fleetroute_core::{PlanError, ProblemError};
use thiserror::Error;

/// Errors emitted by the fleetroute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A numeric option is out of range after configuration merging.
    #[error("invalid --{field}: {reason}")]
    InvalidOption {
        field: &'static str,
        reason: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening an input CSV failed.
    #[error("failed to open {field} records at {path:?}: {source}")]
    OpenInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input CSV has missing or malformed fields.
    #[error("failed to parse {field} records at {path:?}: {source}")]
    ParseInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The records do not form a valid planning problem.
    #[error("invalid planning input: {0}")]
    InvalidProblem(#[from] ProblemError),
    /// The planner could not produce a plan.
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),
    /// Creating the report file failed.
    #[error("failed to create report at {path:?}: {source}")]
    CreateReport {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing the report rows failed.
    #[error("failed to write report to {path:?}: {source}")]
    WriteReport {
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },
    /// Writing the console summary failed.
    #[error("failed to write plan summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}
