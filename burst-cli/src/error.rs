//! Error types for the CLI

use std::path::PathBuf;

use burst::ChartError;
use error_stack::Report;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no node at zoom path {0:?}")]
    UnknownPath(String),

    #[error("chart error: {0}")]
    Chart(String),
}

impl From<Report<ChartError>> for CliError {
    fn from(report: Report<ChartError>) -> Self {
        CliError::Chart(format!("{report:?}"))
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
