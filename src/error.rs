//! Error types shared by the loader, config and pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Dataset path has an extension the loader does not understand.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nothing survived filtering, so there is no mean to compute.
    #[error("Empty cohort: no movies left after filtering {raw_records} raw records")]
    EmptyCohort { raw_records: usize },
}

/// Failures of the inflation adjustment collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InflationError {
    #[error("no CPI data for year {0}")]
    UnknownYear(i32),

    #[error("amount {0} cannot be adjusted")]
    InvalidAmount(f64),
}
