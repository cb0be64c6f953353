//! Crate-level error type for the I/O edges (files, CSV, JSON, config).
//!
//! The calculation core never returns these: malformed numbers default and
//! structural input problems are reported through `validator::ValidationReport`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Zone mode was evaluated with an empty zone collection.
    #[error("Tambahkan minimal 1 zona DMA terlebih dahulu")]
    NoZones,

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
