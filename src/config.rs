//! Optional TOML configuration for the CLI.
//!
//! ```toml
//! zones_csv = "data/zones.csv"
//! utility_input = "data/pdam.json"
//! output_dir = "out"
//! draft_path = "water_balance_draft.json"
//! preview_rows = 5
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "nrw.toml";
pub const CONFIG_ENV_VAR: &str = "NRW_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub zones_csv: PathBuf,
    pub utility_input: PathBuf,
    pub output_dir: PathBuf,
    pub draft_path: PathBuf,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            zones_csv: PathBuf::from("zones.csv"),
            utility_input: PathBuf::from("utility.json"),
            output_dir: PathBuf::from("."),
            draft_path: PathBuf::from("water_balance_draft.json"),
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$NRW_CONFIG` if set, otherwise `nrw.toml` in the working directory.
    pub fn from_env() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
