//! Serializable scan configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! data_dir = "data"
//! output_dir = "output"
//! universe_file = "universe.toml"
//! top_n = 10
//!
//! [rs_model.with_hourly]
//! weekly = 0.40
//! daily = 0.35
//! hourly = 0.25
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trendscan_core::data::{Universe, UniverseError};
use trendscan_core::domain::{Symbol, Timeframe};
use trendscan_core::model::{ModelError, RsModel, SpotModel};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid model: {0}")]
    Model(#[from] ModelError),

    #[error("universe: {0}")]
    Universe(#[from] UniverseError),

    #[error("top_n must be at least 1")]
    TopN,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Overrides the universe's benchmark when set.
    pub benchmark: Option<Symbol>,
    /// Root of the `<timeframe>/<SYMBOL>.csv` bar directory.
    pub data_dir: PathBuf,
    /// Root for scan CSVs and watchlists.
    pub output_dir: PathBuf,
    /// Universe TOML; the built-in US mega-cap universe when absent.
    pub universe_file: Option<PathBuf>,
    /// Rows per watchlist and per printed ranking.
    pub top_n: usize,
    /// Fan the per-symbol phase out across rayon workers.
    pub parallel: bool,
    /// Load hourly bars for the relative-strength scan.
    pub include_hourly: bool,
    /// Fill missing bar files with deterministic synthetic series.
    pub synthetic: bool,
    pub rs_model: RsModel,
    pub spot_model: SpotModel,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            benchmark: None,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            universe_file: None,
            top_n: 10,
            parallel: true,
            include_hourly: true,
            synthetic: false,
            rs_model: RsModel::default(),
            spot_model: SpotModel::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::TopN);
        }
        self.rs_model.validate()?;
        self.spot_model.validate()?;
        Ok(())
    }

    /// Load the configured universe (or the built-in one) and apply the
    /// benchmark override.
    pub fn universe(&self) -> Result<Universe, ConfigError> {
        let mut universe = match &self.universe_file {
            Some(path) => Universe::from_file(path)?,
            None => Universe::default_us(),
        };
        if let Some(benchmark) = &self.benchmark {
            universe.benchmark = benchmark.clone();
        }
        Ok(universe)
    }

    /// Timeframes the relative-strength scan loads.
    pub fn rs_timeframes(&self) -> Vec<Timeframe> {
        if self.include_hourly {
            Timeframe::RS.to_vec()
        } else {
            vec![Timeframe::Weekly, Timeframe::Daily]
        }
    }
}
