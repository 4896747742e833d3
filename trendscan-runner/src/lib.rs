//! TrendScan Runner: bar loading, scan orchestration, result persistence.
//!
//! This crate builds on `trendscan-core` to provide:
//! - TOML scan configuration with model overrides
//! - Bar loading from `<timeframe>/<SYMBOL>.csv` with synthetic fallback
//! - Parallel relative-strength and spot scans
//! - CSV scan tables, watchlists and JSON manifests

pub mod config;
pub mod data_loader;
pub mod export;
pub mod scan;

pub use config::{ConfigError, ScanConfig};
pub use data_loader::{
    compute_dataset_hash, generate_synthetic_series, load_snapshot, read_series_csv,
    write_series_csv, DataSource, LoadError, LoadOptions, LoadedData,
};
pub use export::{CsvScanWriter, ExportError, ResultSink, ScanManifest, ScanMeta, ScanType};
pub use scan::{
    run_market_scan, run_rs_scan, run_spot_symbol, run_spot_universe, MarketScan,
    MarketScanOptions, RunError,
};
