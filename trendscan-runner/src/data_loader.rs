//! Bar loading for the runner.
//!
//! Bars live in a CSV directory, one file per symbol and timeframe:
//! `<data_dir>/<timeframe>/<SYMBOL>.csv` with header
//! `timestamp,open,high,low,close,volume`. Fallback policy per file:
//! 1. If the file exists → parse and validate it
//! 2. If not and `synthetic` → generate a synthetic series (tagged)
//! 3. Otherwise → leave it out of the snapshot (the engines decide whether
//!    that is fatal)
//!
//! Synthetic data is a developer-only debug mode. Results produced on
//! synthetic data are tagged in the load result.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use trendscan_core::domain::{Bar, BarError, BarSeries, BarSnapshot, Symbol, Timeframe};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory {0} does not exist (use --synthetic for synthetic data)")]
    MissingDataDir(String),

    #[error("read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} row {row}: unrecognized timestamp '{value}'")]
    Timestamp {
        path: String,
        row: usize,
        value: String,
    },

    #[error("{path}: {source}")]
    Bars { path: String, source: BarError },
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Timeframes to load.
    pub timeframes: Vec<Timeframe>,
    /// If true, generate synthetic bars when a file is missing.
    pub synthetic: bool,
    /// Length of each synthetic series.
    pub synthetic_bars: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeframes: Timeframe::ALL.to_vec(),
            synthetic: false,
            synthetic_bars: 260,
        }
    }
}

/// Result of loading bars, including data source provenance.
#[derive(Debug)]
pub struct LoadedData {
    pub snapshot: BarSnapshot,
    /// Data source per (timeframe, symbol).
    pub sources: BTreeMap<(Timeframe, Symbol), DataSource>,
    /// Files that existed but failed validation, with the reason.
    pub rejected: Vec<(Timeframe, Symbol, String)>,
    /// Dataset hash for scan metadata (BLAKE3 over all bar data).
    pub dataset_hash: String,
    /// Whether any series is synthetic.
    pub has_synthetic: bool,
}

/// Path of one series inside the bar directory.
pub fn series_path(data_dir: &Path, timeframe: Timeframe, symbol: &str) -> PathBuf {
    data_dir.join(timeframe.as_str()).join(format!("{symbol}.csv"))
}

/// Load every (timeframe, symbol) series into a snapshot.
///
/// A file that exists but does not parse or violates the series invariants
/// is skipped with a warning and listed in [`LoadedData::rejected`].
pub fn load_snapshot(
    data_dir: &Path,
    symbols: &[Symbol],
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    if !data_dir.is_dir() && !opts.synthetic {
        return Err(LoadError::MissingDataDir(data_dir.display().to_string()));
    }

    let mut snapshot = BarSnapshot::new();
    let mut sources = BTreeMap::new();
    let mut rejected = Vec::new();
    let mut has_synthetic = false;

    for &timeframe in &opts.timeframes {
        for symbol in symbols {
            let path = series_path(data_dir, timeframe, symbol);

            // Step 1: CSV file
            if path.is_file() {
                match read_series_csv(&path) {
                    Ok(series) => {
                        snapshot.insert(timeframe, symbol.clone(), series);
                        sources.insert((timeframe, symbol.clone()), DataSource::Csv);
                    }
                    Err(e) => {
                        warn!(symbol = %symbol, timeframe = %timeframe, error = %e, "rejecting bar file");
                        rejected.push((timeframe, symbol.clone(), e.to_string()));
                    }
                }
                continue;
            }

            // Step 2: Synthetic fallback (if enabled)
            if opts.synthetic {
                warn!(symbol = %symbol, timeframe = %timeframe, "generating synthetic data");
                let series = generate_synthetic_series(symbol, timeframe, opts.synthetic_bars);
                snapshot.insert(timeframe, symbol.clone(), series);
                sources.insert((timeframe, symbol.clone()), DataSource::Synthetic);
                has_synthetic = true;
                continue;
            }

            // Step 3: Absent
            debug!(symbol = %symbol, timeframe = %timeframe, "no bar file");
        }
    }

    let dataset_hash = compute_dataset_hash(&snapshot);
    info!(
        series = snapshot.series_count(),
        rejected = rejected.len(),
        synthetic = has_synthetic,
        "loaded bar snapshot"
    );

    Ok(LoadedData {
        snapshot,
        sources,
        rejected,
        dataset_hash,
        has_synthetic,
    })
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Parse a timestamp in any of the accepted layouts.
///
/// Offset-carrying timestamps keep their local wall-clock time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Read one series. Blank numeric fields become NaN and are then rejected
/// by [`BarSeries::new`].
pub fn read_series_csv(path: &Path) -> Result<BarSeries, LoadError> {
    let display = || path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Csv {
        path: display(),
        source,
    })?;

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<CsvBar>().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: display(),
            source,
        })?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            path: display(),
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        bars.push(Bar {
            timestamp,
            open: record.open.unwrap_or(f64::NAN),
            high: record.high.unwrap_or(f64::NAN),
            low: record.low.unwrap_or(f64::NAN),
            close: record.close.unwrap_or(f64::NAN),
            volume: record.volume.unwrap_or(f64::NAN),
        });
    }

    BarSeries::new(bars).map_err(|source| LoadError::Bars {
        path: display(),
        source,
    })
}

/// Write one series, creating parent directories.
pub fn write_series_csv(path: &Path, series: &BarSeries) -> Result<(), LoadError> {
    let display = || path.display().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LoadError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|source| LoadError::Csv {
        path: display(),
        source,
    })?;
    for bar in series.bars() {
        writer
            .serialize(CsvBar {
                timestamp: bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                open: Some(bar.open),
                high: Some(bar.high),
                low: Some(bar.low),
                close: Some(bar.close),
                volume: Some(bar.volume),
            })
            .map_err(|source| LoadError::Csv {
                path: display(),
                source,
            })?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: display(),
        source,
    })
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// The hash covers timeframe, symbol, timestamps and all OHLCV values in the
/// snapshot's sorted order.
pub fn compute_dataset_hash(snapshot: &BarSnapshot) -> String {
    let mut hasher = blake3::Hasher::new();

    for (timeframe, symbol, series) in snapshot.iter() {
        hasher.update(timeframe.as_str().as_bytes());
        hasher.update(symbol.as_bytes());
        for bar in series.bars() {
            hasher.update(bar.timestamp.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}

fn bar_step(timeframe: Timeframe) -> chrono::Duration {
    match timeframe {
        Timeframe::Weekly => chrono::Duration::weeks(1),
        Timeframe::Daily => chrono::Duration::days(1),
        Timeframe::Hourly => chrono::Duration::hours(1),
        Timeframe::FifteenMinute => chrono::Duration::minutes(15),
        Timeframe::FiveMinute => chrono::Duration::minutes(5),
    }
}

/// Generate a synthetic series for testing/development.
///
/// A random walk from 100.0 seeded by the symbol and timeframe, so reruns are
/// identical. These are clearly fake and tagged as synthetic.
pub fn generate_synthetic_series(symbol: &str, timeframe: Timeframe, bars: usize) -> BarSeries {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed_bytes = blake3::hash(format!("{symbol}/{timeframe}").as_bytes());
    let seed: [u8; 32] = *seed_bytes.as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let step = bar_step(timeframe);
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap_or_default();

    let mut price = 100.0_f64;
    let mut out = Vec::with_capacity(bars);
    for i in 0..bars {
        let ret: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;
        out.push(Bar {
            timestamp: start + step * i as i32,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    // Timestamps strictly increase and every field is finite.
    BarSeries::new(out).unwrap_or_default()
}
