//! Persistence of scan results as CSV tables plus a JSON manifest.
//!
//! Directory layout under the output root:
//!
//! ```text
//! scans/
//!   stocks/  stock_<YYYYmmdd_HHMMSS>_<scan_id>.csv
//!   sectors/ sector_<YYYYmmdd_HHMMSS>_<scan_id>.csv
//!   spot/    spot_<YYYYmmdd_HHMMSS>_<scan_id>.csv
//! watchlists/
//!   strong_<YYYYmmdd_HHMMSS>_<scan_id>.csv
//!   weak_<YYYYmmdd_HHMMSS>_<scan_id>.csv
//! ```
//!
//! Every row carries the scan metadata columns. Undefined values are
//! written as blank fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use trendscan_core::engine::{IntradayMetrics, SpotRecord};
use trendscan_core::scoring::{Bias, CompositeRecord, TimeframeScore};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("write CSV {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Stock,
    Sector,
    Spot,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::Stock => "stock",
            ScanType::Sector => "sector",
            ScanType::Spot => "spot",
        }
    }

    fn dir_name(&self) -> &'static str {
        match self {
            ScanType::Stock => "stocks",
            ScanType::Sector => "sectors",
            ScanType::Spot => "spot",
        }
    }
}

/// Metadata stamped on every row of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMeta {
    /// 8 hex characters, unique per scan.
    pub scan_id: String,
    /// `YYYYmmdd`
    pub scan_date: String,
    /// `YYYYmmdd_HHMMSS`
    pub scan_timestamp: String,
    pub scan_type: ScanType,
    pub model_version: String,
    pub dataset_hash: String,
}

impl ScanMeta {
    pub fn new(scan_type: ScanType, model_version: &str, dataset_hash: &str, now: NaiveDateTime) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(dataset_hash.as_bytes());
        hasher.update(scan_type.as_str().as_bytes());
        hasher.update(now.to_string().as_bytes());
        let scan_id = hasher.finalize().to_hex()[..8].to_string();

        Self {
            scan_id,
            scan_date: now.format("%Y%m%d").to_string(),
            scan_timestamp: now.format("%Y%m%d_%H%M%S").to_string(),
            scan_type,
            model_version: model_version.to_string(),
            dataset_hash: dataset_hash.to_string(),
        }
    }

    fn file_stem(&self, prefix: &str) -> String {
        format!("{prefix}_{}_{}", self.scan_timestamp, self.scan_id)
    }

    fn columns(&self) -> [String; 6] {
        [
            self.scan_id.clone(),
            self.scan_date.clone(),
            self.scan_timestamp.clone(),
            self.scan_type.as_str().to_string(),
            self.model_version.clone(),
            self.dataset_hash.clone(),
        ]
    }
}

const META_HEADER: [&str; 6] = [
    "scan_id",
    "scan_date",
    "scan_timestamp",
    "scan_type",
    "model_version",
    "dataset_hash",
];

/// Summary written beside each scan table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanManifest {
    pub meta: ScanMeta,
    pub rows: usize,
    pub has_synthetic: bool,
    pub files: Vec<PathBuf>,
}

/// Destination for finished scans. The engines never read anything back.
pub trait ResultSink {
    fn write_rs_scan(&self, meta: &ScanMeta, records: &[CompositeRecord]) -> Result<PathBuf, ExportError>;

    fn write_spot_scan(&self, meta: &ScanMeta, records: &[SpotRecord]) -> Result<PathBuf, ExportError>;

    /// Top `n` (strong) and bottom `n` (weak) of a ranked stock scan.
    fn write_watchlists(
        &self,
        meta: &ScanMeta,
        records: &[CompositeRecord],
        n: usize,
    ) -> Result<(PathBuf, PathBuf), ExportError>;

    fn write_manifest(&self, manifest: &ScanManifest) -> Result<PathBuf, ExportError>;
}

/// Writes scans as CSV files under one output root.
#[derive(Debug, Clone)]
pub struct CsvScanWriter {
    root: PathBuf,
}

impl CsvScanWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan_dir(&self, scan_type: ScanType) -> PathBuf {
        self.root.join("scans").join(scan_type.dir_name())
    }

    fn watchlist_dir(&self) -> PathBuf {
        self.root.join("watchlists")
    }
}

// ─── Formatting ─────────────────────────────────────────────────────

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn fmt_bias(bias: Option<Bias>) -> String {
    bias.map(|b| b.as_i8().to_string()).unwrap_or_default()
}

const TIMEFRAME_COLUMNS: [&str; 10] = [
    "slope",
    "rs",
    "rvol",
    "vol_ratio",
    "z_slope",
    "z_rs",
    "z_rvol",
    "z_inv_vol",
    "score",
    "bias",
];

fn timeframe_values(score: Option<&TimeframeScore>) -> Vec<String> {
    let Some(s) = score else {
        return vec![String::new(); TIMEFRAME_COLUMNS.len()];
    };
    vec![
        fmt_opt(s.raw.slope),
        fmt_opt(s.raw.relative_strength),
        fmt_opt(s.raw.relative_volume),
        fmt_opt(s.raw.volatility_ratio),
        fmt_opt(s.z.slope),
        fmt_opt(s.z.relative_strength),
        fmt_opt(s.z.relative_volume),
        fmt_opt(s.z.inverse_volatility),
        format!("{:.6}", s.score),
        s.bias.as_i8().to_string(),
    ]
}

fn intraday_values(metrics: Option<&IntradayMetrics>) -> [String; 3] {
    [
        fmt_opt(metrics.and_then(|m| m.rs)),
        fmt_opt(metrics.and_then(|m| m.rvol)),
        fmt_opt(metrics.and_then(|m| m.atr)),
    ]
}

/// Table of header plus rows, rendered to a CSV file.
fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), ExportError> {
    let display = || path.display().to_string();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let csv_err = |source| ExportError::Csv {
        path: display(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    wtr.write_record(header).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(row).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: display(),
        source,
    })
}

// ─── Row builders ───────────────────────────────────────────────────

fn rs_header() -> Vec<String> {
    let mut header: Vec<String> = ["rank", "symbol", "sector", "composite_score", "aligned"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for tf in ["weekly", "daily", "hourly"] {
        header.extend(TIMEFRAME_COLUMNS.iter().map(|c| format!("{tf}_{c}")));
    }
    header.extend(META_HEADER.iter().map(|s| s.to_string()));
    header
}

fn rs_row(meta: &ScanMeta, rank: usize, r: &CompositeRecord) -> Vec<String> {
    let mut row = vec![
        rank.to_string(),
        r.symbol.clone(),
        r.sector.clone().unwrap_or_default(),
        format!("{:.6}", r.composite_score),
        r.aligned.to_string(),
    ];
    row.extend(timeframe_values(Some(&r.weekly)));
    row.extend(timeframe_values(Some(&r.daily)));
    row.extend(timeframe_values(r.hourly.as_ref()));
    row.extend(meta.columns());
    row
}

const SPOT_COLUMNS: [&str; 30] = [
    "rank",
    "symbol",
    "sector",
    "price",
    "weekly_atr",
    "daily_atr",
    "hourly_atr",
    "daily_range_consumed",
    "weekly_range_consumed",
    "1h_rs",
    "1h_rvol",
    "1h_atr",
    "15m_rs",
    "15m_rvol",
    "15m_atr",
    "5m_rs",
    "5m_rvol",
    "5m_atr",
    "rvol_daily",
    "intraday_composite",
    "intraday_bias",
    "intraday_aligned",
    "daily_high",
    "daily_low",
    "pct_from_daily_high",
    "pct_from_daily_low",
    "high_20d",
    "low_20d",
    "pct_from_20d_high",
    "pct_from_20d_low",
];

fn spot_header() -> Vec<String> {
    SPOT_COLUMNS
        .iter()
        .chain(META_HEADER.iter())
        .map(|s| s.to_string())
        .collect()
}

fn spot_row(meta: &ScanMeta, rank: usize, r: &SpotRecord) -> Vec<String> {
    let mut row = vec![
        rank.to_string(),
        r.symbol.clone(),
        r.sector.clone().unwrap_or_default(),
        fmt_opt(r.price),
        fmt_opt(r.atr_weekly),
        fmt_opt(r.atr_daily),
        fmt_opt(r.atr_hourly),
        fmt_opt(r.daily_range_consumed),
        fmt_opt(r.weekly_range_consumed),
    ];
    row.extend(intraday_values(r.one_hour.as_ref()));
    row.extend(intraday_values(r.fifteen_minute.as_ref()));
    row.extend(intraday_values(r.five_minute.as_ref()));
    let l = &r.levels;
    row.extend([
        fmt_opt(r.rvol_daily),
        fmt_opt(r.intraday_composite),
        fmt_bias(Some(r.intraday_bias)),
        r.intraday_aligned.to_string(),
        fmt_opt(l.daily_high),
        fmt_opt(l.daily_low),
        fmt_opt(l.pct_from_daily_high),
        fmt_opt(l.pct_from_daily_low),
        fmt_opt(l.high_20d),
        fmt_opt(l.low_20d),
        fmt_opt(l.pct_from_20d_high),
        fmt_opt(l.pct_from_20d_low),
    ]);
    row.extend(meta.columns());
    row
}

fn watchlist_header() -> Vec<String> {
    [
        "rank",
        "symbol",
        "sector",
        "composite_score",
        "aligned",
        "weekly_bias",
        "daily_bias",
        "hourly_bias",
    ]
    .iter()
    .chain(META_HEADER.iter())
    .map(|s| s.to_string())
    .collect()
}

fn watchlist_row(meta: &ScanMeta, rank: usize, r: &CompositeRecord) -> Vec<String> {
    let mut row = vec![
        rank.to_string(),
        r.symbol.clone(),
        r.sector.clone().unwrap_or_default(),
        format!("{:.6}", r.composite_score),
        r.aligned.to_string(),
        fmt_bias(Some(r.weekly.bias)),
        fmt_bias(Some(r.daily.bias)),
        fmt_bias(r.hourly.as_ref().map(|h| h.bias)),
    ];
    row.extend(meta.columns());
    row
}

impl ResultSink for CsvScanWriter {
    fn write_rs_scan(&self, meta: &ScanMeta, records: &[CompositeRecord]) -> Result<PathBuf, ExportError> {
        let path = self
            .scan_dir(meta.scan_type)
            .join(format!("{}.csv", meta.file_stem(meta.scan_type.as_str())));
        let rows: Vec<Vec<String>> = records
            .iter()
            .enumerate()
            .map(|(i, r)| rs_row(meta, i + 1, r))
            .collect();
        write_table(&path, &rs_header(), &rows)?;
        info!(path = %path.display(), rows = rows.len(), "wrote {} scan", meta.scan_type.as_str());
        Ok(path)
    }

    fn write_spot_scan(&self, meta: &ScanMeta, records: &[SpotRecord]) -> Result<PathBuf, ExportError> {
        let path = self
            .scan_dir(ScanType::Spot)
            .join(format!("{}.csv", meta.file_stem(ScanType::Spot.as_str())));
        let rows: Vec<Vec<String>> = records
            .iter()
            .enumerate()
            .map(|(i, r)| spot_row(meta, i + 1, r))
            .collect();
        write_table(&path, &spot_header(), &rows)?;
        info!(path = %path.display(), rows = rows.len(), "wrote spot scan");
        Ok(path)
    }

    fn write_watchlists(
        &self,
        meta: &ScanMeta,
        records: &[CompositeRecord],
        n: usize,
    ) -> Result<(PathBuf, PathBuf), ExportError> {
        let dir = self.watchlist_dir();
        let strong_path = dir.join(format!("{}.csv", meta.file_stem("strong")));
        let weak_path = dir.join(format!("{}.csv", meta.file_stem("weak")));

        let take = n.min(records.len());
        let strong: Vec<Vec<String>> = records[..take]
            .iter()
            .enumerate()
            .map(|(i, r)| watchlist_row(meta, i + 1, r))
            .collect();
        let weak_start = records.len() - take;
        let weak: Vec<Vec<String>> = records[weak_start..]
            .iter()
            .enumerate()
            .map(|(i, r)| watchlist_row(meta, weak_start + i + 1, r))
            .collect();

        write_table(&strong_path, &watchlist_header(), &strong)?;
        write_table(&weak_path, &watchlist_header(), &weak)?;
        info!(strong = %strong_path.display(), weak = %weak_path.display(), n = take, "wrote watchlists");
        Ok((strong_path, weak_path))
    }

    fn write_manifest(&self, manifest: &ScanManifest) -> Result<PathBuf, ExportError> {
        let meta = &manifest.meta;
        let path = self
            .scan_dir(meta.scan_type)
            .join(format!("{}.json", meta.file_stem(meta.scan_type.as_str())));
        let json = serde_json::to_string_pretty(manifest)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(&path, json).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "wrote manifest");
        Ok(path)
    }
}
