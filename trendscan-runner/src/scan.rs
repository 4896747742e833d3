//! Scan orchestration.
//!
//! The relative-strength scan is fork-join: phase 1 (raw indicators per
//! symbol) runs on rayon workers when `parallel` is set, and phase 2
//! (normalize, score, rank) starts only after every worker has returned.
//! Sequential and parallel runs produce identical output.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};
use trendscan_core::data::{SectorMap, Universe};
use trendscan_core::domain::{BarSnapshot, Symbol};
use trendscan_core::engine::{RawSymbolRow, RsEngine, ScanError, SpotEngine, SpotRecord};
use trendscan_core::scoring::CompositeRecord;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("unknown sector '{0}'")]
    UnknownSector(String),

    #[error("no data for symbol '{0}'")]
    NoData(Symbol),
}

/// Relative-strength scan of `members` with an explicit fork-join barrier.
pub fn run_rs_scan(
    engine: &RsEngine,
    snapshot: &BarSnapshot,
    members: &[Symbol],
    sectors: &SectorMap,
    parallel: bool,
) -> Result<Vec<CompositeRecord>, ScanError> {
    if !parallel {
        return engine.scan(snapshot, members, sectors);
    }
    let bench = engine.benchmark_set(snapshot)?;

    // Phase 1: collect (rayon's collect keeps input order)
    let rows: Vec<RawSymbolRow> = members
        .par_iter()
        .filter_map(|s| engine.collect_raw(s, snapshot, &bench))
        .collect();

    // Phase 2: every raw row is in hand
    debug!(members = members.len(), rows = rows.len(), "parallel collection done");
    Ok(engine.score(rows, sectors))
}

/// Options for [`run_market_scan`].
#[derive(Debug, Clone, Default)]
pub struct MarketScanOptions {
    pub parallel: bool,
    /// Keep only stocks of this sector ETF in the stock ranking. The
    /// cross-section is still the whole stock universe.
    pub sector: Option<String>,
}

/// Sector-ETF ranking and stock ranking from one snapshot.
#[derive(Debug, Clone)]
pub struct MarketScan {
    pub sectors: Vec<CompositeRecord>,
    pub stocks: Vec<CompositeRecord>,
}

/// Two relative-strength scans over the universe: one across the sector
/// ETFs, one across the member stocks.
pub fn run_market_scan(
    engine: &RsEngine,
    snapshot: &BarSnapshot,
    universe: &Universe,
    opts: &MarketScanOptions,
) -> Result<MarketScan, RunError> {
    let sector_filter = match &opts.sector {
        Some(sector) => {
            let sector = sector.to_uppercase();
            if universe.sector_members(&sector).is_none() {
                return Err(RunError::UnknownSector(sector));
            }
            Some(sector)
        }
        None => None,
    };

    let sectors = universe.sector_map();
    let symbols = universe.stock_symbols();
    for symbol in sectors.unmapped(&symbols) {
        warn!(symbol, "no sector mapping");
    }

    let sector_rank = run_rs_scan(engine, snapshot, &universe.sector_etfs(), &sectors, opts.parallel)?;
    let mut stock_rank = run_rs_scan(engine, snapshot, &symbols, &sectors, opts.parallel)?;

    if let Some(sector) = sector_filter {
        stock_rank.retain(|r| r.sector.as_deref() == Some(sector.as_str()));
    }

    Ok(MarketScan {
        sectors: sector_rank,
        stocks: stock_rank,
    })
}

/// Spot scan over `members`, sorted descending by intraday composite.
pub fn run_spot_universe(
    engine: &SpotEngine,
    snapshot: &BarSnapshot,
    members: &[Symbol],
    sectors: &SectorMap,
    parallel: bool,
) -> Vec<SpotRecord> {
    if !parallel {
        return engine.scan_universe(snapshot, members, sectors);
    }

    let records: Vec<SpotRecord> = members
        .par_iter()
        .filter_map(|s| engine.scan_member(s, snapshot, sectors))
        .collect();
    engine.rank(records)
}

/// Spot detail for one symbol.
pub fn run_spot_symbol(
    engine: &SpotEngine,
    snapshot: &BarSnapshot,
    symbol: &str,
    sectors: &SectorMap,
) -> Result<SpotRecord, RunError> {
    let symbol = symbol.to_uppercase();
    engine
        .scan_symbol(&symbol, snapshot, sectors)
        .ok_or(RunError::NoData(symbol))
}
