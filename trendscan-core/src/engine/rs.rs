//! Cross-sectional relative-strength engine.
//!
//! Two phases with a barrier between them:
//! 1. collect: raw indicators for every symbol, independently
//!    ([`RsEngine::collect_raw`], safe to fan out across threads);
//! 2. score: z-score each column across the gathered universe, blend per
//!    timeframe, aggregate and rank ([`RsEngine::score`]).
//!
//! No z-score is meaningful until phase 1 has finished for every symbol.

use crate::data::SectorMap;
use crate::domain::{BarSeries, BarSnapshot, Symbol, Timeframe};
use crate::model::RsModel;
use crate::scoring::{
    aggregate, normalize_cross_section, rank, CompositeRecord, NormalizedIndicators,
    RawIndicators, TimeframeScore,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Fatal scan preconditions.
#[derive(Debug, Error, PartialEq)]
pub enum ScanError {
    #[error("benchmark {benchmark} missing from {timeframe} data")]
    MissingBenchmark {
        benchmark: Symbol,
        timeframe: Timeframe,
    },
}

/// Benchmark series for one scan. Weekly and daily are required; hourly is
/// optional and, when absent, no symbol gets hourly scores.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkSet<'a> {
    pub weekly: &'a BarSeries,
    pub daily: &'a BarSeries,
    pub hourly: Option<&'a BarSeries>,
}

/// Phase-1 output for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSymbolRow {
    pub symbol: Symbol,
    pub weekly: RawIndicators,
    pub daily: RawIndicators,
    pub hourly: Option<RawIndicators>,
}

#[derive(Debug, Clone)]
pub struct RsEngine {
    model: RsModel,
    benchmark: Symbol,
}

impl RsEngine {
    pub fn new(model: RsModel, benchmark: impl Into<Symbol>) -> Self {
        Self {
            model,
            benchmark: benchmark.into(),
        }
    }

    pub fn model(&self) -> &RsModel {
        &self.model
    }

    /// Resolve the benchmark series, failing if a required timeframe lacks it.
    pub fn benchmark_set<'a>(&self, snapshot: &'a BarSnapshot) -> Result<BenchmarkSet<'a>, ScanError> {
        let require = |timeframe: Timeframe| {
            snapshot
                .series(timeframe, &self.benchmark)
                .ok_or_else(|| ScanError::MissingBenchmark {
                    benchmark: self.benchmark.clone(),
                    timeframe,
                })
        };
        Ok(BenchmarkSet {
            weekly: require(Timeframe::Weekly)?,
            daily: require(Timeframe::Daily)?,
            hourly: snapshot.series(Timeframe::Hourly, &self.benchmark),
        })
    }

    /// Default scan members: every non-benchmark symbol with daily or weekly data.
    pub fn members(&self, snapshot: &BarSnapshot) -> Vec<Symbol> {
        snapshot.members(&[Timeframe::Daily, Timeframe::Weekly], &self.benchmark)
    }

    /// Phase 1 for one symbol. Returns `None` for the benchmark itself, and
    /// (with a warning) when the symbol lacks daily or weekly data.
    pub fn collect_raw(
        &self,
        symbol: &str,
        snapshot: &BarSnapshot,
        bench: &BenchmarkSet<'_>,
    ) -> Option<RawSymbolRow> {
        if symbol == self.benchmark {
            return None;
        }
        let Some(weekly) = snapshot.series(Timeframe::Weekly, symbol) else {
            warn!(symbol, timeframe = %Timeframe::Weekly, "no data, skipping");
            return None;
        };
        let Some(daily) = snapshot.series(Timeframe::Daily, symbol) else {
            warn!(symbol, timeframe = %Timeframe::Daily, "no data, skipping");
            return None;
        };

        let hourly = bench.hourly.and_then(|bench_hourly| {
            let series = snapshot.series(Timeframe::Hourly, symbol)?;
            if series.len() < self.model.hourly.max() {
                debug!(symbol, bars = series.len(), "insufficient hourly history, two-factor composite");
                return None;
            }
            Some(RawIndicators::compute(series, bench_hourly, &self.model.hourly))
        });

        Some(RawSymbolRow {
            symbol: symbol.to_string(),
            weekly: RawIndicators::compute(weekly, bench.weekly, &self.model.weekly),
            daily: RawIndicators::compute(daily, bench.daily, &self.model.daily),
            hourly,
        })
    }

    /// Phase 2: normalize every column across the gathered rows, score, rank.
    pub fn score(&self, rows: Vec<RawSymbolRow>, sectors: &SectorMap) -> Vec<CompositeRecord> {
        let weights = &self.model.factors;

        let weekly_raw: Vec<RawIndicators> = rows.iter().map(|r| r.weekly).collect();
        let daily_raw: Vec<RawIndicators> = rows.iter().map(|r| r.daily).collect();
        let weekly_z = normalize_cross_section(&weekly_raw);
        let daily_z = normalize_cross_section(&daily_raw);

        // Hourly cross-section holds only the symbols that have hourly rows.
        let hourly_raw: Vec<RawIndicators> = rows.iter().filter_map(|r| r.hourly).collect();
        let mut hourly_z = normalize_cross_section(&hourly_raw).into_iter();

        let mut records: Vec<CompositeRecord> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let weekly = TimeframeScore::new(row.weekly, weekly_z[i], weights);
                let daily = TimeframeScore::new(row.daily, daily_z[i], weights);
                let hourly = row.hourly.map(|raw| {
                    let z = hourly_z.next().unwrap_or_else(NormalizedIndicators::default);
                    TimeframeScore::new(raw, z, weights)
                });
                let (composite_score, aligned) =
                    aggregate(&weekly, &daily, hourly.as_ref(), &self.model);
                CompositeRecord {
                    sector: sectors.get(&row.symbol).map(String::from),
                    symbol: row.symbol,
                    weekly,
                    daily,
                    hourly,
                    composite_score,
                    aligned,
                }
            })
            .collect();

        rank(&mut records);
        info!(
            scored = records.len(),
            model = %self.model.version,
            "relative-strength scan"
        );
        records
    }

    /// Sequential scan of `members`: collect every raw row, then score.
    pub fn scan(
        &self,
        snapshot: &BarSnapshot,
        members: &[Symbol],
        sectors: &SectorMap,
    ) -> Result<Vec<CompositeRecord>, ScanError> {
        let bench = self.benchmark_set(snapshot)?;
        let rows: Vec<RawSymbolRow> = members
            .iter()
            .filter_map(|s| self.collect_raw(s, snapshot, &bench))
            .collect();
        Ok(self.score(rows, sectors))
    }
}
