//! Point-in-time snapshot of bar series for a whole universe.
//!
//! The snapshot is built once by the ingestion collaborator and then only
//! read during a scan, so it can be shared freely across worker threads.

use super::series::BarSeries;
use super::timeframe::Timeframe;
use super::Symbol;
use std::collections::{BTreeMap, BTreeSet};

/// Bar series keyed by timeframe, then symbol.
#[derive(Debug, Clone, Default)]
pub struct BarSnapshot {
    series: BTreeMap<Timeframe, BTreeMap<Symbol, BarSeries>>,
}

impl BarSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the series for one symbol and timeframe.
    pub fn insert(&mut self, timeframe: Timeframe, symbol: impl Into<Symbol>, series: BarSeries) {
        self.series
            .entry(timeframe)
            .or_default()
            .insert(symbol.into(), series);
    }

    pub fn series(&self, timeframe: Timeframe, symbol: &str) -> Option<&BarSeries> {
        self.series.get(&timeframe).and_then(|m| m.get(symbol))
    }

    /// Symbols with data in one timeframe, in sorted order.
    pub fn symbols(&self, timeframe: Timeframe) -> impl Iterator<Item = &str> {
        self.series
            .get(&timeframe)
            .into_iter()
            .flat_map(|m| m.keys().map(|s| s.as_str()))
    }

    /// Sorted union of symbols across the given timeframes, minus `exclude`.
    pub fn members(&self, timeframes: &[Timeframe], exclude: &str) -> Vec<Symbol> {
        let set: BTreeSet<&str> = timeframes
            .iter()
            .flat_map(|tf| self.symbols(*tf))
            .filter(|s| *s != exclude)
            .collect();
        set.into_iter().map(String::from).collect()
    }

    /// Iterate every (timeframe, symbol, series) triple in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (Timeframe, &str, &BarSeries)> {
        self.series.iter().flat_map(|(tf, m)| {
            m.iter()
                .map(move |(sym, series)| (*tf, sym.as_str(), series))
        })
    }

    /// Number of (symbol, timeframe) series held.
    pub fn series_count(&self) -> usize {
        self.series.values().map(|m| m.len()).sum()
    }
}
