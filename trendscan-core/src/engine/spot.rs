//! Intraday spot-momentum engine.
//!
//! No cross-sectional normalization: raw signed relative strength on the
//! 1h, 15m and 5m horizons is blended directly, alongside ATR, range
//! consumed and level distances from the daily and weekly bars.

use crate::data::SectorMap;
use crate::domain::{BarSeries, BarSnapshot, Symbol, Timeframe};
use crate::indicators::{atr, levels, range_consumed, relative_strength, relative_volume, Levels};
use crate::model::{IntradayHorizon, SpotModel};
use crate::scoring::{signed_composite, Bias, Component};
use serde::Serialize;
use tracing::{info, warn};

/// Raw metrics for one intraday horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IntradayMetrics {
    pub rs: Option<f64>,
    pub rvol: Option<f64>,
    pub atr: Option<f64>,
}

impl IntradayMetrics {
    fn compute(stock: &BarSeries, bench: &BarSeries, lookback: usize, atr_period: usize) -> Self {
        Self {
            rs: relative_strength(&stock.closes(), &bench.closes(), lookback),
            rvol: relative_volume(&stock.volumes(), lookback),
            atr: atr(stock.bars(), atr_period),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotRecord {
    pub symbol: Symbol,
    pub sector: Option<String>,
    pub price: Option<f64>,

    pub atr_weekly: Option<f64>,
    pub atr_daily: Option<f64>,
    pub atr_hourly: Option<f64>,

    pub daily_range_consumed: Option<f64>,
    pub weekly_range_consumed: Option<f64>,

    /// `None` when the symbol or the benchmark has no bars on the horizon.
    pub one_hour: Option<IntradayMetrics>,
    pub fifteen_minute: Option<IntradayMetrics>,
    pub five_minute: Option<IntradayMetrics>,

    pub rvol_daily: Option<f64>,

    pub intraday_composite: Option<f64>,
    pub intraday_bias: Bias,
    pub intraday_aligned: bool,

    pub levels: Levels,
}

impl SpotRecord {
    /// Metrics for one intraday timeframe, if it is one of the three horizons.
    pub fn horizon(&self, timeframe: Timeframe) -> Option<&IntradayMetrics> {
        match timeframe {
            Timeframe::Hourly => self.one_hour.as_ref(),
            Timeframe::FifteenMinute => self.fifteen_minute.as_ref(),
            Timeframe::FiveMinute => self.five_minute.as_ref(),
            Timeframe::Weekly | Timeframe::Daily => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotEngine {
    model: SpotModel,
    benchmark: Symbol,
}

impl SpotEngine {
    pub fn new(model: SpotModel, benchmark: impl Into<Symbol>) -> Self {
        Self {
            model,
            benchmark: benchmark.into(),
        }
    }

    pub fn model(&self) -> &SpotModel {
        &self.model
    }

    fn horizon(&self, timeframe: Timeframe) -> Option<&IntradayHorizon> {
        match timeframe {
            Timeframe::Hourly => Some(&self.model.one_hour),
            Timeframe::FifteenMinute => Some(&self.model.fifteen_minute),
            Timeframe::FiveMinute => Some(&self.model.five_minute),
            Timeframe::Weekly | Timeframe::Daily => None,
        }
    }

    /// Metrics for one horizon; `None` unless both stock and benchmark have bars.
    fn intraday(&self, snapshot: &BarSnapshot, symbol: &str, timeframe: Timeframe) -> Option<IntradayMetrics> {
        let horizon = self.horizon(timeframe)?;
        let stock = snapshot.series(timeframe, symbol)?;
        let bench = snapshot.series(timeframe, &self.benchmark)?;
        Some(IntradayMetrics::compute(
            stock,
            bench,
            horizon.lookback,
            self.model.atr_period,
        ))
    }

    /// Spot scan for one symbol. Returns `None` (with a warning) when the
    /// symbol or the benchmark has no daily bars.
    pub fn scan_symbol(&self, symbol: &str, snapshot: &BarSnapshot, sectors: &SectorMap) -> Option<SpotRecord> {
        let Some(daily) = snapshot.series(Timeframe::Daily, symbol) else {
            warn!(symbol, "no daily data, skipping spot scan");
            return None;
        };
        if snapshot.series(Timeframe::Daily, &self.benchmark).is_none() {
            warn!(symbol, benchmark = %self.benchmark, "benchmark has no daily data, skipping spot scan");
            return None;
        }
        let weekly = snapshot.series(Timeframe::Weekly, symbol);
        let hourly = snapshot.series(Timeframe::Hourly, symbol);
        let period = self.model.atr_period;

        let atr_daily = atr(daily.bars(), period);
        let atr_weekly = weekly.and_then(|s| atr(s.bars(), period));
        let atr_hourly = hourly.and_then(|s| atr(s.bars(), period));

        let daily_range_consumed = range_consumed(daily.last(), atr_daily);
        let weekly_range_consumed = weekly.and_then(|s| range_consumed(s.last(), atr_weekly));

        let levels = levels(daily.bars(), self.model.levels_lookback);

        let one_hour = self.intraday(snapshot, symbol, Timeframe::Hourly);
        let fifteen_minute = self.intraday(snapshot, symbol, Timeframe::FifteenMinute);
        let five_minute = self.intraday(snapshot, symbol, Timeframe::FiveMinute);

        // A horizon present with undefined RS drops out of the mean but still
        // counts as neutral for alignment.
        let components: Vec<Component> = [
            (one_hour, self.model.one_hour.weight),
            (fifteen_minute, self.model.fifteen_minute.weight),
            (five_minute, self.model.five_minute.weight),
        ]
        .into_iter()
        .filter_map(|(metrics, weight)| metrics.map(|m| Component::new(m.rs, weight)))
        .collect();
        let composite = signed_composite(&components);

        let five_minute_bars = snapshot
            .series(Timeframe::FiveMinute, symbol)
            .map_or(0, BarSeries::len);
        let rvol_daily = if five_minute_bars >= self.model.min_five_minute_bars {
            relative_volume(&daily.volumes(), self.model.daily_volume_lookback)
        } else {
            None
        };

        Some(SpotRecord {
            symbol: symbol.to_string(),
            sector: sectors.get(symbol).map(String::from),
            price: levels.price,
            atr_weekly,
            atr_daily,
            atr_hourly,
            daily_range_consumed,
            weekly_range_consumed,
            one_hour,
            fifteen_minute,
            five_minute,
            rvol_daily,
            intraday_composite: composite.value,
            intraday_bias: composite.bias,
            intraday_aligned: composite.aligned,
            levels,
        })
    }

    /// Default spot members: every non-benchmark symbol with daily bars.
    pub fn members(&self, snapshot: &BarSnapshot) -> Vec<Symbol> {
        snapshot.members(&[Timeframe::Daily], &self.benchmark)
    }

    /// Spot record for one scan member; `None` for the benchmark itself.
    pub fn scan_member(&self, symbol: &str, snapshot: &BarSnapshot, sectors: &SectorMap) -> Option<SpotRecord> {
        if symbol == self.benchmark {
            return None;
        }
        self.scan_symbol(symbol, snapshot, sectors)
    }

    /// Order records descending by intraday composite. Records without a
    /// composite go last; ties keep input order.
    pub fn rank(&self, mut records: Vec<SpotRecord>) -> Vec<SpotRecord> {
        records.sort_by(|a, b| match (a.intraday_composite, b.intraday_composite) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        info!(scored = records.len(), model = %self.model.version, "spot scan");
        records
    }

    /// Spot scan over `members`, sorted descending by intraday composite.
    pub fn scan_universe(&self, snapshot: &BarSnapshot, members: &[Symbol], sectors: &SectorMap) -> Vec<SpotRecord> {
        let records = members
            .iter()
            .filter_map(|s| self.scan_member(s, snapshot, sectors))
            .collect();
        self.rank(records)
    }
}
