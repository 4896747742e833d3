//! Cross-section normalizer.
//!
//! Z-scores one raw indicator column across every symbol of the current
//! snapshot for one timeframe. Needs the whole column, so it only runs after
//! every symbol's raw row has been gathered.

use crate::domain::BarSeries;
use crate::model::IndicatorLookbacks;
use crate::indicators::{
    is_negligible_spread, relative_strength, relative_volume, slope, volatility_ratio,
};
use serde::Serialize;

/// Raw indicator values for one symbol on one timeframe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawIndicators {
    pub slope: Option<f64>,
    pub relative_strength: Option<f64>,
    pub relative_volume: Option<f64>,
    pub volatility_ratio: Option<f64>,
}

impl RawIndicators {
    pub fn compute(stock: &BarSeries, bench: &BarSeries, lookbacks: &IndicatorLookbacks) -> Self {
        let stock_closes = stock.closes();
        let bench_closes = bench.closes();
        Self {
            slope: slope(&stock_closes, lookbacks.slope),
            relative_strength: relative_strength(
                &stock_closes,
                &bench_closes,
                lookbacks.relative_strength,
            ),
            relative_volume: relative_volume(&stock.volumes(), lookbacks.relative_volume),
            volatility_ratio: volatility_ratio(&stock_closes, &bench_closes, lookbacks.volatility),
        }
    }
}

/// Z-scored indicators for one symbol on one timeframe.
///
/// `inverse_volatility` is the z-score of the *negated* volatility ratio, so
/// a stock calmer than the benchmark scores positively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NormalizedIndicators {
    pub slope: Option<f64>,
    pub relative_strength: Option<f64>,
    pub relative_volume: Option<f64>,
    pub inverse_volatility: Option<f64>,
}

/// Z-score a column: `(x - mean) / std` over the defined values, using the
/// population standard deviation.
///
/// If the column is degenerate (no defined values, all defined values equal,
/// or a standard deviation at rounding-noise level) every entry, including
/// undefined ones, becomes exactly 0. Otherwise undefined entries stay
/// undefined.
pub fn zscore(column: &[Option<f64>]) -> Vec<Option<f64>> {
    let defined: Vec<f64> = column.iter().flatten().copied().collect();
    let degenerate = vec![Some(0.0); column.len()];
    if defined.is_empty() {
        return degenerate;
    }

    let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
    let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return degenerate;
    }

    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    let var = defined.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if !std.is_finite() || is_negligible_spread(std, min.abs().max(max.abs())) {
        return degenerate;
    }

    column.iter().map(|x| x.map(|v| (v - mean) / std)).collect()
}

/// Normalize a full cross-section of raw rows, column by column.
pub fn normalize_cross_section(rows: &[RawIndicators]) -> Vec<NormalizedIndicators> {
    let column = |f: fn(&RawIndicators) -> Option<f64>| -> Vec<Option<f64>> {
        zscore(&rows.iter().map(f).collect::<Vec<_>>())
    };

    let z_slope = column(|r| r.slope);
    let z_rs = column(|r| r.relative_strength);
    let z_rvol = column(|r| r.relative_volume);
    let z_vol = column(|r| r.volatility_ratio.map(|v| -v));

    (0..rows.len())
        .map(|i| NormalizedIndicators {
            slope: z_slope[i],
            relative_strength: z_rs[i],
            relative_volume: z_rvol[i],
            inverse_volatility: z_vol[i],
        })
        .collect()
}
