//! Realized volatility and the stock/benchmark volatility ratio.
//!
//! Volatility is the sample standard deviation (n - 1) of the trailing
//! `lookback` one-bar log-returns, which needs `lookback + 1` closes.
//! A spread at rounding-noise level (constant growth) counts as exactly 0.
//! A ratio below 1 means the stock is calmer than the benchmark.

use super::{finite, is_negligible_spread, ln_price, trailing};

pub fn realized_volatility(closes: &[f64], lookback: usize) -> Option<f64> {
    if lookback < 2 {
        return None;
    }
    let window = trailing(closes, lookback + 1)?;
    let logs: Vec<f64> = window
        .iter()
        .map(|&c| ln_price(c))
        .collect::<Option<Vec<_>>>()?;
    let returns: Vec<f64> = logs.windows(2).map(|w| w[1] - w[0]).collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = finite(var.sqrt())?;
    let scale = logs.iter().fold(0.0_f64, |acc, l| acc.max(l.abs()));
    if is_negligible_spread(std, scale) {
        return Some(0.0);
    }
    Some(std)
}

pub fn volatility_ratio(stock_closes: &[f64], bench_closes: &[f64], lookback: usize) -> Option<f64> {
    let bench = realized_volatility(bench_closes, lookback)?;
    if bench == 0.0 {
        return None;
    }
    let stock = realized_volatility(stock_closes, lookback)?;
    finite(stock / bench)
}
