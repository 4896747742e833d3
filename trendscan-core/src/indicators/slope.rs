//! Log-linear trend slope.
//!
//! Ordinary least squares of ln(close) on bar index over the trailing window.
//! The result is the average per-bar log growth along the fitted line.

use super::{finite, ln_price, trailing};

pub fn slope(closes: &[f64], lookback: usize) -> Option<f64> {
    if lookback < 2 {
        return None;
    }
    let window = trailing(closes, lookback)?;
    let ys: Vec<f64> = window
        .iter()
        .map(|&c| ln_price(c))
        .collect::<Option<Vec<_>>>()?;

    let n = lookback as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    finite(sxy / sxx)
}
