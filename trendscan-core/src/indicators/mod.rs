//! Indicator library.
//!
//! Every indicator is a pure function over the trailing window of a series
//! and returns `Option<f64>`: `None` means the value is undefined (too little
//! history, a zero denominator, or a non-positive price under a log). Callers
//! never see an error from this module.

pub mod atr;
pub mod levels;
pub mod range_consumed;
pub mod relative_strength;
pub mod relative_volume;
pub mod slope;
pub mod volatility;

pub use atr::{atr, true_range};
pub use levels::{levels, Levels};
pub use range_consumed::range_consumed;
pub use relative_strength::{log_return, relative_strength};
pub use relative_volume::relative_volume;
pub use slope::slope;
pub use volatility::{realized_volatility, volatility_ratio};

/// `Some(x)` if `x` is finite.
pub(crate) fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// Natural log of a price; undefined for non-positive or non-finite input.
pub(crate) fn ln_price(price: f64) -> Option<f64> {
    if price > 0.0 && price.is_finite() {
        Some(price.ln())
    } else {
        None
    }
}

/// Relative floor below which a spread is rounding noise.
const SPREAD_TOLERANCE: f64 = 1e-12;

/// True if `spread` (a standard deviation) is indistinguishable from zero for
/// values of magnitude `scale`.
pub(crate) fn is_negligible_spread(spread: f64, scale: f64) -> bool {
    spread <= SPREAD_TOLERANCE * scale.abs().max(1.0)
}

/// Trailing `n` values of a slice, or `None` if the slice is shorter.
pub(crate) fn trailing(values: &[f64], n: usize) -> Option<&[f64]> {
    values.len().checked_sub(n).map(|start| &values[start..])
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
