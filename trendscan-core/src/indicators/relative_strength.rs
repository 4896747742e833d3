//! Relative strength versus a benchmark.
//!
//! RS = log-return(stock) - log-return(benchmark) over the same window.
//! The window spans `lookback` bars: the base bar is `lookback - 1` positions
//! before the last bar, so a series of exactly `lookback` bars is enough.

use super::{finite, ln_price, trailing};

/// Log-return from the first to the last bar of the trailing window.
pub fn log_return(closes: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 {
        return None;
    }
    let window = trailing(closes, lookback)?;
    let base = ln_price(*window.first()?)?;
    let last = ln_price(*window.last()?)?;
    finite(last - base)
}

pub fn relative_strength(stock_closes: &[f64], bench_closes: &[f64], lookback: usize) -> Option<f64> {
    let stock = log_return(stock_closes, lookback)?;
    let bench = log_return(bench_closes, lookback)?;
    finite(stock - bench)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn outperformance_is_positive() {
        let stock = [100.0, 105.0, 110.0];
        let bench = [100.0, 101.0, 102.0];
        let rs = relative_strength(&stock, &bench, 3).unwrap();
        assert_approx(rs, (1.10_f64).ln() - (1.02_f64).ln(), DEFAULT_EPSILON);
        assert!(rs > 0.0);
    }

    #[test]
    fn window_uses_trailing_bars_only() {
        // lookback 2 compares the last two bars
        let stock = [50.0, 100.0, 110.0];
        let bench = [10.0, 100.0, 100.0];
        assert_approx(
            relative_strength(&stock, &bench, 2).unwrap(),
            (1.1_f64).ln(),
            DEFAULT_EPSILON,
        );
    }

    #[test]
    fn antisymmetric() {
        let a = [100.0, 97.0, 104.0, 108.0];
        let b = [50.0, 51.0, 49.5, 50.5];
        let ab = relative_strength(&a, &b, 4).unwrap();
        let ba = relative_strength(&b, &a, 4).unwrap();
        assert_eq!(ab, -ba);
    }

    #[test]
    fn identical_series_is_zero() {
        let a = [10.0, 12.0, 11.0];
        assert_eq!(relative_strength(&a, &a, 3), Some(0.0));
    }

    #[test]
    fn short_stock_or_benchmark_is_undefined() {
        let long = [1.0, 2.0, 3.0, 4.0];
        let short = [1.0, 2.0];
        assert!(relative_strength(&short, &long, 3).is_none());
        assert!(relative_strength(&long, &short, 3).is_none());
        assert!(relative_strength(&long, &long, 0).is_none());
    }

    #[test]
    fn zero_price_is_undefined() {
        assert!(log_return(&[0.0, 1.0], 2).is_none());
    }
}
