//! Key price levels and the percent distance of the current price from each.

use super::finite;
use crate::domain::Bar;
use serde::Serialize;

/// Price levels from daily bars. Every field is undefined for an empty series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Levels {
    pub price: Option<f64>,
    pub daily_high: Option<f64>,
    pub daily_low: Option<f64>,
    pub high_20d: Option<f64>,
    pub low_20d: Option<f64>,
    pub pct_from_daily_high: Option<f64>,
    pub pct_from_daily_low: Option<f64>,
    pub pct_from_20d_high: Option<f64>,
    pub pct_from_20d_low: Option<f64>,
}

/// `(price - level) / price * 100`
fn pct_from(price: f64, level: f64) -> Option<f64> {
    if price == 0.0 {
        return None;
    }
    finite((price - level) / price * 100.0)
}

/// Compute levels from daily bars. The rolling window shrinks to whatever
/// history exists when fewer than `lookback` bars are available.
pub fn levels(daily_bars: &[Bar], lookback: usize) -> Levels {
    let Some(last) = daily_bars.last() else {
        return Levels::default();
    };

    let start = daily_bars.len().saturating_sub(lookback.max(1));
    let recent = &daily_bars[start..];
    let high_20d = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low_20d = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    let price = last.close;
    Levels {
        price: finite(price),
        daily_high: finite(last.high),
        daily_low: finite(last.low),
        high_20d: finite(high_20d),
        low_20d: finite(low_20d),
        pct_from_daily_high: pct_from(price, last.high),
        pct_from_daily_low: pct_from(price, last.low),
        pct_from_20d_high: pct_from(price, high_20d),
        pct_from_20d_low: pct_from(price, low_20d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn empty_series_is_all_undefined() {
        assert_eq!(levels(&[], 20), Levels::default());
    }

    #[test]
    fn distances_from_levels() {
        // closes 100..=120; last bar: open 119, close 120, high 121, low 118
        let closes: Vec<f64> = (100..=120).map(f64::from).collect();
        let bars = make_bars(&closes);
        let lv = levels(&bars, 20);

        assert_eq!(lv.price, Some(120.0));
        assert_eq!(lv.daily_high, Some(121.0));
        assert_eq!(lv.daily_low, Some(118.0));
        // window = last 20 bars (closes 101..=120) → low of bar with close 101 = 99
        assert_eq!(lv.high_20d, Some(121.0));
        assert_eq!(lv.low_20d, Some(99.0));
        assert_approx(lv.pct_from_daily_high.unwrap(), -1.0 / 120.0 * 100.0, DEFAULT_EPSILON);
        assert_approx(lv.pct_from_daily_low.unwrap(), 2.0 / 120.0 * 100.0, DEFAULT_EPSILON);
        assert_approx(lv.pct_from_20d_low.unwrap(), 21.0 / 120.0 * 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn short_history_uses_all_bars() {
        let bars = make_bars(&[10.0, 12.0, 11.0]);
        let lv = levels(&bars, 20);
        assert_eq!(lv.high_20d, Some(13.0));
        assert_eq!(lv.low_20d, Some(9.0));
    }
}
