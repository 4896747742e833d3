//! Range consumed: how many ATRs price has travelled up from the period low.
//!
//! `(close - low) / atr` on the most recent bar of the period's timeframe
//! (a daily bar for "today", a weekly bar for "this week").

use super::finite;
use crate::domain::Bar;

pub fn range_consumed(period_bar: Option<&Bar>, atr: Option<f64>) -> Option<f64> {
    let atr = atr.filter(|a| *a != 0.0)?;
    let bar = period_bar?;
    finite((bar.close - bar.low) / atr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn measures_distance_from_low_in_atrs() {
        let bars = make_bars(&[100.0, 104.0]);
        let last = bars.last().unwrap(); // low = 99, close = 104
        assert_approx(range_consumed(Some(last), Some(2.5)).unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn undefined_or_zero_atr() {
        let bars = make_bars(&[100.0]);
        assert!(range_consumed(bars.last(), None).is_none());
        assert!(range_consumed(bars.last(), Some(0.0)).is_none());
    }

    #[test]
    fn missing_bar() {
        assert!(range_consumed(None, Some(1.0)).is_none());
    }
}
