//! Bar: the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one period of some timeframe.
///
/// The timestamp marks the start of the period. Volume is kept as `f64`
/// because weekly and intraday aggregates from some vendors are fractional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Name of the first non-finite field, if any.
    pub(crate) fn first_void_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }

    /// Why the bar's fields contradict each other, if they do.
    pub(crate) fn inconsistency(&self) -> Option<&'static str> {
        if self.high < self.low {
            Some("high below low")
        } else if self.volume < 0.0 {
            Some("negative volume")
        } else {
            None
        }
    }
}
