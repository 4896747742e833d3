//! Scan engines.
//!
//! - [`RsEngine`]: cross-sectional relative strength over weekly, daily and
//!   optional hourly bars, collected per symbol then normalized as a whole.
//! - [`SpotEngine`]: per-symbol intraday momentum over 1h/15m/5m bars.
//!
//! Both are stateless: every scan is a pure function of a [`BarSnapshot`].
//!
//! [`BarSnapshot`]: crate::domain::BarSnapshot

pub mod rs;
pub mod spot;

pub use rs::{BenchmarkSet, RawSymbolRow, RsEngine, ScanError};
pub use spot::{IntradayMetrics, SpotEngine, SpotRecord};
