//! Domain types for trendscan

pub mod bar;
pub mod series;
pub mod snapshot;
pub mod timeframe;

pub use bar::Bar;
pub use series::{BarError, BarSeries};
pub use snapshot::BarSnapshot;
pub use timeframe::Timeframe;

/// Symbol type alias
pub type Symbol = String;
