//! TrendScan Core: domain types, indicators, scoring and the scan engines.
//!
//! This crate contains the scoring logic of the scanner:
//! - Domain types (bars, validated series, per-timeframe snapshots)
//! - Indicator library returning `Option<f64>` for undefined values
//! - Versioned model configuration for both engines
//! - Cross-section normalizer, timeframe scorer and composite aggregator
//! - Relative-strength engine (two-phase) and intraday spot engine
//!
//! Everything here is pure and synchronous. Loading bars and writing results
//! belong to `trendscan-runner`.

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod model;
pub mod scoring;

pub use data::{SectorMap, Universe};
pub use domain::{Bar, BarSeries, BarSnapshot, Symbol, Timeframe};
pub use engine::{RsEngine, ScanError, SpotEngine, SpotRecord};
pub use model::{RsModel, SpotModel};
pub use scoring::CompositeRecord;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types are Send + Sync.
    ///
    /// The runner shares a snapshot and both engines across rayon workers;
    /// if any type fails this check, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSeries>();
        require_sync::<domain::BarSeries>();
        require_send::<domain::BarSnapshot>();
        require_sync::<domain::BarSnapshot>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();

        // Model and lookup
        require_send::<model::RsModel>();
        require_sync::<model::RsModel>();
        require_send::<model::SpotModel>();
        require_sync::<model::SpotModel>();
        require_send::<data::SectorMap>();
        require_sync::<data::SectorMap>();
        require_send::<data::Universe>();
        require_sync::<data::Universe>();

        // Engines and records
        require_send::<engine::RsEngine>();
        require_sync::<engine::RsEngine>();
        require_send::<engine::SpotEngine>();
        require_sync::<engine::SpotEngine>();
        require_send::<engine::RawSymbolRow>();
        require_sync::<engine::RawSymbolRow>();
        require_send::<scoring::CompositeRecord>();
        require_sync::<scoring::CompositeRecord>();
        require_send::<engine::SpotRecord>();
        require_sync::<engine::SpotRecord>();
        require_send::<engine::ScanError>();
        require_sync::<engine::ScanError>();
    }

    #[test]
    fn default_models_validate() {
        assert!(RsModel::default().validate().is_ok());
        assert!(SpotModel::default().validate().is_ok());
    }
}
