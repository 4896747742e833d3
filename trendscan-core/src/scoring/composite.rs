//! Composite aggregator: weights per-timeframe scores into one ranking value.

use super::signed::{signed_composite, Component};
use super::timeframe::TimeframeScore;
use crate::domain::Symbol;
use crate::model::RsModel;
use serde::Serialize;

/// Final per-symbol result of a relative-strength scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeRecord {
    pub symbol: Symbol,
    pub sector: Option<String>,
    pub weekly: TimeframeScore,
    pub daily: TimeframeScore,
    /// Absent when the symbol had no usable hourly data.
    pub hourly: Option<TimeframeScore>,
    pub composite_score: f64,
    pub aligned: bool,
}

/// Composite score and alignment flag for one symbol.
///
/// The weight set is picked by whether hourly data is present; the two sets
/// are configured independently in [`RsModel`].
pub fn aggregate(
    weekly: &TimeframeScore,
    daily: &TimeframeScore,
    hourly: Option<&TimeframeScore>,
    model: &RsModel,
) -> (f64, bool) {
    let components = match hourly {
        Some(h) => vec![
            Component::new(Some(weekly.score), model.with_hourly.weekly),
            Component::new(Some(daily.score), model.with_hourly.daily),
            Component::new(Some(h.score), model.with_hourly.hourly),
        ],
        None => vec![
            Component::new(Some(weekly.score), model.without_hourly.weekly),
            Component::new(Some(daily.score), model.without_hourly.daily),
        ],
    };
    let composite = signed_composite(&components);
    (composite.value.unwrap_or(0.0), composite.aligned)
}

/// Sort descending by composite score. Stable: ties keep their input order.
pub fn rank(records: &mut [CompositeRecord]) {
    records.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
}
