//! Timeframe scorer: blends one symbol's normalized indicators into a score.

use super::normalize::{NormalizedIndicators, RawIndicators};
use super::signed::Bias;
use crate::model::FactorWeights;
use serde::Serialize;

/// Normalized row for one symbol on one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeframeScore {
    pub raw: RawIndicators,
    pub z: NormalizedIndicators,
    pub score: f64,
    pub bias: Bias,
}

impl TimeframeScore {
    pub fn new(raw: RawIndicators, z: NormalizedIndicators, weights: &FactorWeights) -> Self {
        let score = blend(&z, weights);
        Self {
            raw,
            z,
            score,
            bias: Bias::of(Some(score)),
        }
    }
}

/// Weighted blend of the four z-scores. An undefined z-score contributes 0,
/// so one missing indicator never blanks the whole timeframe.
pub fn blend(z: &NormalizedIndicators, weights: &FactorWeights) -> f64 {
    weights.slope * z.slope.unwrap_or(0.0)
        + weights.relative_strength * z.relative_strength.unwrap_or(0.0)
        + weights.relative_volume * z.relative_volume.unwrap_or(0.0)
        + weights.inverse_volatility * z.inverse_volatility.unwrap_or(0.0)
}
