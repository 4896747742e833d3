//! Versioned scoring models.
//!
//! Every weight and lookback the engines use lives here, under a version
//! string that is stamped on persisted results. Changing a number means
//! changing (or overriding) a model, never editing an engine.
//!
//! Models deserialize from TOML with every field optional; missing fields
//! take the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance when checking that a weight set sums to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{set} weights sum to {sum}, expected 1.0")]
    WeightSum { set: &'static str, sum: f64 },

    #[error("{set} has a negative or non-finite weight")]
    InvalidWeight { set: &'static str },

    #[error("lookback '{field}' must be at least {min}")]
    Lookback { field: &'static str, min: usize },

    #[error("parse model TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

fn check_weights(set: &'static str, weights: &[f64]) -> Result<(), ModelError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ModelError::InvalidWeight { set });
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ModelError::WeightSum { set, sum });
    }
    Ok(())
}

fn check_lookback(field: &'static str, value: usize, min: usize) -> Result<(), ModelError> {
    if value < min {
        return Err(ModelError::Lookback { field, min });
    }
    Ok(())
}

// ── Relative-strength model ──────────────────────────────────────────

/// Blend of the four normalized indicators inside one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub slope: f64,
    pub relative_strength: f64,
    pub relative_volume: f64,
    /// Applied to the negated volatility ratio z-score.
    pub inverse_volatility: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            slope: 0.35,
            relative_strength: 0.35,
            relative_volume: 0.15,
            inverse_volatility: 0.15,
        }
    }
}

impl FactorWeights {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.slope,
            self.relative_strength,
            self.relative_volume,
            self.inverse_volatility,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Weights for the cross-timeframe composite when hourly data is included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreeTimeframeWeights {
    pub weekly: f64,
    pub daily: f64,
    pub hourly: f64,
}

impl Default for ThreeTimeframeWeights {
    fn default() -> Self {
        Self {
            weekly: 0.40,
            daily: 0.35,
            hourly: 0.25,
        }
    }
}

impl ThreeTimeframeWeights {
    pub fn sum(&self) -> f64 {
        self.weekly + self.daily + self.hourly
    }
}

/// Weights for the cross-timeframe composite without hourly data.
///
/// Chosen independently of [`ThreeTimeframeWeights`]; it is not a
/// renormalization of the weekly/daily part of that set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoTimeframeWeights {
    pub weekly: f64,
    pub daily: f64,
}

impl Default for TwoTimeframeWeights {
    fn default() -> Self {
        Self {
            weekly: 0.55,
            daily: 0.45,
        }
    }
}

impl TwoTimeframeWeights {
    pub fn sum(&self) -> f64 {
        self.weekly + self.daily
    }
}

/// Lookbacks (in bars) for the four raw indicators of one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorLookbacks {
    pub slope: usize,
    pub relative_strength: usize,
    pub relative_volume: usize,
    pub volatility: usize,
}

impl IndicatorLookbacks {
    pub const fn uniform(n: usize) -> Self {
        Self {
            slope: n,
            relative_strength: n,
            relative_volume: n,
            volatility: n,
        }
    }

    /// Largest lookback of the set: the history a series needs for every indicator.
    pub fn max(&self) -> usize {
        self.slope
            .max(self.relative_strength)
            .max(self.relative_volume)
            .max(self.volatility)
    }

    fn validate(&self) -> Result<(), ModelError> {
        check_lookback("slope", self.slope, 2)?;
        check_lookback("relative_strength", self.relative_strength, 1)?;
        check_lookback("relative_volume", self.relative_volume, 1)?;
        check_lookback("volatility", self.volatility, 2)
    }
}

/// Cross-sectional relative-strength model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsModel {
    pub version: String,
    pub factors: FactorWeights,
    pub with_hourly: ThreeTimeframeWeights,
    pub without_hourly: TwoTimeframeWeights,
    pub weekly: IndicatorLookbacks,
    pub daily: IndicatorLookbacks,
    pub hourly: IndicatorLookbacks,
}

impl Default for RsModel {
    fn default() -> Self {
        Self {
            version: "v1.3_zscore_3tf".into(),
            factors: FactorWeights::default(),
            with_hourly: ThreeTimeframeWeights::default(),
            without_hourly: TwoTimeframeWeights::default(),
            weekly: IndicatorLookbacks::uniform(4),
            daily: IndicatorLookbacks {
                slope: 5,
                relative_strength: 10,
                relative_volume: 10,
                volatility: 10,
            },
            hourly: IndicatorLookbacks {
                slope: 10,
                relative_strength: 20,
                relative_volume: 20,
                volatility: 20,
            },
        }
    }
}

impl RsModel {
    pub fn from_toml(content: &str) -> Result<Self, ModelError> {
        let model: Self = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_weights("factor", &self.factors.as_array())?;
        let h = &self.with_hourly;
        check_weights("three-timeframe", &[h.weekly, h.daily, h.hourly])?;
        let d = &self.without_hourly;
        check_weights("two-timeframe", &[d.weekly, d.daily])?;
        self.weekly.validate()?;
        self.daily.validate()?;
        self.hourly.validate()
    }
}

// ── Spot model ───────────────────────────────────────────────────────

/// One intraday horizon: its lookback and base weight in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntradayHorizon {
    pub lookback: usize,
    pub weight: f64,
}

/// Intraday spot-momentum model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotModel {
    pub version: String,
    pub one_hour: IntradayHorizon,
    pub fifteen_minute: IntradayHorizon,
    pub five_minute: IntradayHorizon,
    pub atr_period: usize,
    pub levels_lookback: usize,
    /// Daily bars averaged for `rvol_daily`.
    pub daily_volume_lookback: usize,
    /// Five-minute bars that must exist before `rvol_daily` is reported.
    pub min_five_minute_bars: usize,
}

impl Default for SpotModel {
    fn default() -> Self {
        Self {
            version: "spot_v1".into(),
            one_hour: IntradayHorizon {
                lookback: 10,
                weight: 0.50,
            },
            fifteen_minute: IntradayHorizon {
                lookback: 16,
                weight: 0.30,
            },
            five_minute: IntradayHorizon {
                lookback: 12,
                weight: 0.20,
            },
            atr_period: 14,
            levels_lookback: 20,
            daily_volume_lookback: 20,
            min_five_minute_bars: 12,
        }
    }
}

impl SpotModel {
    pub fn from_toml(content: &str) -> Result<Self, ModelError> {
        let model: Self = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_weights(
            "intraday",
            &[
                self.one_hour.weight,
                self.fifteen_minute.weight,
                self.five_minute.weight,
            ],
        )?;
        check_lookback("one_hour.lookback", self.one_hour.lookback, 1)?;
        check_lookback("fifteen_minute.lookback", self.fifteen_minute.lookback, 1)?;
        check_lookback("five_minute.lookback", self.five_minute.lookback, 1)?;
        check_lookback("atr_period", self.atr_period, 1)?;
        check_lookback("levels_lookback", self.levels_lookback, 1)?;
        check_lookback("daily_volume_lookback", self.daily_volume_lookback, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_sets_sum_to_one() {
        let rs = RsModel::default();
        assert!((rs.factors.sum() - 1.0).abs() < 1e-12);
        assert!((rs.with_hourly.sum() - 1.0).abs() < 1e-12);
        assert!((rs.without_hourly.sum() - 1.0).abs() < 1e-12);
        rs.validate().unwrap();
        SpotModel::default().validate().unwrap();
    }

    #[test]
    fn two_factor_set_is_not_a_renormalization() {
        let rs = RsModel::default();
        let h = rs.with_hourly;
        let renormalized = h.weekly / (h.weekly + h.daily);
        assert!((rs.without_hourly.weekly - renormalized).abs() > 1e-3);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RsModel::from_toml("").unwrap(), RsModel::default());
        assert_eq!(SpotModel::from_toml("").unwrap(), SpotModel::default());
    }

    #[test]
    fn partial_override() {
        let model = RsModel::from_toml(
            r#"
version = "experimental"

[without_hourly]
weekly = 0.5
daily = 0.5
"#,
        )
        .unwrap();
        assert_eq!(model.version, "experimental");
        assert_eq!(model.without_hourly.weekly, 0.5);
        assert_eq!(model.with_hourly, ThreeTimeframeWeights::default());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = RsModel::from_toml("[factors]\nslope = 0.9\n").unwrap_err();
        assert!(matches!(err, ModelError::WeightSum { set: "factor", .. }));
    }

    #[test]
    fn rejects_zero_lookback() {
        let mut model = SpotModel::default();
        model.atr_period = 0;
        assert!(matches!(
            model.validate(),
            Err(ModelError::Lookback {
                field: "atr_period",
                ..
            })
        ));
    }

    #[test]
    fn hourly_history_requirement() {
        assert_eq!(RsModel::default().hourly.max(), 20);
        assert_eq!(RsModel::default().weekly.max(), 4);
    }
}
