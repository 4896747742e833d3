//! Time-ordered bar series for one symbol on one timeframe.

use super::bar::Bar;
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Series invariant violations.
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar {index} at {current} precedes previous bar at {previous}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("bar {index} has non-numeric {field}")]
    NonNumeric { index: usize, field: &'static str },

    #[error("bar {index}: {reason}")]
    Inconsistent { index: usize, reason: &'static str },
}

/// Ordered OHLCV sequence. Timestamps are non-decreasing, every field is
/// finite, `high >= low` and volume is non-negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap a bar vector.
    pub fn new(bars: Vec<Bar>) -> Result<Self, BarError> {
        for (index, bar) in bars.iter().enumerate() {
            if let Some(field) = bar.first_void_field() {
                return Err(BarError::NonNumeric { index, field });
            }
            if let Some(reason) = bar.inconsistency() {
                return Err(BarError::Inconsistent { index, reason });
            }
            if index > 0 && bar.timestamp < bars[index - 1].timestamp {
                return Err(BarError::OutOfOrder {
                    index,
                    previous: bars[index - 1].timestamp,
                    current: bar.timestamp,
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}
