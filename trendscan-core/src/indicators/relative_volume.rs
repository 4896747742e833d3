//! Relative volume: last bar's volume over the trailing mean (last bar included).
//! Values above 1 mean above-average participation.

use super::{finite, trailing};

pub fn relative_volume(volumes: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 {
        return None;
    }
    let window = trailing(volumes, lookback)?;
    let mean = window.iter().sum::<f64>() / lookback as f64;
    if mean == 0.0 {
        return None;
    }
    finite(*window.last()? / mean)
}
