//! Weighted signed composite with unanimous-alignment check.
//!
//! Shared by the cross-timeframe RS composite and the intraday spot
//! composite. Components with an undefined value drop out of the weighted
//! mean and the remaining weights are rescaled to sum to one. For
//! alignment an undefined component counts as neutral.

use serde::{Deserialize, Serialize};

/// Directional classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Bias {
    Bearish,
    Neutral,
    Bullish,
}

impl Bias {
    /// Sign of a value; undefined and exact zero are neutral.
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => Bias::Bullish,
            Some(v) if v < 0.0 => Bias::Bearish,
            _ => Bias::Neutral,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Bias::Bearish => -1,
            Bias::Neutral => 0,
            Bias::Bullish => 1,
        }
    }

    pub fn is_directional(self) -> bool {
        self != Bias::Neutral
    }
}

impl From<Bias> for i8 {
    fn from(bias: Bias) -> Self {
        bias.as_i8()
    }
}

impl TryFrom<i8> for Bias {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Bias::Bearish),
            0 => Ok(Bias::Neutral),
            1 => Ok(Bias::Bullish),
            other => Err(format!("bias must be -1, 0 or 1, got {other}")),
        }
    }
}

/// One weighted input to a composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub value: Option<f64>,
    pub weight: f64,
}

impl Component {
    pub fn new(value: Option<f64>, weight: f64) -> Self {
        Self { value, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedComposite {
    /// Weighted mean over defined components; `None` if none are defined.
    pub value: Option<f64>,
    pub bias: Bias,
    /// Every component's own sign agrees and none is neutral.
    pub aligned: bool,
    /// Components that carried a defined value.
    pub contributing: usize,
}

/// True iff there is at least one bias, all are equal, and none is neutral.
pub fn unanimous<I>(biases: I) -> bool
where
    I: IntoIterator<Item = Bias>,
{
    let mut iter = biases.into_iter();
    let Some(first) = iter.next() else {
        return false;
    };
    first.is_directional() && iter.all(|b| b == first)
}

pub fn signed_composite(components: &[Component]) -> SignedComposite {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut contributing = 0;
    for c in components {
        if let Some(v) = c.value {
            weighted += v * c.weight;
            total_weight += c.weight;
            contributing += 1;
        }
    }

    let value = if total_weight > 0.0 {
        Some(weighted / total_weight)
    } else {
        None
    };

    SignedComposite {
        value,
        bias: Bias::of(value),
        aligned: unanimous(components.iter().map(|c| Bias::of(c.value))),
        contributing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biases(signs: &[i8]) -> Vec<Bias> {
        signs.iter().map(|s| Bias::try_from(*s).unwrap()).collect()
    }

    #[test]
    fn alignment_truth_table() {
        assert!(unanimous(biases(&[1, 1, 1])));
        assert!(unanimous(biases(&[-1, -1])));
        assert!(!unanimous(biases(&[1, 0, 1])));
        assert!(!unanimous(biases(&[1, -1, 1])));
        assert!(!unanimous(biases(&[0, 0])));
        assert!(!unanimous(Vec::new()));
    }

    #[test]
    fn full_weights_give_plain_weighted_sum() {
        let c = signed_composite(&[
            Component::new(Some(1.0), 0.55),
            Component::new(Some(-1.0), 0.45),
        ]);
        assert!((c.value.unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(c.bias, Bias::Bullish);
        assert!(!c.aligned);
        assert_eq!(c.contributing, 2);
    }

    #[test]
    fn missing_component_rescales_weights() {
        let c = signed_composite(&[
            Component::new(Some(0.02), 0.50),
            Component::new(None, 0.30),
            Component::new(Some(0.01), 0.20),
        ]);
        let expected = 0.02 * (0.50 / 0.70) + 0.01 * (0.20 / 0.70);
        assert!((c.value.unwrap() - expected).abs() < 1e-15);
        // undefined component is neutral for alignment
        assert!(!c.aligned);
        assert_eq!(c.contributing, 2);
    }

    #[test]
    fn nothing_defined() {
        let c = signed_composite(&[Component::new(None, 1.0)]);
        assert_eq!(c.value, None);
        assert_eq!(c.bias, Bias::Neutral);
        assert!(!c.aligned);

        let empty = signed_composite(&[]);
        assert_eq!(empty.value, None);
        assert!(!empty.aligned);
    }

    #[test]
    fn bias_of_zero_is_neutral() {
        assert_eq!(Bias::of(Some(0.0)), Bias::Neutral);
        assert_eq!(Bias::of(None), Bias::Neutral);
        assert_eq!(Bias::of(Some(-1e-300)), Bias::Bearish);
    }

    #[test]
    fn bias_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Bias::Bearish).unwrap(), "-1");
        let b: Bias = serde_json::from_str("1").unwrap();
        assert_eq!(b, Bias::Bullish);
        assert!(serde_json::from_str::<Bias>("2").is_err());
    }
}
