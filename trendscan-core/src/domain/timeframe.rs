//! Bar timeframes understood by the engines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar granularity. Ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "15m")]
    FifteenMinute,
    #[serde(rename = "5m")]
    FiveMinute,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::Weekly,
        Timeframe::Daily,
        Timeframe::Hourly,
        Timeframe::FifteenMinute,
        Timeframe::FiveMinute,
    ];

    /// Timeframes the relative-strength engine can consume.
    pub const RS: [Timeframe; 3] = [Timeframe::Weekly, Timeframe::Daily, Timeframe::Hourly];

    /// Intraday horizons blended by the spot engine.
    pub const INTRADAY: [Timeframe; 3] = [
        Timeframe::Hourly,
        Timeframe::FifteenMinute,
        Timeframe::FiveMinute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Weekly => "weekly",
            Timeframe::Daily => "daily",
            Timeframe::Hourly => "1h",
            Timeframe::FifteenMinute => "15m",
            Timeframe::FiveMinute => "5m",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" | "1w" | "week" => Ok(Timeframe::Weekly),
            "daily" | "1d" | "day" => Ok(Timeframe::Daily),
            "1h" | "hourly" | "hour" => Ok(Timeframe::Hourly),
            "15m" | "15min" => Ok(Timeframe::FifteenMinute),
            "5m" | "5min" => Ok(Timeframe::FiveMinute),
            other => Err(format!("unknown timeframe '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn aliases_parse() {
        assert_eq!("HOURLY".parse::<Timeframe>().unwrap(), Timeframe::Hourly);
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert!("2h".parse::<Timeframe>().is_err());
    }
}
