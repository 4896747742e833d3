//! Universe configuration: sector-organized ticker lists.
//!
//! The universe is stored as a TOML config file: a benchmark symbol and a
//! table of sector ETFs with their member stocks. The sector lookup used to
//! annotate scan results is derived from it.

use crate::domain::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("universe has no sectors")]
    Empty,
}

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    #[serde(default = "default_benchmark")]
    pub benchmark: Symbol,
    /// Sector ETF → member stocks.
    pub sectors: BTreeMap<Symbol, Vec<Symbol>>,
}

fn default_benchmark() -> Symbol {
    "SPY".into()
}

impl Universe {
    /// Load a universe from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a universe from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Self = toml::from_str(content)?;
        if universe.sectors.is_empty() {
            return Err(UniverseError::Empty);
        }
        Ok(universe)
    }

    /// Serialize the universe to TOML.
    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Member stocks across all sectors, sorted and de-duplicated.
    pub fn stock_symbols(&self) -> Vec<Symbol> {
        let set: BTreeSet<&Symbol> = self.sectors.values().flatten().collect();
        set.into_iter().cloned().collect()
    }

    /// Sector ETF symbols.
    pub fn sector_etfs(&self) -> Vec<Symbol> {
        self.sectors.keys().cloned().collect()
    }

    /// Stocks, sector ETFs and the benchmark, sorted and de-duplicated.
    pub fn all_symbols(&self) -> Vec<Symbol> {
        let mut set: BTreeSet<Symbol> = self.stock_symbols().into_iter().collect();
        set.extend(self.sector_etfs());
        set.insert(self.benchmark.clone());
        set.into_iter().collect()
    }

    /// Member stocks of one sector ETF.
    pub fn sector_members(&self, sector: &str) -> Option<&[Symbol]> {
        self.sectors.get(sector).map(|v| v.as_slice())
    }

    pub fn ticker_count(&self) -> usize {
        self.stock_symbols().len()
    }

    /// Member stock → sector ETF lookup. The ETFs themselves are unmapped.
    pub fn sector_map(&self) -> SectorMap {
        let mut map = HashMap::new();
        for (sector, members) in &self.sectors {
            for symbol in members {
                map.insert(symbol.clone(), sector.clone());
            }
        }
        SectorMap { map }
    }

    /// US mega-cap universe (market cap above $200B) with SPDR sector ETFs.
    pub fn default_us() -> Self {
        let table: [(&str, &[&str]); 11] = [
            (
                "XLK",
                &[
                    "AAPL", "MSFT", "NVDA", "AVGO", "ORCL", "AMD", "CSCO", "CRM", "ACN", "ADBE",
                    "TXN", "QCOM", "INTC", "IBM", "INTU", "AMAT", "NOW", "SHOP", "PLTR",
                ],
            ),
            (
                "XLC",
                &["GOOGL", "META", "NFLX", "TMUS", "DIS", "CMCSA", "VZ", "T"],
            ),
            (
                "XLY",
                &["AMZN", "TSLA", "HD", "MCD", "TJX", "LOW", "BKNG", "NKE", "SBUX"],
            ),
            (
                "XLF",
                &[
                    "JPM", "BAC", "WFC", "GS", "MS", "BLK", "SPGI", "AXP", "C", "BX", "ICE", "CB",
                    "MCO", "CME", "AON", "MMC",
                ],
            ),
            (
                "XLV",
                &[
                    "LLY", "UNH", "JNJ", "MRK", "ABBV", "ABT", "TMO", "PFE", "AMGN", "DHR", "ISRG",
                    "MDT", "BMY", "GILD", "SYK", "VRTX", "BSX", "ELV", "REGN", "ZTS",
                ],
            ),
            ("XLE", &["XOM", "CVX", "COP", "EOG", "SLB", "PXD", "MPC"]),
            (
                "XLI",
                &[
                    "CAT", "GE", "RTX", "HON", "UNP", "BA", "DE", "LMT", "UPS", "ADP", "GD", "ITW",
                    "ETN", "WM", "EMR",
                ],
            ),
            (
                "XLP",
                &[
                    "PG", "COST", "KO", "PEP", "WMT", "PM", "MO", "MDLZ", "CL", "TGT", "STZ",
                ],
            ),
            ("XLU", &["NEE", "SO", "DUK", "CEG"]),
            ("XLRE", &["PLD", "AMT", "EQIX", "SPG"]),
            ("XLB", &["LIN", "APD", "SHW", "FCX", "NEM"]),
        ];

        let sectors = table
            .iter()
            .map(|(etf, members)| {
                (
                    etf.to_string(),
                    members.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();

        Self {
            benchmark: default_benchmark(),
            sectors,
        }
    }
}

/// Read-only symbol → sector identifier lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorMap {
    map: HashMap<Symbol, String>,
}

impl SectorMap {
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<Symbol>,
        T: Into<String>,
    {
        Self {
            map: pairs
                .into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        }
    }

    /// Sector of a symbol; `None` when unmapped.
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.map.get(symbol).map(|s| s.as_str())
    }

    /// Symbols from `symbols` with no sector mapping, in input order.
    pub fn unmapped<'a>(&self, symbols: &'a [Symbol]) -> Vec<&'a str> {
        symbols
            .iter()
            .filter(|s| !self.map.contains_key(s.as_str()))
            .map(|s| s.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_has_sectors() {
        let u = Universe::default_us();
        assert_eq!(u.sectors.len(), 11);
        assert!(u.sector_etfs().contains(&"XLK".to_string()));
        assert!(u.ticker_count() > 100);
        assert_eq!(u.benchmark, "SPY");
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::default_us();
        let toml_str = u.to_toml().unwrap();
        let parsed = Universe::from_toml(&toml_str).unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn benchmark_defaults_to_spy() {
        let u = Universe::from_toml("[sectors]\nXLK = [\"AAPL\"]\n").unwrap();
        assert_eq!(u.benchmark, "SPY");
        assert_eq!(u.all_symbols(), vec!["AAPL", "SPY", "XLK"]);
    }

    #[test]
    fn empty_universe_rejected() {
        assert!(matches!(
            Universe::from_toml("[sectors]\n"),
            Err(UniverseError::Empty)
        ));
    }

    #[test]
    fn sector_lookup() {
        let map = Universe::default_us().sector_map();
        assert_eq!(map.get("NVDA"), Some("XLK"));
        assert_eq!(map.get("XLE"), None);
        assert_eq!(map.get("ZZZZ"), None);
    }

    #[test]
    fn unmapped_symbols_reported() {
        let map = SectorMap::from_pairs([("AAPL", "XLK")]);
        let symbols = vec!["AAPL".to_string(), "NEW".to_string()];
        assert_eq!(map.unmapped(&symbols), vec!["NEW"]);
    }
}
