//! Reference data consulted by the engines.

pub mod universe;

pub use universe::{SectorMap, Universe, UniverseError};
