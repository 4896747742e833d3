//! Cross-sectional scoring: normalizer, timeframe scorer, composite aggregator,
//! and the signed-composite utility shared with the spot engine.

pub mod composite;
pub mod normalize;
pub mod signed;
pub mod timeframe;

pub use composite::{aggregate, rank, CompositeRecord};
pub use normalize::{normalize_cross_section, zscore, NormalizedIndicators, RawIndicators};
pub use signed::{signed_composite, unanimous, Bias, Component, SignedComposite};
pub use timeframe::{blend, TimeframeScore};
