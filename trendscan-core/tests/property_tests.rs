//! Property tests for indicator and scoring invariants.
//!
//! Uses proptest to verify:
//! 1. Relative strength is antisymmetric in its two series
//! 2. ATR of a constant true range equals that range
//! 3. A cross-section of identical values z-scores to exactly 0
//! 4. Too-short history is undefined, never a panic
//! 5. Scan output is sorted descending by composite score
//! 6. Alignment holds iff every bias is equal and directional

use chrono::NaiveDate;
use proptest::prelude::*;
use trendscan_core::data::SectorMap;
use trendscan_core::domain::{Bar, BarSeries, BarSnapshot, Timeframe};
use trendscan_core::engine::RsEngine;
use trendscan_core::indicators::{atr, relative_strength, relative_volume, slope, volatility_ratio};
use trendscan_core::model::{RsModel, WEIGHT_SUM_TOLERANCE};
use trendscan_core::scoring::{
    normalize_cross_section, signed_composite, unanimous, zscore, Bias, Component, RawIndicators,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_price(), min..max)
}

fn arb_bias() -> impl Strategy<Value = Bias> {
    prop_oneof![Just(Bias::Bearish), Just(Bias::Neutral), Just(Bias::Bullish)]
}

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open: c,
            high: c * 1.01,
            low: c * 0.99,
            close: c,
            volume: 10_000.0 + (i % 7) as f64 * 500.0,
        })
        .collect()
}

// ── 1. Antisymmetry ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn relative_strength_is_antisymmetric(
        (a, b) in (2usize..40).prop_flat_map(|n| (arb_closes(n, n + 1), arb_closes(n, n + 1))),
        lookback in 1usize..40,
    ) {
        let ab = relative_strength(&a, &b, lookback);
        let ba = relative_strength(&b, &a, lookback);
        match (ab, ba) {
            (Some(x), Some(y)) => prop_assert!((x + y).abs() < 1e-12),
            (None, None) => {}
            other => prop_assert!(false, "definedness differs: {:?}", other),
        }
    }
}

// ── 2. Constant true range ───────────────────────────────────────────

proptest! {
    #[test]
    fn atr_of_constant_true_range(
        price in 50.0..500.0_f64,
        k in 0.01..10.0_f64,
        lookback in 1usize..30,
        extra in 0usize..10,
    ) {
        let n = lookback + 1 + extra;
        let bars: Vec<Bar> = bars_from(&vec![price; n])
            .into_iter()
            .map(|b| Bar { high: price + k / 2.0, low: price - k / 2.0, ..b })
            .collect();
        let value = atr(&bars, lookback).unwrap();
        prop_assert!((value - k).abs() < 1e-9, "atr={value}, k={k}");
    }
}

// ── 3. Degenerate cross-section ──────────────────────────────────────

proptest! {
    #[test]
    fn identical_cross_section_is_exact_zero(value in -10.0..10.0_f64, n in 1usize..50) {
        let z = zscore(&vec![Some(value); n]);
        prop_assert_eq!(z, vec![Some(0.0); n]);
    }
}

#[test]
fn identical_repeating_decimals_are_exact_zero() {
    for (value, n) in [(0.1, 3), (0.7, 7), (1.0 / 3.0, 11)] {
        assert_eq!(zscore(&vec![Some(value); n]), vec![Some(0.0); n], "value {value} x{n}");
    }

    let rows = vec![
        RawIndicators {
            slope: Some(0.01),
            volatility_ratio: Some(0.7),
            ..Default::default()
        };
        7
    ];
    for z in normalize_cross_section(&rows) {
        assert_eq!(z.slope, Some(0.0));
        assert_eq!(z.inverse_volatility, Some(0.0));
    }
}

// ── 4. Insufficient history ──────────────────────────────────────────

proptest! {
    #[test]
    fn short_history_is_undefined(closes in arb_closes(0, 10), pad in 1usize..10) {
        let lookback = closes.len() + pad;
        let volumes = vec![1_000.0; closes.len()];
        prop_assert!(slope(&closes, lookback).is_none());
        prop_assert!(relative_strength(&closes, &closes, lookback).is_none());
        prop_assert!(relative_volume(&volumes, lookback).is_none());
        prop_assert!(volatility_ratio(&closes, &closes, lookback).is_none());
        prop_assert!(atr(&bars_from(&closes), lookback).is_none());
    }
}

// ── 5. Sorted output ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn scan_output_sorted_descending(
        universe in prop::collection::vec(arb_closes(30, 31), 1..8),
        bench in arb_closes(30, 31),
    ) {
        let mut snap = BarSnapshot::new();
        for tf in [Timeframe::Weekly, Timeframe::Daily] {
            snap.insert(tf, "SPY", BarSeries::new(bars_from(&bench)).unwrap());
            for (i, closes) in universe.iter().enumerate() {
                snap.insert(tf, format!("S{i:02}"), BarSeries::new(bars_from(closes)).unwrap());
            }
        }
        let engine = RsEngine::new(RsModel::default(), "SPY");
        let members = engine.members(&snap);
        let records = engine.scan(&snap, &members, &SectorMap::default()).unwrap();
        prop_assert_eq!(records.len(), universe.len());
        for w in records.windows(2) {
            prop_assert!(w[0].composite_score >= w[1].composite_score);
        }
    }
}

// ── 6. Alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn alignment_iff_unanimous_and_directional(biases in prop::collection::vec(arb_bias(), 0..5)) {
        let expected = !biases.is_empty()
            && biases[0] != Bias::Neutral
            && biases.iter().all(|b| *b == biases[0]);
        prop_assert_eq!(unanimous(biases.clone()), expected);

        let components: Vec<Component> = biases
            .iter()
            .map(|b| Component::new(Some(f64::from(b.as_i8())), 1.0))
            .collect();
        prop_assert_eq!(signed_composite(&components).aligned, expected);
    }
}

#[test]
fn composite_weight_sets_sum_to_one() {
    let model = RsModel::default();
    assert!((model.with_hourly.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    assert!((model.without_hourly.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    assert!((model.factors.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
}
