//! End-to-end scan scenarios over small hand-built universes.

use chrono::NaiveDate;
use trendscan_core::data::SectorMap;
use trendscan_core::domain::{Bar, BarSeries, BarSnapshot, Timeframe};
use trendscan_core::engine::{RsEngine, ScanError, SpotEngine};
use trendscan_core::indicators::relative_strength;
use trendscan_core::model::{RsModel, SpotModel};
use trendscan_core::scoring::Bias;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(closes: &[f64]) -> BarSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: base + chrono::Duration::hours(i as i64),
            open: close,
            high: close * 1.005,
            low: close * 0.995,
            close,
            volume: 1_000.0,
        })
        .collect();
    BarSeries::new(bars).unwrap()
}

/// Benchmark alternating between 100 and 101, so its volatility is non-zero.
fn benchmark(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect()
}

fn geometric(start: f64, growth: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start * (1.0 + growth).powi(i as i32)).collect()
}

/// SPY plus X (outperforming) and Y (underperforming) on weekly and daily.
fn two_symbol_snapshot() -> BarSnapshot {
    let mut snap = BarSnapshot::new();
    for tf in [Timeframe::Weekly, Timeframe::Daily] {
        snap.insert(tf, "SPY", make_series(&benchmark(30)));
        snap.insert(tf, "X", make_series(&geometric(50.0, 0.02, 30)));
        snap.insert(tf, "Y", make_series(&geometric(50.0, -0.02, 30)));
    }
    snap
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Relative-strength engine ─────────────────────────────────────────

#[test]
fn outperformer_ranks_above_underperformer() {
    let snap = two_symbol_snapshot();
    let engine = RsEngine::new(RsModel::default(), "SPY");
    let members = engine.members(&snap);
    let records = engine.scan(&snap, &members, &SectorMap::default()).unwrap();

    assert_eq!(records.len(), 2);
    let x = &records[0];
    let y = &records[1];
    assert_eq!(x.symbol, "X");
    assert_eq!(y.symbol, "Y");

    for (x_tf, y_tf) in [(&x.weekly, &y.weekly), (&x.daily, &y.daily)] {
        assert!(x_tf.z.relative_strength.unwrap() > 0.0);
        assert!(y_tf.z.relative_strength.unwrap() < 0.0);
    }
    assert!(x.composite_score > y.composite_score);
    assert!(x.aligned);
    assert_eq!(x.weekly.bias, Bias::Bullish);
    assert_eq!(y.daily.bias, Bias::Bearish);
}

#[test]
fn short_hourly_history_uses_two_timeframe_weights() {
    let mut snap = two_symbol_snapshot();
    snap.insert(Timeframe::Hourly, "SPY", make_series(&benchmark(30)));
    snap.insert(Timeframe::Hourly, "X", make_series(&geometric(50.0, 0.01, 30)));
    snap.insert(Timeframe::Hourly, "Y", make_series(&geometric(50.0, -0.01, 5)));

    let engine = RsEngine::new(RsModel::default(), "SPY");
    let members = engine.members(&snap);
    let records = engine.scan(&snap, &members, &SectorMap::default()).unwrap();
    let x = records.iter().find(|r| r.symbol == "X").unwrap();
    let y = records.iter().find(|r| r.symbol == "Y").unwrap();

    assert!(y.hourly.is_none());
    assert!(approx(
        y.composite_score,
        0.55 * y.weekly.score + 0.45 * y.daily.score
    ));

    let xh = x.hourly.as_ref().unwrap();
    assert!(approx(
        x.composite_score,
        0.40 * x.weekly.score + 0.35 * x.daily.score + 0.25 * xh.score
    ));
    // X is alone in the hourly cross-section: every hourly z-score is 0.
    assert_eq!(xh.score, 0.0);
    assert!(!x.aligned);
}

#[test]
fn missing_weekly_benchmark_aborts_scan() {
    let mut snap = BarSnapshot::new();
    snap.insert(Timeframe::Daily, "SPY", make_series(&benchmark(30)));
    snap.insert(Timeframe::Daily, "X", make_series(&geometric(50.0, 0.02, 30)));
    snap.insert(Timeframe::Weekly, "X", make_series(&geometric(50.0, 0.02, 30)));

    let engine = RsEngine::new(RsModel::default(), "SPY");
    let members = engine.members(&snap);
    let err = engine.scan(&snap, &members, &SectorMap::default()).unwrap_err();
    assert!(matches!(
        err,
        ScanError::MissingBenchmark {
            timeframe: Timeframe::Weekly,
            ..
        }
    ));
    assert_eq!(err.to_string(), "benchmark SPY missing from weekly data");
}

#[test]
fn symbol_missing_a_timeframe_is_skipped() {
    let mut snap = two_symbol_snapshot();
    snap.insert(Timeframe::Daily, "Z", make_series(&geometric(10.0, 0.01, 30)));

    let engine = RsEngine::new(RsModel::default(), "SPY");
    let members = engine.members(&snap);
    assert!(members.contains(&"Z".to_string()));
    let records = engine.scan(&snap, &members, &SectorMap::default()).unwrap();
    assert!(records.iter().all(|r| r.symbol != "Z"));
    assert_eq!(records.len(), 2);
}

#[test]
fn rs_output_sorted_descending() {
    let mut snap = BarSnapshot::new();
    let growth = [0.015, -0.01, 0.03, 0.0, -0.025, 0.005];
    for tf in [Timeframe::Weekly, Timeframe::Daily] {
        snap.insert(tf, "SPY", make_series(&benchmark(40)));
        for (i, g) in growth.iter().enumerate() {
            snap.insert(tf, format!("S{i}"), make_series(&geometric(30.0, *g, 40)));
        }
    }
    let engine = RsEngine::new(RsModel::default(), "SPY");
    let members = engine.members(&snap);
    let records = engine.scan(&snap, &members, &SectorMap::default()).unwrap();
    assert_eq!(records.len(), growth.len());
    assert!(records
        .windows(2)
        .all(|w| w[0].composite_score >= w[1].composite_score));
}

// ── Spot engine ──────────────────────────────────────────────────────

#[test]
fn spot_rescales_weights_over_present_horizons() {
    let mut snap = BarSnapshot::new();
    snap.insert(Timeframe::Daily, "SPY", make_series(&benchmark(30)));
    snap.insert(Timeframe::Daily, "X", make_series(&geometric(50.0, 0.01, 30)));
    let x_1h = geometric(50.0, 0.004, 24);
    let x_5m = geometric(50.0, 0.001, 24);
    snap.insert(Timeframe::Hourly, "SPY", make_series(&benchmark(24)));
    snap.insert(Timeframe::Hourly, "X", make_series(&x_1h));
    snap.insert(Timeframe::FiveMinute, "SPY", make_series(&benchmark(24)));
    snap.insert(Timeframe::FiveMinute, "X", make_series(&x_5m));

    let engine = SpotEngine::new(SpotModel::default(), "SPY");
    let rec = engine
        .scan_symbol("X", &snap, &SectorMap::default())
        .unwrap();

    let rs_1h = relative_strength(&x_1h, &benchmark(24), 10).unwrap();
    let rs_5m = relative_strength(&x_5m, &benchmark(24), 12).unwrap();
    let expected = rs_1h * (0.50 / 0.70) + rs_5m * (0.20 / 0.70);

    assert!(rec.fifteen_minute.is_none());
    assert!(approx(rec.intraday_composite.unwrap(), expected));
    assert!(!approx(rec.intraday_composite.unwrap(), rs_1h * 0.50 + rs_5m * 0.20));
    assert_eq!(rec.intraday_bias, Bias::Bullish);
    assert!(rec.intraday_aligned);
    assert!(rec.rvol_daily.is_some());
}

#[test]
fn spot_universe_sorted_and_annotated() {
    let mut snap = BarSnapshot::new();
    snap.insert(Timeframe::Daily, "SPY", make_series(&benchmark(30)));
    snap.insert(Timeframe::Hourly, "SPY", make_series(&benchmark(24)));
    for (symbol, growth) in [("AAPL", 0.002), ("XOM", -0.003), ("NVDA", 0.006)] {
        snap.insert(Timeframe::Daily, symbol, make_series(&geometric(80.0, growth, 30)));
        snap.insert(Timeframe::Hourly, symbol, make_series(&geometric(80.0, growth, 24)));
    }
    let sectors = SectorMap::from_pairs([("AAPL", "XLK"), ("NVDA", "XLK"), ("XOM", "XLE")]);

    let engine = SpotEngine::new(SpotModel::default(), "SPY");
    let members = engine.members(&snap);
    let records = engine.scan_universe(&snap, &members, &sectors);
    let order: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["NVDA", "AAPL", "XOM"]);
    assert_eq!(records[2].sector.as_deref(), Some("XLE"));
    assert!(records.iter().all(|r| r.symbol != "SPY"));
}
