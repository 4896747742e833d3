//! TrendScan CLI: relative-strength and spot momentum scans.
//!
//! Commands:
//! - `scan`: rank sector ETFs and stocks by multi-timeframe relative strength
//! - `spot`: intraday momentum detail for one symbol, or the universe top/bottom
//! - `universe`: list sectors and report symbols without a sector mapping

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use trendscan_core::data::Universe;
use trendscan_core::domain::{Symbol, Timeframe};
use trendscan_core::engine::{IntradayMetrics, RsEngine, SpotEngine, SpotRecord};
use trendscan_core::scoring::{Bias, CompositeRecord};
use trendscan_runner::{
    load_snapshot, run_market_scan, run_spot_symbol, run_spot_universe, CsvScanWriter,
    LoadOptions, LoadedData, MarketScanOptions, ResultSink, ScanConfig, ScanManifest, ScanMeta,
    ScanType,
};

#[derive(Parser)]
#[command(
    name = "trendscan",
    about = "TrendScan CLI: multi-timeframe relative strength and spot momentum"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by `scan` and `spot`; each overrides the config file.
#[derive(Args)]
struct CommonArgs {
    /// Path to a TOML scan config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bar directory laid out as <timeframe>/<SYMBOL>.csv.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output root for scan CSVs and watchlists.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Universe TOML (sector ETF -> member tickers).
    #[arg(long)]
    universe: Option<PathBuf>,

    /// Restrict the stock listing to one sector ETF (e.g. XLK).
    #[arg(long)]
    sector: Option<String>,

    /// Generate synthetic bars for missing files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Score symbols on one thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank sector ETFs and stocks by multi-timeframe relative strength.
    Scan {
        #[command(flatten)]
        common: CommonArgs,

        /// Rows in each printed ranking and watchlist.
        #[arg(long)]
        top_n: Option<usize>,

        /// Score on weekly and daily bars only.
        #[arg(long, default_value_t = false)]
        no_hourly: bool,
    },
    /// Intraday momentum detail for SYMBOL, or the universe top/bottom 10.
    Spot {
        /// Symbol for the detail view; omit for the universe scan.
        symbol: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// List sectors and report symbols without a sector mapping.
    Universe {
        /// Universe TOML. Defaults to the built-in US universe.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Bar directory to check for unmapped symbols.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            common,
            top_n,
            no_hourly,
        } => run_scan_cmd(common, top_n, no_hourly),
        Commands::Spot { symbol, common } => run_spot_cmd(symbol, common),
        Commands::Universe { universe, data_dir } => run_universe_cmd(universe, &data_dir),
    }
}

fn build_config(common: &CommonArgs) -> Result<ScanConfig> {
    let mut config = match &common.config {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScanConfig::default(),
    };
    if let Some(dir) = &common.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &common.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(path) = &common.universe {
        config.universe_file = Some(path.clone());
    }
    if common.synthetic {
        config.synthetic = true;
    }
    if common.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn load(config: &ScanConfig, symbols: &[Symbol], timeframes: Vec<Timeframe>) -> Result<LoadedData> {
    let opts = LoadOptions {
        timeframes,
        synthetic: config.synthetic,
        ..Default::default()
    };
    let loaded = load_snapshot(&config.data_dir, symbols, &opts)
        .with_context(|| format!("loading bars from {}", config.data_dir.display()))?;
    if loaded.snapshot.series_count() == 0 {
        bail!(
            "no bar files found under {} (use --synthetic for synthetic data)",
            config.data_dir.display()
        );
    }
    Ok(loaded)
}

fn scan_time() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

// ─── scan ───────────────────────────────────────────────────────────

fn run_scan_cmd(common: CommonArgs, top_n: Option<usize>, no_hourly: bool) -> Result<()> {
    let mut config = build_config(&common)?;
    if let Some(n) = top_n {
        config.top_n = n;
    }
    if no_hourly {
        config.include_hourly = false;
    }
    config.validate()?;

    let universe = config.universe()?;
    let loaded = load(&config, &universe.all_symbols(), config.rs_timeframes())?;
    let engine = RsEngine::new(config.rs_model.clone(), universe.benchmark.clone());

    let opts = MarketScanOptions {
        parallel: config.parallel,
        sector: common.sector.clone(),
    };
    let scan = run_market_scan(&engine, &loaded.snapshot, &universe, &opts).context("scan failed")?;

    print_ranking("Sector Ranking", &ranked(&scan.sectors).collect::<Vec<_>>());
    if scan.stocks.is_empty() {
        println!("No stocks scored.");
    } else {
        let n = config.top_n.min(scan.stocks.len());
        print_ranking(&format!("Top {n} Stocks"), &ranked(&scan.stocks).take(n).collect::<Vec<_>>());
        print_ranking(&format!("Weakest {n} Stocks"), &weakest(&scan.stocks, n));
    }
    if loaded.has_synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }

    let writer = CsvScanWriter::new(&config.output_dir);
    let now = scan_time();
    let version = &engine.model().version;
    let sector_meta = ScanMeta::new(ScanType::Sector, version, &loaded.dataset_hash, now);
    let stock_meta = ScanMeta::new(ScanType::Stock, version, &loaded.dataset_hash, now);

    let sector_path = writer.write_rs_scan(&sector_meta, &scan.sectors)?;
    writer.write_manifest(&ScanManifest {
        meta: sector_meta,
        rows: scan.sectors.len(),
        has_synthetic: loaded.has_synthetic,
        files: vec![sector_path.clone()],
    })?;

    let stock_path = writer.write_rs_scan(&stock_meta, &scan.stocks)?;
    let (strong, weak) = writer.write_watchlists(&stock_meta, &scan.stocks, config.top_n)?;
    writer.write_manifest(&ScanManifest {
        meta: stock_meta,
        rows: scan.stocks.len(),
        has_synthetic: loaded.has_synthetic,
        files: vec![stock_path.clone(), strong, weak],
    })?;

    println!("Sector scan saved to: {}", sector_path.display());
    println!("Stock scan saved to:  {}", stock_path.display());
    Ok(())
}

fn bias_label(bias: Bias) -> &'static str {
    match bias {
        Bias::Bullish => "up",
        Bias::Bearish => "down",
        Bias::Neutral => "flat",
    }
}

/// Records paired with their 1-based rank in the full ranking.
fn ranked(records: &[CompositeRecord]) -> impl DoubleEndedIterator<Item = (usize, &CompositeRecord)> {
    records.iter().enumerate().map(|(i, r)| (i + 1, r))
}

/// The `n` lowest-ranked records, weakest first, keeping their true ranks.
fn weakest(records: &[CompositeRecord], n: usize) -> Vec<(usize, &CompositeRecord)> {
    ranked(records).rev().take(n).collect()
}

fn print_ranking(title: &str, rows: &[(usize, &CompositeRecord)]) {
    println!();
    println!("=== {title} ===");
    println!(
        "{:<4} {:<7} {:<6} {:>9} {:>8} {:>8} {:>8} {:<7}",
        "#", "Symbol", "Sector", "Score", "Weekly", "Daily", "Hourly", "Aligned"
    );
    println!("{}", "-".repeat(66));
    for &(rank, r) in rows {
        let hourly = r
            .hourly
            .as_ref()
            .map(|h| format!("{:+.3}", h.score))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<4} {:<7} {:<6} {:>+9.3} {:>+8.3} {:>+8.3} {:>8} {:<7}",
            rank,
            r.symbol,
            r.sector.as_deref().unwrap_or("-"),
            r.composite_score,
            r.weekly.score,
            r.daily.score,
            hourly,
            if r.aligned { "yes" } else { "" }
        );
    }
}

// ─── spot ───────────────────────────────────────────────────────────

fn run_spot_cmd(symbol: Option<String>, common: CommonArgs) -> Result<()> {
    let config = build_config(&common)?;
    config.validate()?;
    let universe = config.universe()?;
    let sectors = universe.sector_map();
    let engine = SpotEngine::new(config.spot_model.clone(), universe.benchmark.clone());

    let (records, loaded) = match symbol {
        Some(symbol) => {
            let symbol = symbol.to_uppercase();
            let loaded = load(
                &config,
                &[symbol.clone(), universe.benchmark.clone()],
                Timeframe::ALL.to_vec(),
            )?;
            let record = run_spot_symbol(&engine, &loaded.snapshot, &symbol, &sectors)
                .context("spot scan failed")?;
            print_spot_detail(&record);
            (vec![record], loaded)
        }
        None => {
            let members = match &common.sector {
                Some(sector) => {
                    let sector = sector.to_uppercase();
                    match universe.sector_members(&sector) {
                        Some(members) => members.to_vec(),
                        None => bail!("unknown sector '{sector}'"),
                    }
                }
                None => universe.stock_symbols(),
            };
            let mut symbols = members.clone();
            symbols.push(universe.benchmark.clone());
            let loaded = load(&config, &symbols, Timeframe::ALL.to_vec())?;
            let records =
                run_spot_universe(&engine, &loaded.snapshot, &members, &sectors, config.parallel);
            if records.is_empty() {
                bail!("no symbols could be scored (is {} daily data present?)", universe.benchmark);
            }
            print_spot_table(&records, 10);
            (records, loaded)
        }
    };
    if loaded.has_synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }

    let meta = ScanMeta::new(
        ScanType::Spot,
        &engine.model().version,
        &loaded.dataset_hash,
        scan_time(),
    );
    let writer = CsvScanWriter::new(&config.output_dir);
    let path = writer.write_spot_scan(&meta, &records)?;
    writer.write_manifest(&ScanManifest {
        meta,
        rows: records.len(),
        has_synthetic: loaded.has_synthetic,
        files: vec![path.clone()],
    })?;
    println!("Spot scan saved to: {}", path.display());
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".into())
}

fn print_spot_detail(r: &SpotRecord) {
    println!();
    println!("=== Spot: {} ===", r.symbol);
    println!("Sector:         {}", r.sector.as_deref().unwrap_or("-"));
    println!("Price:          {}", fmt_opt(r.price, 2));
    println!(
        "ATR W/D/H:      {} / {} / {}",
        fmt_opt(r.atr_weekly, 2),
        fmt_opt(r.atr_daily, 2),
        fmt_opt(r.atr_hourly, 2)
    );
    println!(
        "Range used D/W: {} / {} ATR",
        fmt_opt(r.daily_range_consumed, 2),
        fmt_opt(r.weekly_range_consumed, 2)
    );
    println!("Daily RVOL:     {}", fmt_opt(r.rvol_daily, 2));
    println!();
    println!("--- Intraday ---");
    println!("{:<6} {:>9} {:>7} {:>9}", "TF", "RS", "RVOL", "ATR");
    for tf in Timeframe::INTRADAY {
        print_horizon(tf, r.horizon(tf));
    }
    println!(
        "Composite:      {} ({}){}",
        fmt_opt(r.intraday_composite, 4),
        bias_label(r.intraday_bias),
        if r.intraday_aligned { " aligned" } else { "" }
    );
    println!();
    println!("--- Levels ---");
    let l = &r.levels;
    println!(
        "Prior day:      H {} ({}%)  L {} ({}%)",
        fmt_opt(l.daily_high, 2),
        fmt_opt(l.pct_from_daily_high, 2),
        fmt_opt(l.daily_low, 2),
        fmt_opt(l.pct_from_daily_low, 2)
    );
    println!(
        "20-day:         H {} ({}%)  L {} ({}%)",
        fmt_opt(l.high_20d, 2),
        fmt_opt(l.pct_from_20d_high, 2),
        fmt_opt(l.low_20d, 2),
        fmt_opt(l.pct_from_20d_low, 2)
    );
    println!();
}

fn print_horizon(tf: Timeframe, metrics: Option<&IntradayMetrics>) {
    match metrics {
        Some(m) => println!(
            "{:<6} {:>9} {:>7} {:>9}",
            tf.as_str(),
            fmt_opt(m.rs, 4),
            fmt_opt(m.rvol, 2),
            fmt_opt(m.atr, 2)
        ),
        None => println!("{:<6} {:>9}", tf.as_str(), "no data"),
    }
}

fn print_spot_table(records: &[SpotRecord], n: usize) {
    let row = |r: &SpotRecord| {
        println!(
            "{:<7} {:<6} {:>9} {:>9} {:>9} {:>9} {:<5} {:<7}",
            r.symbol,
            r.sector.as_deref().unwrap_or("-"),
            fmt_opt(r.price, 2),
            fmt_opt(r.intraday_composite, 4),
            fmt_opt(r.daily_range_consumed, 2),
            fmt_opt(r.rvol_daily, 2),
            bias_label(r.intraday_bias),
            if r.intraday_aligned { "yes" } else { "" }
        );
    };
    let header = || {
        println!(
            "{:<7} {:<6} {:>9} {:>9} {:>9} {:>9} {:<5} {:<7}",
            "Symbol", "Sector", "Price", "Intraday", "DayATRs", "RVOL", "Bias", "Aligned"
        );
        println!("{}", "-".repeat(68));
    };

    let n = n.min(records.len());
    println!();
    println!("=== Top {n} Intraday ===");
    header();
    records.iter().take(n).for_each(row);

    println!();
    println!("=== Bottom {n} Intraday ===");
    header();
    records.iter().rev().take(n).for_each(row);
}

// ─── universe ───────────────────────────────────────────────────────

fn run_universe_cmd(universe_file: Option<PathBuf>, data_dir: &Path) -> Result<()> {
    let universe = match &universe_file {
        Some(path) => Universe::from_file(path)
            .with_context(|| format!("loading universe {}", path.display()))?,
        None => Universe::default_us(),
    };

    println!("Benchmark: {}", universe.benchmark);
    println!(
        "Sectors: {}  Stocks: {}",
        universe.sectors.len(),
        universe.stock_symbols().len()
    );
    println!();
    for (etf, members) in &universe.sectors {
        println!("{:<5} ({:>2}) {}", etf, members.len(), members.join(" "));
    }

    let daily_dir = data_dir.join(Timeframe::Daily.as_str());
    if !daily_dir.is_dir() {
        return Ok(());
    }

    let sectors = universe.sector_map();
    let known = universe.all_symbols();
    let mut on_disk: Vec<Symbol> = Vec::new();
    for entry in std::fs::read_dir(&daily_dir)
        .with_context(|| format!("reading {}", daily_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            on_disk.push(stem.to_uppercase());
        }
    }
    on_disk.sort();
    let unmapped: Vec<&str> = sectors
        .unmapped(&on_disk)
        .into_iter()
        .filter(|s| !known.iter().any(|k| k.as_str() == *s))
        .collect();

    println!();
    if unmapped.is_empty() {
        println!("All {} symbols in {} have a sector mapping.", on_disk.len(), daily_dir.display());
    } else {
        println!("Symbols without a sector mapping ({}):", unmapped.len());
        for symbol in unmapped {
            println!("  {symbol}");
        }
    }
    Ok(())
}
