//! AID CLI: headless access to the stock tracker core.
//!
//! Commands:
//! - `companies`: list the provider's companies
//! - `prices`: fetch one chart range for a ticker
//! - `indicators`: fetch a ticker's indicators with the pros/cons tally
//! - `nearest`: resolve the price point closest to a timestamp
//! - `swipe`: replay drag gestures through the page carousel
//! - `config`: print the effective configuration

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use aid_core::chart::ChartSelection;
use aid_core::config::AppConfig;
use aid_core::details::{execute, DetailsSession, LoadingState};
use aid_core::domain::{ChartPoint, Indicator, Page, ProsCons, TimeRange};
use aid_core::provider::{MarketProvider, SyntheticProvider};
use aid_core::{CarouselController, DragPhase};

#[derive(Parser)]
#[command(name = "aid", about = "AID CLI: stock tracker core from the terminal")]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/aid/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the companies shown in the carousel.
    Companies,
    /// Fetch the price series of one range.
    Prices {
        ticker: String,

        /// hour, day, week, month, year or all. Defaults to the configured range.
        #[arg(long)]
        range: Option<TimeRange>,
    },
    /// Fetch indicators, sorted by kind, with the pros/cons tally.
    Indicators { ticker: String },
    /// Find the price point nearest to a timestamp.
    Nearest {
        ticker: String,

        /// RFC 3339 timestamp, e.g. 2024-03-01T12:00:00Z. Clamped into the series.
        #[arg(long)]
        at: DateTime<Utc>,

        #[arg(long)]
        range: Option<TimeRange>,
    },
    /// Replay horizontal drags through the carousel; one translation per drag.
    Swipe {
        /// Drag translations in layout units (negative = leftward, to the next page).
        #[arg(required = true, allow_negative_numbers = true)]
        translations: Vec<f64>,

        /// Simulate this many placeholder pages instead of the provider's companies.
        #[arg(long)]
        pages: Option<usize>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    debug!(path = %config_path.display(), "configuration loaded");

    let provider = SyntheticProvider::from_config(&config.provider);

    match cli.command {
        Commands::Companies => print_output(cli.json, provider.companies().as_slice(), render_companies),
        Commands::Prices { ticker, range } => {
            let range = range.unwrap_or(config.details.default_range);
            let points = fetch_prices(&provider, &ticker, range)?;
            print_output(cli.json, &PricesOutput { ticker, range, points }, render_prices)
        }
        Commands::Indicators { ticker } => {
            let output = fetch_indicators(&provider, &ticker)?;
            print_output(cli.json, &output, render_indicators)
        }
        Commands::Nearest { ticker, at, range } => {
            let range = range.unwrap_or(config.details.default_range);
            let points = fetch_prices(&provider, &ticker, range)?;
            let point = nearest_point(&points, at).ok_or_else(|| anyhow!("no {range} data for {ticker}"))?;
            print_output(cli.json, &NearestOutput { query: at, point }, render_nearest)
        }
        Commands::Swipe { translations, pages } => {
            let pages = match pages {
                Some(n) => (1..=n).map(|i| Page::new(format!("P{i}"), format!("Page {i}"), "")).collect(),
                None => provider.companies(),
            };
            let steps = simulate_swipes(&config, pages, &translations);
            print_output(cli.json, steps.as_slice(), render_swipes)
        }
        Commands::Config => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_toml_string()?);
            }
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays clean for `--json`.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn print_output<T: Serialize + ?Sized>(json: bool, value: &T, render: fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        render(value);
    }
    Ok(())
}

// ── Fetching ─────────────────────────────────────────────────────────

/// Run a chart load through a details session, synchronously.
fn fetch_prices(provider: &dyn MarketProvider, ticker: &str, range: TimeRange) -> Result<Vec<ChartPoint>> {
    let mut session = DetailsSession::with_range(ticker, range);
    if let Some(request) = session.load_chart() {
        session.apply(execute(provider, request));
    }
    if let LoadingState::Error(e) = session.chart_state() {
        bail!("fetching {range} prices for {ticker}: {e}");
    }
    info!(ticker, %range, points = session.chart_points().len(), "prices fetched");
    Ok(session.chart_points().to_vec())
}

fn fetch_indicators(provider: &dyn MarketProvider, ticker: &str) -> Result<IndicatorsOutput> {
    let mut session = DetailsSession::new(ticker);
    if let Some(request) = session.load_indicators() {
        session.apply(execute(provider, request));
    }
    if let LoadingState::Error(e) = session.indicators_state() {
        bail!("fetching indicators for {ticker}: {e}");
    }
    Ok(IndicatorsOutput {
        ticker: ticker.to_string(),
        full_name: session.full_name().unwrap_or(ticker).to_string(),
        indicators: session.indicators_for_view().into_iter().cloned().collect(),
        tally: session.pros_cons(),
    })
}

fn nearest_point(points: &[ChartPoint], at: DateTime<Utc>) -> Option<ChartPoint> {
    ChartSelection::default().point_at(points, at).copied()
}

// ── Carousel simulation ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SwipeStep {
    translation: f64,
    committed: bool,
    active_index: usize,
    active_ticker: Option<String>,
}

fn simulate_swipes(config: &AppConfig, pages: Vec<Page>, translations: &[f64]) -> Vec<SwipeStep> {
    let mut carousel = CarouselController::new(config.carousel.clone());
    carousel.configure(pages);

    translations
        .iter()
        .map(|&dx| {
            let before = carousel.active_index();
            carousel.handle_drag(DragPhase::Began, 0.0);
            carousel.handle_drag(DragPhase::Changed, dx / 2.0);
            carousel.handle_drag(DragPhase::Changed, dx);
            carousel.handle_drag(DragPhase::Ended, dx);
            carousel.finish_animation();
            SwipeStep {
                translation: dx,
                committed: carousel.active_index() != before,
                active_index: carousel.active_index(),
                active_ticker: carousel.active_page().map(|p| p.ticker.clone()),
            }
        })
        .collect()
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PricesOutput {
    ticker: String,
    range: TimeRange,
    points: Vec<ChartPoint>,
}

#[derive(Serialize)]
struct IndicatorsOutput {
    ticker: String,
    full_name: String,
    indicators: Vec<Indicator>,
    tally: ProsCons,
}

#[derive(Serialize)]
struct NearestOutput {
    query: DateTime<Utc>,
    point: ChartPoint,
}

fn render_companies(pages: &[Page]) {
    for page in pages {
        println!("{:<6} {:<14} {}", page.ticker, page.name, page.sector);
    }
}

fn render_prices(out: &PricesOutput) {
    println!("{} ({}): {} points", out.ticker, out.range, out.points.len());
    for p in &out.points {
        println!("  {}  {:>10.2}", p.timestamp.format("%Y-%m-%d %H:%M"), p.open);
    }
}

fn render_indicators(out: &IndicatorsOutput) {
    println!("{} - {}", out.ticker, out.full_name);
    for i in &out.indicators {
        let symbol = i.verdict_kind().symbol().unwrap_or(" ");
        println!("  {symbol} {:<16} {:>10}", i.kind, i.formatted_value());
    }
    println!(
        "Pros: {}  Cons: {}  Total: {}",
        out.tally.pros,
        out.tally.cons,
        out.tally.sum()
    );
}

fn render_nearest(out: &NearestOutput) {
    println!(
        "{} -> {}  {:.2}",
        out.query.format("%Y-%m-%d %H:%M:%S"),
        out.point.timestamp.format("%Y-%m-%d %H:%M:%S"),
        out.point.open
    );
}

fn render_swipes(steps: &[SwipeStep]) {
    for step in steps {
        let outcome = if step.committed { "commit" } else { "snap back" };
        println!(
            "{:>8.1}  {:<9}  -> page {} {}",
            step.translation,
            outcome,
            step.active_index,
            step.active_ticker.as_deref().unwrap_or("-")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pages(n: usize) -> Vec<Page> {
        (0..n).map(|i| Page::new(format!("T{i}"), format!("Company {i}"), "")).collect()
    }

    #[test]
    fn parses_negative_translations() {
        let cli = Cli::try_parse_from(["aid", "swipe", "--pages", "3", "-40", "30"]).unwrap();
        match cli.command {
            Commands::Swipe { translations, pages } => {
                assert_eq!(translations, vec![-40.0, 30.0]);
                assert_eq!(pages, Some(3));
            }
            _ => panic!("expected swipe"),
        }
    }

    #[test]
    fn parses_range_and_timestamp() {
        let cli = Cli::try_parse_from([
            "aid",
            "--json",
            "nearest",
            "SBER",
            "--at",
            "2024-03-01T12:00:00Z",
            "--range",
            "week",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Nearest { ticker, at, range } => {
                assert_eq!(ticker, "SBER");
                assert_eq!(at, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
                assert_eq!(range, Some(TimeRange::Week));
            }
            _ => panic!("expected nearest"),
        }
    }

    #[test]
    fn rejects_unknown_range() {
        assert!(Cli::try_parse_from(["aid", "prices", "SBER", "--range", "decade"]).is_err());
    }

    #[test]
    fn swipe_simulation_wraps_and_snaps_back() {
        let config = AppConfig::default();
        // page width 80: 40 commits, 5 does not
        let steps = simulate_swipes(&config, pages(3), &[40.0, -5.0, -40.0, -40.0]);
        let indices: Vec<usize> = steps.iter().map(|s| s.active_index).collect();
        assert_eq!(indices, vec![2, 2, 0, 1]);
        assert!(!steps[1].committed);
        assert_eq!(steps[0].active_ticker.as_deref(), Some("T2"));
    }

    #[test]
    fn swipe_on_single_page_never_commits() {
        let steps = simulate_swipes(&AppConfig::default(), pages(1), &[-60.0, 60.0]);
        assert!(steps.iter().all(|s| !s.committed && s.active_index == 0));
    }

    #[test]
    fn fetch_reports_unknown_ticker() {
        let provider = SyntheticProvider::new(1);
        let err = fetch_prices(&provider, "ZZZZ", TimeRange::Day).unwrap_err();
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn nearest_clamps_before_series_start() {
        let provider = SyntheticProvider::new(1);
        let points = fetch_prices(&provider, "SBER", TimeRange::Day).unwrap();
        let early = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(nearest_point(&points, early), points.first().copied());
    }

    #[test]
    fn indicators_output_is_sorted_and_tallied() {
        let provider = SyntheticProvider::new(1);
        let out = fetch_indicators(&provider, "GAZP").unwrap();
        assert!(out.indicators.windows(2).all(|w| w[0].kind <= w[1].kind));
        assert!(out.tally.sum() <= 8);
    }

    #[test]
    fn slice_outputs_print_in_both_modes() {
        let companies = pages(2);
        assert!(print_output(true, companies.as_slice(), render_companies).is_ok());
        assert!(print_output(false, companies.as_slice(), render_companies).is_ok());
        let config = AppConfig::default();
        let steps = simulate_swipes(&config, pages(3), &[-60.0]);
        assert!(print_output(true, steps.as_slice(), render_swipes).is_ok());
    }
}
