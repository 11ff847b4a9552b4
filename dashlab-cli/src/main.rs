//! Dashlab CLI: compute one dashboard view and print it.
//!
//! Commands:
//! - `financial`: price, volume and range-high cards for a stock symbol
//! - `sales`: synthetic sales totals, region breakdown and daily series
//! - `performance`: KPI gauges against their targets

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use dashlab_core::domain::{AnalysisMode, AnalysisRequest};
use dashlab_service::{
    Dashboard, DashboardController, DashboardExtras, ProviderKind, ServiceConfig,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashlab", about = "Dashlab CLI: analytics dashboard data service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML service config. Defaults are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the dashboard as JSON instead of a text summary.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Start date (YYYY-MM-DD). Defaults to January 1 of the current year.
    #[arg(long, global = true)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true)]
    end: Option<String>,

    /// Seed for synthetic sales data; overrides the config.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Read market data from `<DIR>/<SYMBOL>.csv` instead of Yahoo Finance.
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stock metrics for one symbol.
    Financial {
        /// Ticker symbol, e.g. AAPL.
        #[arg(long, default_value = "AAPL")]
        symbol: String,
    },
    /// Synthetic sales analytics.
    Sales,
    /// KPI gauges against their targets.
    Performance,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(dir) = &cli.csv_dir {
        config.provider.kind = ProviderKind::Csv;
        config.provider.dir = dir.clone();
    }
    tracing::debug!(?config, "service config");

    let today = chrono::Local::now().date_naive();
    let start = parse_date(cli.start.as_deref(), "--start")?.unwrap_or_else(|| year_start(today));
    let end = parse_date(cli.end.as_deref(), "--end")?.unwrap_or(today);

    let request = match cli.command {
        Commands::Financial { symbol } => AnalysisRequest::financial(symbol, start, end),
        Commands::Sales => AnalysisRequest::sales(start, end),
        Commands::Performance => AnalysisRequest::performance(start, end),
    };

    let controller =
        DashboardController::from_config(&config).context("building market-data provider")?;
    let dashboard = controller
        .compute_dashboard(&request)
        .context("invalid request")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_summary(&dashboard);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("{flag} expects YYYY-MM-DD, got '{s}'"))
        })
        .transpose()
}

fn year_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
}

fn print_summary(dash: &Dashboard) {
    let req = &dash.request;
    println!();
    println!("=== {} ===", req.mode);
    if let Some(symbol) = &req.symbol {
        println!("Symbol:      {symbol}");
    }
    println!("Period:      {} to {}", req.start, req.end);
    if req.mode != AnalysisMode::Performance {
        println!("Rows:        {} ({:?})", dash.table.len(), dash.origin);
    }

    if !dash.metrics.is_empty() {
        println!();
        for metric in &dash.metrics {
            match metric.delta_display() {
                Some(delta) => println!("  {:<26} {:>16}  {delta}", metric.name, metric.display),
                None => println!("  {:<26} {:>16}", metric.name, metric.display),
            }
        }
    }

    match &dash.extras {
        DashboardExtras::Financial => {}
        DashboardExtras::Sales {
            by_region,
            daily_series,
        } => {
            println!();
            println!("Sales by region:");
            for group in by_region {
                println!(
                    "  {:<8} {:>16}",
                    group.region,
                    dashlab_core::domain::format_currency(group.total)
                );
            }
            println!("Daily series: {} points", daily_series.len());
        }
        DashboardExtras::Performance { gauges } => {
            println!();
            println!(
                "  {:<24} {:>14} {:>14} {:>14}",
                "Metric", "Current", "Target", "Scale max"
            );
            for g in gauges {
                println!(
                    "  {:<24} {:>14.2} {:>14.2} {:>14.2}",
                    g.name, g.value, g.target, g.upper_bound
                );
            }
        }
    }

    for diagnostic in &dash.diagnostics {
        println!();
        println!("warning: {diagnostic}");
    }
    println!();
}
