//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::criteria::Criterion;
use crate::domain::error::VcpError;
use crate::domain::evaluator::PatternEvaluator;
use crate::domain::forward_returns::ReturnSummary;
use crate::domain::price_series::PriceSeries;
use crate::domain::screen_config::{
    DateRange, ScreenConfig, UNIVERSE_SECTION, build_date_range, build_screen_config,
    build_tracker_config,
};
use crate::domain::screener::{ScreenReport, screen_universe};
use crate::domain::tracker::UniverseTracker;
use crate::domain::universe::{UniverseError, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DATA_SECTION: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "vcpscreen", about = "Volatility contraction pattern stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe and print symbols fulfilling the pattern today
    Screen {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [universe] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Directory for per-symbol panel and forward-return CSVs
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the latest criteria rows for one symbol
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Replay prices through the incremental tracker and rank uptrends
    Track {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Screen {
            config,
            symbols,
            output,
        } => run_screen(&config, symbols.as_deref(), output.as_deref()),
        Command::Evaluate {
            config,
            symbol,
            rows,
        } => run_evaluate(&config, &symbol, rows),
        Command::Track {
            config,
            symbols,
            top,
        } => run_track(&config, symbols.as_deref(), top),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn exit_with(result: Result<(), VcpError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, VcpError> {
    FileConfigAdapter::from_file(path).map_err(|e| VcpError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, VcpError> {
    let path = config
        .get_string(DATA_SECTION, "path")
        .ok_or_else(|| VcpError::ConfigMissing {
            section: DATA_SECTION.into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path.trim())))
}

/// Symbols from the command line, else `[universe] symbols`, else every
/// symbol the data port knows about.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    data_port: &dyn DataPort,
) -> Result<Vec<String>, VcpError> {
    let symbols = match symbols_override {
        Some(list) => parse_symbols(list)?,
        None => match config.get_string(UNIVERSE_SECTION, "symbols") {
            Some(list) => parse_symbols(&list)?,
            None => data_port.list_symbols()?,
        },
    };
    if symbols.is_empty() {
        return Err(UniverseError::Empty.into());
    }
    Ok(symbols)
}

fn run_screen(config_path: &Path, symbols: Option<&str>, output: Option<&Path>) -> ExitCode {
    exit_with(screen(config_path, symbols, output))
}

fn screen(config_path: &Path, symbols: Option<&str>, output: Option<&Path>) -> Result<(), VcpError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;
    let screen_config = build_screen_config(&config)?;
    let range = build_date_range(&config)?;
    let data_port = build_data_port(&config)?;
    let symbols = resolve_symbols(symbols, &config, &data_port)?;

    eprintln!("Screening {} symbols...", symbols.len());
    let report = run_screen_pipeline(
        &data_port,
        &CsvReportAdapter,
        &symbols,
        &screen_config,
        range,
        output,
    )?;

    for symbol in report.flagged() {
        println!("{}", symbol);
    }
    Ok(())
}

/// Screens `symbols`, prints forward-return summaries to stderr and, with an
/// output directory, writes the panel and forward returns of every flagged
/// symbol.
pub fn run_screen_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    symbols: &[String],
    config: &ScreenConfig,
    range: DateRange,
    output_dir: Option<&Path>,
) -> Result<ScreenReport, VcpError> {
    let report = screen_universe(data_port, symbols, config, range);

    if report.outcomes.is_empty() {
        return Err(VcpError::NoData {
            symbol: symbols.join(","),
        });
    }

    for (symbol, outcome) in &report.outcomes {
        if outcome.forward.is_empty() {
            continue;
        }
        eprintln!(
            "\n=== {}: pattern fulfilled on {} days ===",
            symbol,
            outcome.forward.rows.len()
        );
        eprintln!(
            "  {:>4} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "h", "n", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for summary in outcome.forward.summarize() {
            eprintln!("{}", format_summary(&summary));
        }
    }

    let flagged = report.flagged();
    eprintln!(
        "\n{} of {} symbols fulfil the pattern on their latest bar",
        flagged.len(),
        report.outcomes.len()
    );

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)?;
        for symbol in &flagged {
            let Some(outcome) = report.outcome(symbol) else {
                continue;
            };
            report_port.write_panel(&outcome.evaluation, &dir.join(format!("{symbol}_panel.csv")))?;
            report_port.write_forward_returns(
                &outcome.forward,
                &dir.join(format!("{symbol}_forward.csv")),
            )?;
        }
        eprintln!("Reports written to: {}", dir.display());
    }

    Ok(report)
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0))
}

pub fn format_summary(summary: &ReturnSummary) -> String {
    format!(
        "  {:>4} {:>5} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        summary.horizon,
        summary.count,
        percent(summary.mean),
        percent(summary.std),
        percent(summary.min),
        percent(summary.p25),
        percent(summary.median),
        percent(summary.p75),
        percent(summary.max),
    )
}

fn run_evaluate(config_path: &Path, symbol: &str, rows: usize) -> ExitCode {
    exit_with(evaluate(config_path, symbol, rows))
}

fn evaluate(config_path: &Path, symbol: &str, rows: usize) -> Result<(), VcpError> {
    let config = load_config(config_path)?;
    let screen_config = build_screen_config(&config)?;
    let range = build_date_range(&config)?;
    let data_port = build_data_port(&config)?;

    let symbol = symbol.trim().to_uppercase();
    let prices = data_port.fetch_prices(&symbol, range)?;
    if prices.is_empty() {
        return Err(VcpError::NoData { symbol });
    }

    let evaluation = PatternEvaluator::new(screen_config).evaluate(&prices)?;
    eprintln!(
        "{}: {} bars, pattern fulfilled on {} days",
        symbol,
        evaluation.len(),
        evaluation.fulfillment.count()
    );
    for criterion in Criterion::ALL {
        eprintln!("  {}", criterion);
    }

    let header: Vec<String> = Criterion::ALL
        .iter()
        .map(|c| format!("c{}", c.number()))
        .collect();
    println!("{:<10} {:>10} {} all", "date", "close", header.join(" "));

    let start = evaluation.len().saturating_sub(rows);
    for i in start..evaluation.len() {
        let marks: Vec<String> = evaluation
            .criteria
            .row(i)
            .iter()
            .enumerate()
            .map(|(c, &v)| {
                let width = header[c].len();
                format!("{:>width$}", if v { "x" } else { "." })
            })
            .collect();
        println!(
            "{:<10} {:>10.2} {} {:>3}",
            evaluation.dates()[i],
            evaluation.closes()[i],
            marks.join(" "),
            if evaluation.fulfillment.values[i] { "x" } else { "." }
        );
    }
    Ok(())
}

fn run_track(config_path: &Path, symbols: Option<&str>, top: Option<usize>) -> ExitCode {
    exit_with(track(config_path, symbols, top))
}

fn track(config_path: &Path, symbols: Option<&str>, top: Option<usize>) -> Result<(), VcpError> {
    let config = load_config(config_path)?;
    let mut tracker_config = build_tracker_config(&config)?;
    if let Some(top) = top {
        tracker_config.top = top;
    }
    let range = build_date_range(&config)?;
    let data_port = build_data_port(&config)?;
    let symbols = resolve_symbols(symbols, &config, &data_port)?;

    let series = fetch_all(&data_port, &symbols, range);
    if series.is_empty() {
        return Err(VcpError::NoData {
            symbol: symbols.join(","),
        });
    }

    let limit = tracker_config.top;
    let mut tracker = UniverseTracker::new(tracker_config);
    let fed = tracker.replay(&series)?;
    eprintln!("Replayed {} observations for {} symbols", fed, series.len());

    let ranked = tracker.ranked(limit);
    if ranked.is_empty() {
        eprintln!("No symbols in uptrend");
    }
    for (rank, entry) in ranked.iter().enumerate() {
        println!("{:>3} {:<10} {:>10.4}", rank + 1, entry.symbol, entry.scale);
    }
    Ok(())
}

fn fetch_all(data_port: &dyn DataPort, symbols: &[String], range: DateRange) -> Vec<PriceSeries> {
    let mut series = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match data_port.fetch_prices(symbol, range) {
            Ok(prices) if prices.is_empty() => warn!("skipping {}: no data", symbol),
            Ok(prices) => series.push(prices),
            Err(e) => warn!("skipping {}: {}", symbol, e),
        }
    }
    series
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    exit_with(list_symbols(config_path))
}

fn list_symbols(config_path: &Path) -> Result<(), VcpError> {
    let config = load_config(config_path)?;
    let data_port = build_data_port(&config)?;
    let symbols = data_port.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> ExitCode {
    exit_with(validate(config_path))
}

fn validate(config_path: &Path) -> Result<(), VcpError> {
    eprintln!("Validating config: {}", config_path.display());
    let config = load_config(config_path)?;

    let screen_config = build_screen_config(&config)?;
    let ma = &screen_config.ma_windows;
    eprintln!(
        "  Moving averages: {}/{}/{}/{}, slope window {}",
        ma.short, ma.medium, ma.long, ma.longest, screen_config.slope_window
    );
    eprintln!("  Horizons: {:?}", screen_config.horizons);

    let tracker_config = build_tracker_config(&config)?;
    eprintln!(
        "  Tracker EMAs: {}/{}/{}/{}, lookback {}",
        tracker_config.ema_fast,
        tracker_config.ema_medium,
        tracker_config.ema_slow,
        tracker_config.ema_long,
        tracker_config.lookback
    );

    build_date_range(&config)?;
    build_data_port(&config)?;
    if let Some(list) = config.get_string(UNIVERSE_SECTION, "symbols") {
        let symbols = parse_symbols(&list)?;
        eprintln!("  Universe: {} symbols", symbols.len());
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}
