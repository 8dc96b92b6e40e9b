use analyzer::Analyzer;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use configuration::{Config, Metric, load_config};
use core_types::AnalysisWindow;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the pairwise analysis tool.
fn main() -> anyhow::Result<ExitCode> {
    // Optional .env with PAIRWISE__* overrides
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config)?;

    let analyzer = Analyzer::from_config(&config);
    analyzer
        .sink()
        .ensure_root()
        .context("Failed to create the results directory")?;

    let ok = match cli.command {
        Commands::Return(args) => {
            let w = args.window.resolve()?;
            analyzer.investment_return(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Correlation(args) => {
            let w = args.window.resolve()?;
            analyzer.correlation(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Moves(args) => {
            let w = args.window.resolve()?;
            analyzer.moves_correlation(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Stats(args) => {
            let w = args.window.resolve()?;
            analyzer.basic_statistics(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Risk(args) => {
            let w = args.window.resolve()?;
            analyzer.risk_indicators(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Chart(args) => {
            let w = args.window.resolve()?;
            analyzer.price_chart(&w, &args.source_a, &args.source_b).is_some()
        }
        Commands::Analyze(args) => handle_analyze(&analyzer, &config, args)?,
        Commands::Check(args) => handle_check(&analyzer, args)?,
        Commands::Coverage => handle_coverage(&analyzer)?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Comparative analytics for pairs of instrument price histories.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Percentage return of each instrument over the window.
    Return(PairArgs),
    /// Correlation of closing prices on shared dates.
    Correlation(PairArgs),
    /// Correlation of daily percentage moves.
    Moves(PairArgs),
    /// Mean, median, standard deviation, min and max of each instrument.
    Stats(PairArgs),
    /// Sharpe and Sortino ratios of each instrument.
    Risk(PairArgs),
    /// Normalized price chart of both instruments.
    Chart(PairArgs),
    /// Run several operations in sequence, continuing past failures.
    Analyze(AnalyzeArgs),
    /// Check whether a window is covered by the data of each source.
    Check(CheckArgs),
    /// List every instrument in the data directory with its date range.
    Coverage,
}

#[derive(Args)]
struct WindowArgs {
    /// First day of the window (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last day of the window, inclusive (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,
}

impl WindowArgs {
    fn resolve(&self) -> anyhow::Result<AnalysisWindow> {
        Ok(AnalysisWindow::new(self.from, self.to)?)
    }
}

#[derive(Args)]
struct PairArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// First instrument: an id in the data directory or a path to a price file.
    source_a: String,

    /// Second instrument.
    source_b: String,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    pair: PairArgs,

    /// Operations to run (comma separated). Defaults to `analysis.metrics` from the config.
    #[arg(long, value_enum, value_delimiter = ',')]
    only: Vec<Metric>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    window: WindowArgs,

    /// One or more instrument ids or price file paths.
    #[arg(required = true)]
    sources: Vec<String>,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_analyze(analyzer: &Analyzer, config: &Config, args: AnalyzeArgs) -> anyhow::Result<bool> {
    let window = args.pair.window.resolve()?;
    let metrics = if args.only.is_empty() {
        config.analysis.metrics.clone()
    } else {
        args.only
    };

    tracing::info!(
        %window,
        source_a = %args.pair.source_a,
        source_b = %args.pair.source_b,
        steps = metrics.len(),
        "Starting analysis."
    );

    let progress_bar = ProgressBar::new(metrics.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let outcome = analyzer.run_all(
        &window,
        &args.pair.source_a,
        &args.pair.source_b,
        &metrics,
        |metric, ok| {
            progress_bar.inc(1);
            let status = if ok { "done" } else { "failed" };
            progress_bar.set_message(format!("{} {status}", metric.label()));
        },
    );
    progress_bar.finish_with_message("Analysis complete!");

    println!("Completed: {}", join_labels(&outcome.completed));
    if !outcome.failed.is_empty() {
        println!("Failed: {}", join_labels(&outcome.failed));
    }

    Ok(outcome.failed.is_empty())
}

fn join_labels(steps: &[Metric]) -> String {
    steps.iter().map(|m| m.label()).collect::<Vec<_>>().join(", ")
}

fn handle_check(analyzer: &Analyzer, args: CheckArgs) -> anyhow::Result<bool> {
    let window = args.window.resolve()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Source", "Feasible", "Available range"]);

    let mut all_feasible = true;
    for source in &args.sources {
        let feasible = analyzer.feasible(&window, source);
        all_feasible &= feasible;

        let range = match analyzer.coverage(source) {
            Ok(c) => format!("{} to {}", c.first_date, c.last_date),
            Err(e) => e.to_string(),
        };
        table.add_row(vec![
            Cell::new(source),
            Cell::new(if feasible { "yes" } else { "no" }),
            Cell::new(range),
        ]);
    }

    println!("Window {window}:\n{table}");
    Ok(all_feasible)
}

fn handle_coverage(analyzer: &Analyzer) -> anyhow::Result<bool> {
    let listing = analyzer.coverage_all()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Instrument", "First date", "Last date", "Rows"]);

    for (instrument, coverage) in &listing {
        let row = match coverage {
            Ok(c) => vec![
                Cell::new(instrument),
                Cell::new(c.first_date),
                Cell::new(c.last_date),
                Cell::new(c.rows),
            ],
            Err(e) => vec![Cell::new(instrument), Cell::new(format!("unreadable: {e}"))],
        };
        table.add_row(row);
    }

    println!("{table}");
    Ok(true)
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stderr always, plus a daily log file when
/// `logging.directory` is configured. The returned guard flushes the file on drop.
fn init_tracing(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match &config.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pairwise.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
