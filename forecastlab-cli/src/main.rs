//! ForecastLab CLI: feature preview, dataset export, backtest and comparison commands.
//!
//! Commands:
//! - `features`: load bars, build feature rows and print the most recent ones
//! - `dataset`: write normalized training/validation sets for an external trainer
//! - `backtest`: run one prediction-driven backtest over the test range
//! - `compare`: replay one prediction pass under every strategy

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forecastlab_core::domain::FEATURE_NAMES;
use forecastlab_core::model::Predictor;
use forecastlab_runner::{
    compare_strategies, load_bars, make_dataset, prepare_features, preview, run_backtest,
    save_artifacts, write_training_set, BacktestReport, PersistencePredictor, PipelineConfig,
    PredictionTable, TrendPredictor,
};

#[derive(Parser)]
#[command(
    name = "forecastlab",
    about = "ForecastLab CLI: indicator features, model datasets and prediction backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build feature rows and print the most recent ones with full-range stats.
    Features {
        /// Bar file (.json payload, .csv or .parquet).
        bars: PathBuf,

        /// Number of recent rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Write normalized training and validation sets as JSON.
    Dataset {
        bars: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output directory for train.json and validation.json.
        #[arg(long, default_value = "datasets")]
        output_dir: PathBuf,
    },
    /// Run a prediction-driven backtest over the test range.
    Backtest {
        bars: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Output directory for report.json, trades.csv and predictions.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Compare all three strategies on one prediction pass.
    Compare {
        bars: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Save artifacts for every strategy under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

/// Config file plus per-field overrides.
#[derive(Args)]
struct PipelineArgs {
    /// Path to a TOML pipeline config. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window length.
    #[arg(long)]
    recurrence: Option<usize>,

    /// Signal rule: 1 conservative, 2 momentum, 3 classic.
    #[arg(long)]
    strategy: Option<u8>,

    #[arg(long)]
    start_cash: Option<f64>,
}

impl PipelineArgs {
    fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(recurrence) = self.recurrence {
            config.recurrence = recurrence;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(start_cash) = self.start_cash {
            config.start_cash = start_cash;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PredictorKind {
    /// Next close equals the last close.
    Persistence,
    /// Linear extrapolation of the last closes.
    Trend,
    /// Precomputed model outputs from --table.
    Table,
}

#[derive(Args)]
struct ModelArgs {
    #[arg(long, value_enum, default_value_t = PredictorKind::Persistence)]
    predictor: PredictorKind,

    /// Closes used by the trend predictor.
    #[arg(long, default_value_t = 5)]
    lookback: usize,

    /// CSV of `date,prediction` normalized outputs keyed by window end date.
    #[arg(long)]
    table: Option<PathBuf>,
}

impl ModelArgs {
    fn build(&self) -> Result<Box<dyn Predictor>> {
        let predictor: Box<dyn Predictor> = match self.predictor {
            PredictorKind::Persistence => Box::new(PersistencePredictor),
            PredictorKind::Trend => Box::new(TrendPredictor::new(self.lookback)),
            PredictorKind::Table => {
                let Some(path) = &self.table else {
                    bail!("--predictor table requires --table <csv>");
                };
                let table = PredictionTable::from_csv(path)
                    .with_context(|| format!("failed to load prediction table {}", path.display()))?;
                Box::new(table)
            }
        };
        Ok(predictor)
    }
}

/// Filter used when `RUST_LOG` is unset or empty.
const DEFAULT_LOG_DIRECTIVE: &str = "forecastlab=info";

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::new(DEFAULT_LOG_DIRECTIVE),
    }
}

fn main() -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Features { bars, rows } => run_features(&bars, rows),
        Commands::Dataset {
            bars,
            pipeline,
            output_dir,
        } => run_dataset(&bars, &pipeline, &output_dir),
        Commands::Backtest {
            bars,
            pipeline,
            model,
            output_dir,
        } => run_backtest_cmd(&bars, &pipeline, &model, &output_dir),
        Commands::Compare {
            bars,
            pipeline,
            model,
            output_dir,
        } => run_compare(&bars, &pipeline, &model, output_dir.as_deref()),
    }
}

fn run_features(path: &Path, count: usize) -> Result<()> {
    let data = load_bars(path)?;
    let rows = prepare_features(&data)?;
    let summary = preview(&rows)?;

    println!(
        "{}: {} bars → {} feature rows ({} to {})",
        data.symbol,
        data.bars.len(),
        summary.row_count,
        summary.first_date,
        summary.last_date
    );
    println!("dataset hash: {}", data.dataset_hash);
    println!();

    print!("{:<12}", "date");
    for name in FEATURE_NAMES {
        print!(" {name:>12}");
    }
    println!();
    for row in rows.iter().rev().take(count) {
        print!("{:<12}", row.date.to_string());
        for v in row.values.values() {
            print!(" {v:>12.4}");
        }
        println!();
    }

    println!();
    println!("{:<10} {:>12} {:>12} {:>12} {:>12}", "feature", "min", "max", "mean", "std");
    for (name, s) in FEATURE_NAMES.iter().zip(&summary.stats) {
        println!(
            "{:<10} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            name, s.min, s.max, s.mean, s.std
        );
    }
    Ok(())
}

fn run_dataset(path: &Path, args: &PipelineArgs, output_dir: &Path) -> Result<()> {
    let config = args.resolve()?;
    let data = load_bars(path)?;
    let rows = prepare_features(&data)?;

    let splits = [
        ("train", config.splits.train_range()),
        ("validation", config.splits.validation_range()),
    ];
    for (name, range) in splits {
        let set = make_dataset(&rows, range, config.recurrence)
            .with_context(|| format!("failed to build {name} set"))?;
        let out = output_dir.join(format!("{name}.json"));
        write_training_set(&set, &out)?;
        let batches = set
            .batches(config.training.batch_size, config.training.shuffle_seed)
            .len();
        println!(
            "{name:<10} {} pairs in {batches} batches of {} → {}",
            set.len(),
            config.training.batch_size,
            out.display()
        );
    }
    println!(
        "train for {} epochs, batch order seed {}",
        config.training.epochs, config.training.shuffle_seed
    );
    Ok(())
}

fn run_backtest_cmd(
    path: &Path,
    args: &PipelineArgs,
    model: &ModelArgs,
    output_dir: &Path,
) -> Result<()> {
    let config = args.resolve()?;
    let predictor = model.build()?;
    let data = load_bars(path)?;

    let report = run_backtest(&config, &data, predictor.as_ref())?;
    print_summary(&report);

    let run_dir = save_artifacts(&report, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_compare(
    path: &Path,
    args: &PipelineArgs,
    model: &ModelArgs,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = args.resolve()?;
    let predictor = model.build()?;
    let data = load_bars(path)?;

    let comparison = compare_strategies(&config, &data, predictor.as_ref())?;

    println!(
        "{} | predictor {} | recurrence {} | {} windows",
        data.symbol,
        predictor.name(),
        config.recurrence,
        comparison.reports.first().map_or(0, |r| r.window_count)
    );
    println!("{:<20} {:>8} {:>12} {:>10}", "strategy", "trades", "end cash", "return");
    for report in comparison.ranked() {
        println!(
            "{:<20} {:>8} {:>12.2} {:>9.2}%",
            report.strategy.to_string(),
            report.trades.len(),
            report.end_cash,
            report.total_return * 100.0
        );
    }

    if let Some(dir) = output_dir {
        for report in &comparison.reports {
            let run_dir = save_artifacts(report, dir)?;
            println!("{} → {}", report.strategy, run_dir.display());
        }
    }
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    println!("=== Backtest Summary ===");
    println!("Symbol:       {}", report.symbol);
    println!("Strategy:     {}", report.strategy);
    println!("Predictor:    {}", report.predictor);
    println!("Test range:   {} to {}", report.test_start, report.test_end);
    println!("Windows:      {} (recurrence {})", report.window_count, report.recurrence);
    println!("Start cash:   ${:.2}", report.start_cash);
    println!("End cash:     ${:.2}", report.end_cash);
    println!("Return:       {:.2}%", report.total_return * 100.0);
    println!("Trades:       {}", report.trades.len());
    for trade in &report.trades {
        println!("  {} {:<4} {}", trade.timestamp, trade.kind.as_str(), trade.label);
    }
    if let Some(signal) = report.final_signal {
        println!("Final signal: {signal}");
    }
    println!("Run ID:       {}", report.run_id);
}
