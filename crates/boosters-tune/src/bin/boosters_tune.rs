//! Grid search over k-fold cross validation from the command line.
//!
//! Usage:
//!   boosters-tune --config job.toml --data train.csv --target y [options]
//!
//! Options:
//!   --out PATH        Write the results table to PATH (default: Markdown on stdout)
//!   --format FORMAT   csv, json or markdown (default: from the --out extension)
//!   --holdout F       Hold out a fraction F of the data and score the best combination on it
//!   --threads N       Combinations run in parallel (0 = all cores)
//!   --seed S          Override the job's [cv] seed
//!   -v, -vv, -vvv     More logging
//!
//! The job file is described in `boosters_tune::config`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use boosters_tune::CrossValidator;
use boosters_tune::config::TuneConfig;
use boosters_tune::data::load_csv;
use boosters_tune::training::Verbosity;
use boosters_tune::tune::{Progress, ResultsTable};

/// Hyperparameter grid search for gradient boosted trees
#[derive(Parser)]
#[command(name = "boosters-tune", version)]
struct Cli {
    /// Job file (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Training data (CSV with a header row)
    #[arg(short, long)]
    data: PathBuf,

    /// Name of the target column
    #[arg(short, long)]
    target: String,

    /// Output file for the results table
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output format; inferred from --out when omitted
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Fraction of samples held out before tuning
    #[arg(long)]
    holdout: Option<f32>,

    /// Worker threads for combinations (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for fold assignment and the holdout split
    #[arg(long)]
    seed: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
    Markdown,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "md" | "markdown" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("boosters_tune=info")),
        1 => EnvFilter::new("boosters_tune=debug"),
        _ => EnvFilter::new("debug"),
    };

    fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn write_table(table: &ResultsTable, out: Option<&Path>, format: Option<OutputFormat>) -> Result<()> {
    let format = format
        .or_else(|| out.and_then(OutputFormat::from_path))
        .unwrap_or(OutputFormat::Markdown);

    let mut writer: Box<dyn Write> = match out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Csv => table.write_csv(&mut writer)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &table.to_json())?;
            writeln!(writer)?;
        }
        OutputFormat::Markdown => writer.write_all(table.to_markdown().as_bytes())?,
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut job =
        TuneConfig::from_path(&cli.config).with_context(|| format!("loading job {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        job.cv.seed = seed;
    }
    if let Some(threads) = cli.threads {
        job.n_threads = threads;
    }

    let dataset =
        load_csv(&cli.data, &cli.target).with_context(|| format!("loading data {}", cli.data.display()))?;
    info!(
        samples = dataset.n_samples(),
        features = dataset.n_features(),
        "loaded training data"
    );

    let (train, holdout) = match cli.holdout {
        Some(fraction) => {
            let (train, holdout) = dataset.train_test_split(fraction, job.cv.seed)?;
            if holdout.is_empty() {
                bail!("--holdout {fraction} leaves no samples to hold out");
            }
            info!(train = train.n_samples(), holdout = holdout.n_samples(), "split off holdout");
            (train, Some(holdout))
        }
        None => (dataset, None),
    };

    let verbosity = Verbosity::from_count(cli.verbose.saturating_sub(1));
    let config = job.cv_config()?;
    let runner = job.runner(verbosity)?.with_progress(|p: Progress| {
        info!(
            completed = p.completed,
            total = p.total,
            "{:.0}% of combinations done",
            p.fraction() * 100.0
        );
    });

    let table = runner.run(&job.combinations(), &train, &config)?;
    write_table(&table, cli.out.as_deref(), cli.format)?;

    let Some(best) = table.best() else {
        warn!("no combination produced metrics");
        return Ok(());
    };
    let Some(row) = best.metrics else {
        return Ok(());
    };
    info!(
        params = %best.params,
        iteration = row.iteration,
        test_mean = row.test_mean,
        test_std = row.test_std,
        "best combination"
    );

    if let Some(holdout) = holdout {
        let validator = job.validator(verbosity)?;
        let params = config.base_params.merged_with(&best.params);
        let forest = validator.refit(&params, &train, row.iteration as u32, best.seed)?;
        let score = validator.score(&forest, &holdout);
        info!(
            metric = validator.metric_name(),
            score,
            trees = forest.n_trees(),
            "holdout score of the best combination"
        );
    }

    Ok(())
}
