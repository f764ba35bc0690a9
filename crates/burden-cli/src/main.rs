//! burden - evaluate competency questions over evidentiary cost/risk datasets
//!
//! Reads the cost, incident and objective datasets, requires a
//! rule-definitions file, and writes the CQ report plus its four supporting
//! artifacts.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burden_core::{EngineConfig, NumericPolicy, OutputPaths, RunPaths, RunSummary};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How the run summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Command-line arguments for burden
#[derive(Parser, Debug)]
#[command(name = "burden")]
#[command(about = "Evaluate competency questions over evidentiary cost/risk datasets")]
#[command(version)]
struct Args {
    /// Cost dataset
    #[arg(long, env = "BURDEN_COST")]
    cost: PathBuf,

    /// Incident dataset
    #[arg(long, env = "BURDEN_INCIDENTS")]
    incidents: PathBuf,

    /// Objective-weight dataset
    #[arg(long, env = "BURDEN_OBJECTIVES")]
    objectives: PathBuf,

    /// Rule-definitions file (required to exist)
    #[arg(long, env = "BURDEN_RULES")]
    rules: PathBuf,

    /// Directory for any output not given explicitly
    #[arg(long, env = "BURDEN_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// CQ report output
    #[arg(long)]
    cq_out: Option<PathBuf>,

    /// VOI ranking output
    #[arg(long)]
    voi_out: Option<PathBuf>,

    /// Sensitivity table output
    #[arg(long)]
    sensitivity_out: Option<PathBuf>,

    /// Objective comparison output
    #[arg(long)]
    objective_out: Option<PathBuf>,

    /// Consistency report output
    #[arg(long)]
    consistency_out: Option<PathBuf>,

    /// Engine configuration (YAML)
    #[arg(short, long, env = "BURDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Exclude malformed numeric values instead of coercing them to 0.0
    #[arg(long)]
    strict_numeric: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn output_paths(&self) -> Result<OutputPaths> {
        let defaults = self.out_dir.as_ref().map(OutputPaths::in_dir);
        let fallback =
            |pick: fn(&OutputPaths) -> &PathBuf| defaults.as_ref().map(|o| pick(o).clone());

        Ok(OutputPaths {
            cq: resolve(&self.cq_out, fallback(|o| &o.cq), "--cq-out")?,
            voi: resolve(&self.voi_out, fallback(|o| &o.voi), "--voi-out")?,
            sensitivity: resolve(
                &self.sensitivity_out,
                fallback(|o| &o.sensitivity),
                "--sensitivity-out",
            )?,
            objectives: resolve(
                &self.objective_out,
                fallback(|o| &o.objectives),
                "--objective-out",
            )?,
            consistency: resolve(
                &self.consistency_out,
                fallback(|o| &o.consistency),
                "--consistency-out",
            )?,
        })
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        let config = match &self.config {
            Some(path) => EngineConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };

        if self.strict_numeric {
            Ok(config.with_numeric_policy(NumericPolicy::Exclude))
        } else {
            Ok(config)
        }
    }
}

fn resolve(explicit: &Option<PathBuf>, fallback: Option<PathBuf>, flag: &str) -> Result<PathBuf> {
    match explicit.clone().or(fallback) {
        Some(path) => Ok(path),
        None => bail!("No output path for {}: pass {} or --out-dir", flag, flag),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "burden=debug,burden_core=debug"
    } else {
        "burden=info,burden_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let paths = RunPaths {
        cost: args.cost.clone(),
        incidents: args.incidents.clone(),
        objectives: args.objectives.clone(),
        rules: args.rules.clone(),
        outputs: args.output_paths()?,
    };
    let config = args.engine_config()?;

    info!(
        rules = %paths.rules.display(),
        policy = ?config.numeric_policy,
        "Starting evaluation"
    );

    let summary = burden_core::run(&paths, &config).context("Evaluation failed")?;

    match args.format {
        Format::Text => print_text(&summary),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
        ),
    }

    Ok(())
}

fn print_text(summary: &RunSummary) {
    println!("CQ: {}/{} pass", summary.cq_passed, summary.cq_total);
    println!(
        "Rows: cost={} incidents={} objectives={} (malformed numerics: {})",
        summary.stats.cost_rows,
        summary.stats.incident_rows,
        summary.stats.objective_rows,
        summary.stats.malformed_numeric_fields
    );
    println!(
        "VOI cells: {}  valid objectives: {}  rule violations: {}",
        summary.voi_cells, summary.valid_objectives, summary.rule_violations
    );
    for path in summary.outputs.all() {
        println!("Wrote {}", path.display());
    }
}
