mod config;
mod logging;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use huntseed_core::{FixtureLayout, SeedConfig};
use huntseed_eval::{EvalError, VerifyEngine, VerifyOptions};
use huntseed_generate::{GenerateOptions, GenerationEngine, GenerationError, RunClock, Stage};
use thiserror::Error;

use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("layout error: {0}")]
    Layout(#[from] huntseed_core::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("verification error: {0}")]
    Verification(#[from] EvalError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "huntseed", version, about = "Deterministic fixture generator")]
struct Cli {
    /// Append JSON log lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write fixture files.
    Generate(GenerateArgs),
    /// Check a fixture directory against its layout.
    Verify(VerifyArgs),
    /// Print the resolved layout and expected row counts.
    Layout(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// TOML configuration file.
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,
    /// Fixture directory (overrides the config file and HUNTSEED_OUTPUT_DIR).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Seed for cosmetic values.
    #[arg(long)]
    seed: Option<u64>,
}

impl ConfigArgs {
    fn load(&self) -> Result<SeedConfig, CliError> {
        let mut config = config::load(self.config.as_deref())?;
        if let Some(dir) = &self.out_dir {
            config.output.dir = dir.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Progress interval for every stage, replacing per-stage settings.
    #[arg(long)]
    log_interval: Option<u64>,
    /// Only run these stages (comma separated); pipeline order is kept.
    #[arg(long, value_delimiter = ',', value_name = "STAGE")]
    only: Vec<Stage>,
    /// Skip generation_report.json.
    #[arg(long, default_value_t = false)]
    no_report: bool,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Directory for the verification reports (defaults to the fixture dir).
    #[arg(long)]
    report_dir: Option<PathBuf>,
    /// Report violations without failing.
    #[arg(long, default_value_t = false)]
    lenient: bool,
    /// Also write violations.json.
    #[arg(long, default_value_t = false)]
    write_violations: bool,
    /// Violations listed in the markdown report.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Verify(args) => run_verify(args),
        Command::Layout(args) => run_layout(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut config = args.config.load()?;
    if let Some(interval) = args.log_interval {
        config.output.log_interval = interval;
        config.output.log_intervals.clear();
    }
    let options = GenerateOptions {
        stages: if args.only.is_empty() {
            Stage::PIPELINE.to_vec()
        } else {
            args.only
        },
        write_report: !args.no_report,
    };

    let result = GenerationEngine::new(config, options).run(RunClock::start())?;
    println!("out_dir={}", result.out_dir.display());
    println!("rows={}", result.report.rows_total);
    println!("bytes={}", result.report.bytes_written);
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), CliError> {
    let config = args.config.load()?;
    let layout = FixtureLayout::resolve(&config.scale)?;
    let options = VerifyOptions {
        strict: !args.lenient,
        max_examples: args.max_examples,
        write_violations: args.write_violations,
        out_dir: args.report_dir,
        ..VerifyOptions::default()
    };

    tracing::info!(dir = %config.output.dir.display(), "verification started");
    let result = VerifyEngine::new(options).run(&layout, &config.output.dir)?;
    tracing::info!(
        violations = result.metrics.violations_total,
        warnings = result.metrics.warnings.len(),
        report = %result.report_path.display(),
        "verification finished"
    );
    println!("violations={}", result.metrics.violations_total);
    println!("report_path={}", result.report_path.display());
    Ok(())
}

fn run_layout(args: ConfigArgs) -> Result<(), CliError> {
    let config = args.load()?;
    let layout = FixtureLayout::resolve(&config.scale)?;
    let rows: BTreeMap<&str, u64> = Stage::PIPELINE
        .iter()
        .map(|stage| (stage.file_name(), stage.expected_rows(&layout)))
        .collect();
    let summary = serde_json::json!({
        "layout": layout,
        "rows": rows,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
