use std::any::Any;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use huntseed_core::{FixtureLayout, SeedConfig};

use crate::clock::RunClock;
use crate::errors::GenerationError;
use crate::faker_rs::FakeRsFaker;
use crate::generators::{
    BotGenerator, ChallengeGenerator, ChatMessageGenerator, GenerationContext, GroupGenerator,
    HuntingGenerator, MembershipGenerator, SessionGenerator, TaskGenerator, UserGenerator,
};
use crate::model::{GenerateOptions, GenerationReport, RunStatus, StageReport};
use crate::output::csv::{TabularRecord, encode_row, header_line};
use crate::output::ndjson::encode_line;
use crate::progress::ProgressReporter;
use crate::sink::{SinkSummary, with_sink};
use crate::stage::Stage;
use crate::token::SessionTokenMinter;

pub const REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
}

/// Runs the fixture pipeline for one resolved configuration.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    config: SeedConfig,
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(config: SeedConfig, options: GenerateOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Validate the layout and credentials, then write every selected stage.
    ///
    /// Configuration errors are returned before the output directory is
    /// touched.
    pub fn run(&self, clock: RunClock) -> Result<GenerationResult, GenerationError> {
        let stages = Stage::ordered(&self.options.stages);
        if stages.is_empty() {
            return Err(GenerationError::InvalidOptions(
                "no stages selected".to_string(),
            ));
        }
        let layout = FixtureLayout::resolve(&self.config.scale)?;
        if stages.contains(&Stage::ChatMessages) {
            check_chat_window(&layout, &clock)?;
        }
        let minter = if stages.contains(&Stage::UserSessions) {
            Some(self.minter()?)
        } else {
            None
        };

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let out_dir = self.config.output.dir.clone();
        let ctx = GenerationContext::new(layout, self.config.amounts, clock);
        let mut report = GenerationReport::new(run_id.clone(), self.config.seed, clock.now(), layout);

        info!(
            run_id = %run_id,
            seed = self.config.seed,
            stages = stages.len(),
            out_dir = %out_dir.display(),
            "generation started"
        );

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
            || -> Result<(), GenerationError> {
                for stage in &stages {
                    let stage = *stage;
                    let stage_start = Instant::now();
                    info!(
                        stage = %stage,
                        rows = stage.expected_rows(&layout),
                        file = stage.file_name(),
                        "generating stage"
                    );

                    let (rows, summary) =
                        self.run_stage(stage, &ctx, minter.as_ref(), &out_dir)?;
                    let duration_ms = stage_start.elapsed().as_millis() as u64;
                    report.record_stage(StageReport {
                        stage,
                        file: stage.file_name().to_string(),
                        rows,
                        bytes: summary.bytes,
                        duration_ms,
                    });

                    info!(
                        stage = %stage,
                        rows,
                        bytes = summary.bytes,
                        duration_ms,
                        "stage generated"
                    );
                }
                Ok(())
            },
        ));

        let elapsed = start.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        report.throughput_bytes_per_sec = if elapsed.as_secs_f64() > 0.0 {
            report.bytes_written as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        match outcome {
            Ok(Ok(())) => {
                report.status = RunStatus::Completed;
                self.write_report(&out_dir, &report)?;
                info!(
                    run_id = %run_id,
                    stages = report.stages.len(),
                    rows = report.rows_total,
                    bytes_written = report.bytes_written,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(GenerationResult { out_dir, report })
            }
            Ok(Err(err)) => {
                report.record_failure(err.to_string());
                self.write_report(&out_dir, &report)?;
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
            Err(panic) => {
                report.record_failure(panic_message(panic));
                self.write_report(&out_dir, &report)?;
                warn!(run_id = %run_id, "generation panicked");
                Err(GenerationError::Failed(Box::new(report)))
            }
        }
    }

    fn minter(&self) -> Result<SessionTokenMinter, GenerationError> {
        let secret = self.config.auth.jwt_secret.as_ref().ok_or_else(|| {
            GenerationError::InvalidOptions(
                "user_sessions needs a jwt secret (auth.jwt_secret or HUNTSEED_JWT_SECRET)"
                    .to_string(),
            )
        })?;
        SessionTokenMinter::new(secret)
    }

    fn run_stage(
        &self,
        stage: Stage,
        ctx: &GenerationContext,
        minter: Option<&SessionTokenMinter>,
        dir: &Path,
    ) -> Result<(u64, SinkSummary), GenerationError> {
        let seed = self.config.seed;
        let faker = || FakeRsFaker::for_stage(seed, stage);
        let expected = stage.expected_rows(&ctx.layout);
        let progress =
            ProgressReporter::new(stage, expected, self.config.output.interval_for(stage.name()));

        match stage {
            Stage::Users => write_csv(dir, stage, expected, UserGenerator::new(ctx, faker()), progress),
            Stage::Groups => {
                write_csv(dir, stage, expected, GroupGenerator::new(ctx, faker()), progress)
            }
            Stage::GroupMembers => {
                write_csv(dir, stage, expected, MembershipGenerator::new(ctx), progress)
            }
            Stage::Challenges => write_csv(
                dir,
                stage,
                expected,
                ChallengeGenerator::new(ctx, faker()),
                progress,
            ),
            Stage::Tasks => {
                write_csv(dir, stage, expected, TaskGenerator::new(ctx, faker()), progress)
            }
            Stage::Huntings => write_csv(dir, stage, expected, HuntingGenerator::new(ctx), progress),
            Stage::Bots => write_csv(dir, stage, expected, BotGenerator::new(ctx), progress),
            Stage::ChatMessages => {
                let progress =
                    progress.per_unit("groups", ctx.layout.chat.messages_per_group);
                write_ndjson(
                    dir,
                    stage,
                    expected,
                    ChatMessageGenerator::new(ctx, faker()),
                    progress,
                )
            }
            Stage::UserSessions => {
                let minter = minter.ok_or_else(|| {
                    GenerationError::InvalidOptions("session token minter missing".to_string())
                })?;
                write_csv(
                    dir,
                    stage,
                    expected,
                    SessionGenerator::new(ctx, minter, faker()),
                    progress,
                )
            }
        }
    }

    fn write_report(&self, dir: &Path, report: &GenerationReport) -> Result<(), GenerationError> {
        if !self.options.write_report {
            return Ok(());
        }
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(REPORT_FILE), serde_json::to_vec_pretty(report)?)?;
        Ok(())
    }
}

fn write_csv<R, I>(
    dir: &Path,
    stage: Stage,
    expected: u64,
    records: I,
    progress: ProgressReporter,
) -> Result<(u64, SinkSummary), GenerationError>
where
    R: TabularRecord,
    I: Iterator<Item = Result<R, GenerationError>>,
{
    with_sink(dir, stage.file_name(), |sink| {
        sink.write_line(&header_line(R::HEADER))?;
        let mut line = String::new();
        let mut rows = 0_u64;
        for record in records {
            let index = rows + 1;
            let record = record.map_err(|err| GenerationError::at(stage, index, err))?;
            line.clear();
            encode_row(&record.fields(), &mut line);
            sink.write_line(&line)
                .map_err(|err| GenerationError::at(stage, index, err))?;
            rows = index;
            progress.row_written(rows);
        }
        check_rows(stage, expected, rows)
    })
}

fn write_ndjson<R, I>(
    dir: &Path,
    stage: Stage,
    expected: u64,
    records: I,
    progress: ProgressReporter,
) -> Result<(u64, SinkSummary), GenerationError>
where
    R: serde::Serialize,
    I: Iterator<Item = Result<R, GenerationError>>,
{
    with_sink(dir, stage.file_name(), |sink| {
        let mut rows = 0_u64;
        for record in records {
            let index = rows + 1;
            let line = record
                .and_then(|record| encode_line(&record))
                .map_err(|err| GenerationError::at(stage, index, err))?;
            sink.write_line(&line)
                .map_err(|err| GenerationError::at(stage, index, err))?;
            rows = index;
            progress.row_written(rows);
        }
        check_rows(stage, expected, rows)
    })
}

/// The oldest chat message must be representable relative to the run clock.
fn check_chat_window(layout: &FixtureLayout, clock: &RunClock) -> Result<(), GenerationError> {
    let span = layout.chat.history_span_secs();
    if clock.seconds_before(span).is_none() {
        return Err(huntseed_core::Error::InvalidConfig(format!(
            "chat history of {span}s reaches before the earliest representable timestamp"
        ))
        .into());
    }
    Ok(())
}

fn check_rows(stage: Stage, expected: u64, actual: u64) -> Result<u64, GenerationError> {
    if actual == expected {
        Ok(actual)
    } else {
        Err(GenerationError::RowCount {
            stage,
            expected,
            actual,
        })
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during generation".to_string()
    }
}
