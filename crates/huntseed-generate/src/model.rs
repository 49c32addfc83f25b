use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huntseed_core::FixtureLayout;

use crate::stage::Stage;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Stages to run; always executed in pipeline order.
    pub stages: Vec<Stage>,
    /// Write `generation_report.json` next to the fixtures.
    pub write_report: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            stages: Stage::PIPELINE.to_vec(),
            write_report: true,
        }
    }
}

/// Summary of one written fixture file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub file: String,
    pub rows: u64,
    pub bytes: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub layout: FixtureLayout,
    pub stages: Vec<StageReport>,
    pub rows_total: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub throughput_bytes_per_sec: f64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, started_at: DateTime<Utc>, layout: FixtureLayout) -> Self {
        Self {
            run_id,
            seed,
            started_at,
            status: RunStatus::Running,
            error: None,
            layout,
            stages: Vec::new(),
            rows_total: 0,
            bytes_written: 0,
            duration_ms: 0,
            throughput_bytes_per_sec: 0.0,
        }
    }

    pub fn record_stage(&mut self, stage: StageReport) {
        self.rows_total += stage.rows;
        self.bytes_written += stage.bytes;
        self.stages.push(stage);
    }

    pub fn record_failure(&mut self, message: String) {
        self.status = RunStatus::Failed;
        self.error = Some(message);
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}
