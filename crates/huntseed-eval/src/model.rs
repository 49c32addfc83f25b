use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metrics::VerificationReport;

/// Options for fixture verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// Fail when any violation is found.
    pub strict: bool,
    /// Limit the number of examples listed in the markdown report.
    pub max_examples: usize,
    /// Violations kept in memory; counts stay exact past the cap.
    pub max_violations: usize,
    /// Emit violations.json with the kept violations.
    pub write_violations: bool,
    /// Optional output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            strict: true,
            max_examples: 20,
            max_violations: 10_000,
            write_violations: false,
            out_dir: None,
        }
    }
}

/// Structured violation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub file: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u64>,
}

/// Result of a verification run.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub out_dir: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub metrics: VerificationReport,
    pub report: String,
    pub violations: Vec<Violation>,
}
