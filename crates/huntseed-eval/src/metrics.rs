use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report contract version for fixture verification.
pub const REPORT_VERSION: &str = "0.1";

/// Machine-readable summary of a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub report_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Upper bound for every generated timestamp in the past.
    pub reference_time: DateTime<Utc>,
    pub files: Vec<FileMetrics>,
    pub checks: BTreeMap<String, CheckStats>,
    pub violations_total: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningItem>,
    pub performance: PerformanceMetrics,
}

impl VerificationReport {
    pub fn check(&self, name: &str) -> Option<&CheckStats> {
        self.checks.get(name)
    }
}

/// Per-file row counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub file: String,
    pub present: bool,
    pub rows_found: u64,
    pub rows_expected: u64,
}

/// Counter for one named check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStats {
    pub checked: u64,
    pub violations: u64,
}

/// Structured warning entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningItem {
    pub code: String,
    pub file: String,
    pub message: String,
}

/// Timings for the verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub scan_ms: u128,
    pub total_ms: u128,
}
