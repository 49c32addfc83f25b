use tracing::info;

use crate::stage::Stage;

/// `current / total` as a percentage with two decimals. An empty total counts
/// as done.
pub fn percent(current: u64, total: u64) -> String {
    if total == 0 {
        return "100.00".to_string();
    }
    format!("{:.2}", current as f64 / total as f64 * 100.0)
}

/// Periodic progress logging for one stage.
///
/// Progress is counted in units that may span several rows (chat messages are
/// reported per finished group).
#[derive(Debug, Clone, Copy)]
pub struct ProgressReporter {
    stage: Stage,
    unit: &'static str,
    total: u64,
    interval: u64,
    rows_per_unit: u64,
}

impl ProgressReporter {
    pub fn new(stage: Stage, total_rows: u64, interval: u64) -> Self {
        Self {
            stage,
            unit: "rows",
            total: total_rows,
            interval,
            rows_per_unit: 1,
        }
    }

    /// Count progress in units of `rows_per_unit` rows each.
    pub fn per_unit(mut self, unit: &'static str, rows_per_unit: u64) -> Self {
        if rows_per_unit > 0 {
            self.total /= rows_per_unit;
            self.rows_per_unit = rows_per_unit;
            self.unit = unit;
        }
        self
    }

    /// Called after each written row. Returns whether progress was logged.
    pub fn row_written(&self, rows: u64) -> bool {
        rows % self.rows_per_unit == 0 && self.tick(rows / self.rows_per_unit)
    }

    pub fn tick(&self, current: u64) -> bool {
        if self.interval == 0 || current == 0 || current % self.interval != 0 {
            return false;
        }
        info!(
            stage = %self.stage,
            progress = %percent(current, self.total),
            current,
            total = self.total,
            unit = self.unit,
            "progress"
        );
        true
    }
}
