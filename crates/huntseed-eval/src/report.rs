use crate::metrics::VerificationReport;
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(
    metrics: &VerificationReport,
    violations: &[Violation],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Huntseed Fixture Verification".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!(
        "- run_id: {}",
        metrics.run_id.as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "- seed: {}",
        metrics
            .seed
            .map(|seed| seed.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!(
        "- reference_time: {}",
        metrics.reference_time.to_rfc3339()
    ));
    lines.push(format!("- violations: {}", metrics.violations_total));
    lines.push(String::new());

    lines.push("## Files and row counts".to_string());
    lines.push("| file | rows_expected | rows_found |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for file in &metrics.files {
        let found = if file.present {
            file.rows_found.to_string()
        } else {
            "missing".to_string()
        };
        lines.push(format!(
            "| {} | {} | {} |",
            file.file, file.rows_expected, found
        ));
    }
    lines.push(String::new());

    lines.push("## Check summary".to_string());
    lines.push("| check | checked | violations |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for (name, stats) in &metrics.checks {
        lines.push(format!(
            "| {} | {} | {} |",
            name, stats.checked, stats.violations
        ));
    }
    lines.push(String::new());

    if !metrics.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in &metrics.warnings {
            lines.push(format!(
                "- {} ({}): {}",
                warning.file, warning.code, warning.message
            ));
        }
        lines.push(String::new());
    }

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            let row = violation
                .row_index
                .map(|row| format!(" row {row}"))
                .unwrap_or_default();
            lines.push(format!(
                "- {}{} [{}]: {}",
                violation.file, row, violation.code, violation.message
            ));
        }
        if metrics.violations_total > violations.len().min(max_examples) as u64 {
            lines.push(format!(
                "- ... {} more",
                metrics.violations_total - violations.len().min(max_examples) as u64
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics));
    lines.join("\n")
}

fn recommendations(metrics: &VerificationReport) -> Vec<String> {
    let mut lines = Vec::new();
    let failing = |name: &str| metrics.check(name).is_some_and(|stats| stats.violations > 0);

    if metrics.files.iter().any(|file| !file.present) {
        lines.push("- regenerate the missing stages with `huntseed generate --only`.".to_string());
    }
    if failing("row_count") {
        lines.push(
            "- verify against the same scale the fixtures were generated with.".to_string(),
        );
    }
    if failing("chat_past") || failing("session_expiration") {
        lines.push(
            "- keep generation_report.json next to the fixtures so timestamps are checked \
             against the run clock."
                .to_string(),
        );
    }
    if metrics.violations_total == 0 {
        lines.push("- no violations detected; fixtures are ready to load.".to_string());
    } else {
        lines.push("- fixtures were edited or truncated after generation; regenerate them.".to_string());
    }
    lines
}
