use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use huntseed_core::{FixtureLayout, ScaleConfig, SeedConfig, Secret, TaskSplit};
use huntseed_eval::engine::{REPORT_JSON, REPORT_MARKDOWN, VIOLATIONS_JSON};
use huntseed_eval::{EvalError, VerificationReport, VerifyEngine, VerifyOptions};
use huntseed_generate::{GenerateOptions, GenerationEngine, RunClock};

fn scale() -> ScaleConfig {
    ScaleConfig {
        total_users: 5,
        total_groups: 1,
        members_per_group: 5,
        completed_challenges_per_member: 1,
        ongoing_challenges_per_member: 1,
        tasks_per_challenge: 3,
        completed_tasks: TaskSplit {
            successful: 1,
            failed: 1,
            in_progress: 0,
        },
        ongoing_tasks: TaskSplit {
            successful: 1,
            failed: 1,
            in_progress: 1,
        },
        messages_per_group: 4,
        message_interval_secs: 30,
    }
}

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("huntseed_eval_{label}_{}", uuid::Uuid::new_v4()))
}

fn generate(dir: &Path) -> FixtureLayout {
    let mut config = SeedConfig::default();
    config.seed = 11;
    config.scale = scale();
    config.output.dir = dir.to_path_buf();
    config.auth.jwt_secret = Some(Secret::new("verify-secret"));
    let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-03-20T10:15:30Z")
        .expect("timestamp")
        .with_timezone(&Utc);

    GenerationEngine::new(config, GenerateOptions::default())
        .run(RunClock::fixed(now))
        .expect("generate");
    FixtureLayout::resolve(&scale()).expect("layout")
}

fn lenient() -> VerifyOptions {
    VerifyOptions {
        strict: false,
        write_violations: true,
        ..VerifyOptions::default()
    }
}

#[test]
fn fresh_fixtures_verify_clean() {
    let dir = temp_dir("clean");
    let layout = generate(&dir);

    let result = VerifyEngine::new(VerifyOptions::default())
        .run(&layout, &dir)
        .expect("verify");

    assert_eq!(result.metrics.violations_total, 0);
    assert_eq!(result.metrics.seed, Some(11));
    assert!(result.metrics.warnings.is_empty());
    assert!(result.metrics.files.iter().all(|file| file.present
        && file.rows_found == file.rows_expected));
    assert_eq!(result.metrics.check("hunting_hunter").map(|c| c.checked), Some(5));
    assert_eq!(result.metrics.check("chat_order").map(|c| c.checked), Some(4));
    assert!(result.violations_path.is_none());

    let metrics: VerificationReport =
        serde_json::from_slice(&std::fs::read(dir.join(REPORT_JSON)).expect("read"))
            .expect("metrics json");
    assert_eq!(metrics.violations_total, 0);
    let report = std::fs::read_to_string(dir.join(REPORT_MARKDOWN)).expect("report");
    assert!(report.contains("| huntings.csv | 5 | 5 |"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn hunter_replaced_by_owner_is_flagged() {
    let dir = temp_dir("tampered");
    let layout = generate(&dir);

    let path = dir.join("huntings.csv");
    let contents = std::fs::read_to_string(&path).expect("read huntings");
    let mut lines = contents.lines().map(str::to_string).collect::<Vec<_>>();
    let fields = lines[1].splitn(4, ',').map(str::to_string).collect::<Vec<_>>();
    let task_id: u64 = fields[1].parse().expect("task id");
    let (challenge_id, _) = layout.tasks.locate(task_id).expect("task");
    let owner = layout.challenges.owner_of(challenge_id).expect("owner");
    lines[1] = format!("{},{},{},{}", fields[0], fields[1], owner, fields[3]);
    std::fs::write(&path, format!("{}\n", lines.join("\n"))).expect("write huntings");

    let result = VerifyEngine::new(lenient())
        .run(&layout, &dir)
        .expect("verify");

    assert_eq!(result.metrics.violations_total, 1);
    assert_eq!(result.violations[0].code, "hunting_hunter");
    assert_eq!(result.violations[0].file, "huntings.csv");
    assert_eq!(result.violations[0].row_index, Some(1));
    assert!(dir.join(VIOLATIONS_JSON).exists());

    let strict = VerifyEngine::new(VerifyOptions::default()).run(&layout, &dir);
    assert!(matches!(strict, Err(EvalError::Violations(1))));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn repeated_hunted_task_is_flagged() {
    let dir = temp_dir("repeated");
    let layout = generate(&dir);

    let path = dir.join("huntings.csv");
    let contents = std::fs::read_to_string(&path).expect("read huntings");
    let mut lines = contents.lines().map(str::to_string).collect::<Vec<_>>();
    let first_task = lines[1].split(',').nth(1).expect("task id").to_string();
    let fields = lines[2].splitn(3, ',').map(str::to_string).collect::<Vec<_>>();
    lines[2] = format!("{},{},{}", fields[0], first_task, fields[2]);
    std::fs::write(&path, format!("{}\n", lines.join("\n"))).expect("write huntings");

    let result = VerifyEngine::new(lenient())
        .run(&layout, &dir)
        .expect("verify");

    assert_eq!(result.metrics.violations_total, 1);
    assert_eq!(result.violations[0].code, "hunting_order");
    assert_eq!(result.violations[0].row_index, Some(2));
    assert_eq!(
        result.metrics.check("hunting_order").map(|c| c.checked),
        Some(5)
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn truncated_and_missing_files_are_reported() {
    let dir = temp_dir("truncated");
    let layout = generate(&dir);

    let path = dir.join("users.csv");
    let contents = std::fs::read_to_string(&path).expect("read users");
    let kept = contents.lines().take(3).collect::<Vec<_>>().join("\n");
    std::fs::write(&path, format!("{kept}\n")).expect("write users");
    std::fs::remove_file(dir.join("bots.csv")).expect("remove bots");

    let result = VerifyEngine::new(lenient())
        .run(&layout, &dir)
        .expect("verify");

    let row_count = result.metrics.check("row_count").expect("row_count");
    assert_eq!(row_count.violations, 1);
    assert!(result
        .metrics
        .warnings
        .iter()
        .any(|warning| warning.code == "missing_file" && warning.file == "bots.csv"));
    let bots = result
        .metrics
        .files
        .iter()
        .find(|file| file.file == "bots.csv")
        .expect("bots entry");
    assert!(!bots.present);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_directory_is_invalid() {
    let layout = FixtureLayout::resolve(&scale()).expect("layout");
    let result = VerifyEngine::new(VerifyOptions::default()).run(&layout, &temp_dir("absent"));
    assert!(matches!(result, Err(EvalError::InvalidDataset(_))));
}
