mod common;

use std::collections::BTreeMap;
use std::path::Path;

use huntseed_core::Error as LayoutError;
use huntseed_generate::{GenerateOptions, GenerationEngine, GenerationError, Stage};

use common::{config, fixed_clock, hash_file, single_group_scale, small_scale, temp_out_dir};

fn fixture_hashes(dir: &Path) -> BTreeMap<&'static str, String> {
    Stage::PIPELINE
        .iter()
        .map(|stage| {
            let path = dir.join(stage.file_name());
            (stage.file_name(), hash_file(&path).expect("hash fixture"))
        })
        .collect()
}

#[test]
fn reruns_replace_stale_files_byte_for_byte() {
    let out_dir = temp_out_dir("golden");
    let engine = GenerationEngine::new(config(&out_dir, small_scale()), GenerateOptions::default());

    engine.run(fixed_clock()).expect("first run");
    let first = fixture_hashes(&out_dir);

    std::fs::write(out_dir.join("users.csv"), "stale,data\n").expect("stale users");
    std::fs::write(out_dir.join("chatMessages.json"), "{}\n").expect("stale chat");

    engine.run(fixed_clock()).expect("second run");
    let second = fixture_hashes(&out_dir);

    assert_eq!(first, second);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn single_stage_matches_full_run() {
    let full_dir = temp_out_dir("golden_full");
    GenerationEngine::new(config(&full_dir, small_scale()), GenerateOptions::default())
        .run(fixed_clock())
        .expect("full run");

    let subset_dir = temp_out_dir("golden_subset");
    let options = GenerateOptions {
        stages: vec![Stage::Tasks, Stage::UserSessions],
        write_report: false,
    };
    let result = GenerationEngine::new(config(&subset_dir, small_scale()), options)
        .run(fixed_clock())
        .expect("subset run");

    assert_eq!(result.report.stages.len(), 2);
    for stage in [Stage::Tasks, Stage::UserSessions] {
        assert_eq!(
            hash_file(&full_dir.join(stage.file_name())).expect("full hash"),
            hash_file(&subset_dir.join(stage.file_name())).expect("subset hash"),
            "{stage} differs between full and subset runs"
        );
    }
    assert!(!subset_dir.join("users.csv").exists());
    assert!(!subset_dir.join("generation_report.json").exists());

    let _ = std::fs::remove_dir_all(full_dir);
    let _ = std::fs::remove_dir_all(subset_dir);
}

#[test]
fn different_seeds_change_cosmetic_fields_only() {
    let dir_a = temp_out_dir("seed_a");
    let dir_b = temp_out_dir("seed_b");
    let mut config_b = config(&dir_b, small_scale());
    config_b.seed = 8;

    GenerationEngine::new(config(&dir_a, small_scale()), GenerateOptions::default())
        .run(fixed_clock())
        .expect("run a");
    GenerationEngine::new(config_b, GenerateOptions::default())
        .run(fixed_clock())
        .expect("run b");

    for stage in [Stage::GroupMembers, Stage::Huntings, Stage::Bots] {
        assert_eq!(
            hash_file(&dir_a.join(stage.file_name())).expect("hash a"),
            hash_file(&dir_b.join(stage.file_name())).expect("hash b"),
        );
    }
    assert_ne!(
        hash_file(&dir_a.join("users.csv")).expect("hash a"),
        hash_file(&dir_b.join("users.csv")).expect("hash b"),
    );

    let _ = std::fs::remove_dir_all(dir_a);
    let _ = std::fs::remove_dir_all(dir_b);
}

#[test]
fn invalid_layout_writes_nothing() {
    let out_dir = temp_out_dir("invalid");
    let mut scale = small_scale();
    scale.total_users = 22;
    let engine = GenerationEngine::new(config(&out_dir, scale), GenerateOptions::default());

    let err = engine.run(fixed_clock()).expect_err("layout must fail");
    assert!(matches!(
        err,
        GenerationError::Layout(LayoutError::InvalidConfig(_))
    ));
    assert!(!out_dir.exists());
}

#[test]
fn unrepresentable_chat_history_writes_nothing() {
    for interval in [100_000_000_000_000_000, 9_000_000_000_000_000] {
        let out_dir = temp_out_dir("chat_span");
        let mut scale = single_group_scale();
        scale.messages_per_group = 1;
        scale.message_interval_secs = interval;
        let engine = GenerationEngine::new(config(&out_dir, scale), GenerateOptions::default());

        let err = engine.run(fixed_clock()).expect_err("chat span must fail");
        assert!(
            matches!(err, GenerationError::Layout(LayoutError::InvalidConfig(_))),
            "interval {interval}: {err}"
        );
        assert!(!out_dir.exists(), "interval {interval} left files behind");
    }
}

#[test]
fn missing_secret_fails_before_any_file() {
    let out_dir = temp_out_dir("no_secret");
    let mut config = config(&out_dir, small_scale());
    config.auth.jwt_secret = None;

    let err = GenerationEngine::new(config.clone(), GenerateOptions::default())
        .run(fixed_clock())
        .expect_err("sessions need a secret");
    assert!(matches!(err, GenerationError::InvalidOptions(_)));
    assert!(!out_dir.exists());

    let options = GenerateOptions {
        stages: vec![Stage::Users],
        write_report: true,
    };
    GenerationEngine::new(config, options)
        .run(fixed_clock())
        .expect("users alone need no secret");
    assert!(out_dir.join("users.csv").exists());
    let _ = std::fs::remove_dir_all(out_dir);
}
