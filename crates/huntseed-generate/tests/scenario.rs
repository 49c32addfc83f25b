mod common;

use huntseed_core::{FixtureLayout, TaskSlice};
use huntseed_generate::generators::{
    BotGenerator, ChallengeGenerator, GenerationContext, HuntingGenerator, MembershipGenerator,
    TaskGenerator,
};
use huntseed_generate::output::csv::FixtureTable;
use huntseed_generate::{GenerateOptions, GenerationEngine, RunStatus, Stage};

use common::{CountingFaker, config, fixed_clock, single_group_scale, temp_out_dir};

fn context() -> GenerationContext {
    let scale = single_group_scale();
    let layout = FixtureLayout::resolve(&scale).expect("layout");
    let amounts = huntseed_core::AmountConfig::default();
    GenerationContext::new(layout, amounts, fixed_clock())
}

#[test]
fn single_group_yields_expected_entities() {
    let ctx = context();

    let members: Vec<_> = MembershipGenerator::new(&ctx)
        .collect::<Result<_, _>>()
        .expect("memberships");
    let pairs: Vec<(u64, u64, u64)> = members
        .iter()
        .map(|member| (member.id, member.user_id, member.group_id))
        .collect();
    assert_eq!(
        pairs,
        vec![(1, 1, 1), (2, 2, 1), (3, 3, 1), (4, 4, 1), (5, 5, 1)]
    );

    let challenges: Vec<_> = ChallengeGenerator::new(&ctx, CountingFaker::default())
        .collect::<Result<_, _>>()
        .expect("challenges");
    assert_eq!(challenges.len(), 5);
    for (index, challenge) in challenges.iter().enumerate() {
        let position = index as u64;
        assert_eq!(challenge.id, position + 1);
        assert_eq!(challenge.owner_id, position + 1);
        assert_eq!(challenge.group_id, 1);
        assert_eq!(challenge.deadline, fixed_clock().yesterday_end_of_day());
        assert_eq!(challenge.amount, 100);
        assert_eq!(challenge.initial_amount, 100);
    }

    let tasks: Vec<_> = TaskGenerator::new(&ctx, CountingFaker::default())
        .collect::<Result<_, _>>()
        .expect("tasks");
    assert_eq!(tasks.len(), 10);
    for task in &tasks {
        let slot = (task.id - 1) % 2;
        assert_eq!(task.challenge_id, (task.id - 1) / 2 + 1);
        if slot == 0 {
            assert_eq!(task.slice, TaskSlice::Successful);
            assert_eq!(task.external_links.len(), 3);
            assert_eq!(task.image_urls.len(), 3);
            assert_eq!(task.certified_at, Some(fixed_clock().yesterday()));
        } else {
            assert_eq!(task.slice, TaskSlice::Failed);
            assert!(task.external_links.is_empty());
            assert!(task.image_urls.is_empty());
            assert_eq!(task.certified_at, None);
        }
    }

    let huntings: Vec<_> = HuntingGenerator::new(&ctx)
        .collect::<Result<_, _>>()
        .expect("huntings");
    let triples: Vec<(u64, u64, u64)> = huntings
        .iter()
        .map(|hunting| (hunting.id, hunting.task_id, hunting.hunter_id))
        .collect();
    assert_eq!(
        triples,
        vec![(1, 2, 2), (2, 4, 3), (3, 6, 4), (4, 8, 5), (5, 10, 1)]
    );
    assert!(huntings.iter().all(|hunting| hunting.amount == 100));

    let bots: Vec<_> = BotGenerator::new(&ctx)
        .collect::<Result<_, _>>()
        .expect("bots");
    assert_eq!(bots.len(), 1);
    assert_eq!(bots[0].name, "Bot 1");
}

#[test]
fn generators_restart_identically() {
    let ctx = context();
    let first: Vec<_> = TaskGenerator::new(&ctx, CountingFaker::default())
        .collect::<Result<_, _>>()
        .expect("first pass");
    let second: Vec<_> = TaskGenerator::new(&ctx, CountingFaker::default())
        .collect::<Result<_, _>>()
        .expect("second pass");
    assert_eq!(first, second);
    assert_eq!(
        TaskGenerator::new(&ctx, CountingFaker::default()).size_hint(),
        (10, Some(10))
    );
}

#[test]
fn engine_writes_every_fixture() {
    let out_dir = temp_out_dir("scenario");
    let engine = GenerationEngine::new(
        config(&out_dir, single_group_scale()),
        GenerateOptions::default(),
    );
    let result = engine.run(fixed_clock()).expect("generation");

    assert_eq!(result.report.status, RunStatus::Completed);
    assert_eq!(result.report.stages.len(), Stage::PIPELINE.len());
    for stage in Stage::PIPELINE {
        assert!(out_dir.join(stage.file_name()).exists(), "missing {stage}");
    }
    assert!(out_dir.join("generation_report.json").exists());

    let huntings = FixtureTable::open(&out_dir.join("huntings.csv")).expect("huntings");
    assert_eq!(huntings.len(), 5);
    let last = huntings.row(4).expect("last hunting");
    assert_eq!(last.get_u64("task_id"), Some(10));
    assert_eq!(last.get_u64("hunter_id"), Some(1));

    let tasks = FixtureTable::open(&out_dir.join("tasks.csv")).expect("tasks");
    assert_eq!(tasks.len(), 10);
    let failed = tasks.row(1).expect("failed task");
    assert_eq!(failed.get("certified_at"), Some("\\N"));
    assert_eq!(failed.get_opt("certified_at"), None);
    assert_eq!(failed.get("external_links"), Some(""));

    let header = std::fs::read_to_string(out_dir.join("users.csv")).expect("users");
    assert!(header.starts_with("id,username,email,amount,deleted,created_at,updated_at\n"));

    assert_eq!(result.report.stage(Stage::Tasks).map(|stage| stage.rows), Some(10));
    assert_eq!(
        result.report.stage(Stage::ChatMessages).map(|stage| stage.rows),
        Some(3)
    );

    let _ = std::fs::remove_dir_all(out_dir);
}
