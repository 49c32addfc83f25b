mod common;

use std::collections::{BTreeMap, HashSet};

use huntseed_core::{AmountConfig, ChallengeKind, FixtureLayout, TaskSlice};
use huntseed_generate::generators::{
    ChallengeGenerator, ChatMessageGenerator, GenerationContext, HuntingGenerator,
    MembershipGenerator, TaskGenerator,
};

use common::{CountingFaker, fixed_clock, small_scale};

fn context() -> GenerationContext {
    let layout = FixtureLayout::resolve(&small_scale()).expect("layout");
    GenerationContext::new(layout, AmountConfig::default(), fixed_clock())
}

#[test]
fn memberships_partition_users_per_block() {
    let ctx = context();
    let mut by_group: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for (index, member) in MembershipGenerator::new(&ctx).enumerate() {
        let member = member.expect("membership");
        assert_eq!(member.id, index as u64 + 1);
        by_group.entry(member.group_id).or_default().push(member.user_id);
    }

    assert_eq!(by_group.len(), 20);
    for (group, users) in &by_group {
        let first = (group - 1) / 5 * 5 + 1;
        assert_eq!(users, &(first..first + 5).collect::<Vec<_>>());
    }
}

#[test]
fn challenges_belong_to_group_members() {
    let ctx = context();
    let mut per_owner: BTreeMap<(u64, u64), (u64, u64)> = BTreeMap::new();
    for challenge in ChallengeGenerator::new(&ctx, CountingFaker::default()) {
        let challenge = challenge.expect("challenge");
        assert!(ctx.layout.groups.is_member(challenge.group_id, challenge.owner_id));
        let counts = per_owner
            .entry((challenge.group_id, challenge.owner_id))
            .or_default();
        match challenge.kind {
            ChallengeKind::Completed => {
                assert!(challenge.deadline < ctx.clock.now());
                counts.0 += 1;
            }
            ChallengeKind::Ongoing => {
                assert!(challenge.deadline > ctx.clock.now());
                counts.1 += 1;
            }
        }
    }
    assert_eq!(per_owner.len(), 100);
    assert!(per_owner.values().all(|counts| *counts == (10, 2)));
}

#[test]
fn tasks_follow_their_challenge_layout() {
    let ctx = context();
    let mut count = 0_u64;
    let mut previous = 0_u64;
    for task in TaskGenerator::new(&ctx, CountingFaker::default()) {
        let task = task.expect("task");
        count += 1;
        assert!(task.id > previous);
        previous = task.id;

        let (challenge, slot) = ctx.layout.tasks.locate(task.id).expect("locate");
        assert_eq!(challenge, task.challenge_id);
        let kind = ctx.layout.challenges.locate(challenge).expect("challenge").kind;
        assert_eq!(ctx.layout.tasks.slice_of(kind, slot), Some(task.slice));
        assert_eq!(task.certified_at.is_some(), task.slice == TaskSlice::Successful);
        if task.slice == TaskSlice::InProgress {
            assert_eq!(kind, ChallengeKind::Ongoing);
            assert!(task.deadline > ctx.clock.now());
        } else {
            assert!(task.deadline < ctx.clock.now());
        }
    }
    assert_eq!(count, ctx.layout.tasks.total_tasks);
}

#[test]
fn huntings_cover_failed_completed_tasks_once() {
    let ctx = context();
    let mut seen = HashSet::new();
    for (index, hunting) in HuntingGenerator::new(&ctx).enumerate() {
        let hunting = hunting.expect("hunting");
        assert_eq!(hunting.id, index as u64 + 1);
        assert!(seen.insert(hunting.task_id), "task hunted twice");

        let (challenge, slot) = ctx.layout.tasks.locate(hunting.task_id).expect("task");
        let position = ctx.layout.challenges.locate(challenge).expect("challenge");
        assert_eq!(position.kind, ChallengeKind::Completed);
        assert_eq!(
            ctx.layout.tasks.slice_of(position.kind, slot),
            Some(TaskSlice::Failed)
        );

        let owner = ctx.layout.challenges.owner_of(challenge).expect("owner");
        assert_ne!(hunting.hunter_id, owner);
        assert!(ctx.layout.groups.is_member(position.group_id, hunting.hunter_id));
    }
    assert_eq!(seen.len() as u64, ctx.layout.huntings.total_huntings);
}

#[test]
fn forward_walks_agree_with_layout_lookups() {
    let ctx = context();
    let challenges = ChallengeGenerator::new(&ctx, CountingFaker::default())
        .map(|challenge| challenge.expect("challenge"))
        .collect::<Vec<_>>();
    assert_eq!(challenges.len() as u64, ctx.layout.challenges.total_challenges);
    for (index, challenge) in challenges.iter().enumerate() {
        assert_eq!(challenge.id, index as u64 + 1);
        let position = ctx.layout.challenges.locate(challenge.id).expect("locate");
        assert_eq!(challenge.group_id, position.group_id);
        assert_eq!(challenge.kind, position.kind);
        assert_eq!(
            Some(challenge.owner_id),
            ctx.layout.challenges.owner_of(challenge.id).ok()
        );
    }

    let mut generator = HuntingGenerator::new(&ctx);
    assert_eq!(
        generator.size_hint(),
        (ctx.layout.huntings.total_huntings as usize, Some(ctx.layout.huntings.total_huntings as usize))
    );
    let mut previous = 0;
    let mut count = 0_u64;
    for hunting in generator.by_ref() {
        let hunting = hunting.expect("hunting");
        assert!(hunting.task_id > previous, "huntings follow task order");
        previous = hunting.task_id;
        count += 1;
    }
    assert_eq!(count, ctx.layout.huntings.total_huntings);
    assert_eq!(generator.size_hint(), (0, Some(0)));
    assert!(generator.next().is_none());
}

#[test]
fn chat_timestamps_increase_inside_each_group() {
    let ctx = context();
    let mut last_seen: BTreeMap<u64, chrono::DateTime<chrono::Utc>> = BTreeMap::new();
    let mut per_group: BTreeMap<u64, u64> = BTreeMap::new();
    for message in ChatMessageGenerator::new(&ctx, CountingFaker::default()) {
        let message = message.expect("message");
        assert_eq!(message.sender_id, message.group_id);
        assert_eq!(message.sender_type, "BOT");
        assert_eq!(message.created_at, message.updated_at);
        assert!(message.created_at.0 < ctx.clock.now());
        if let Some(previous) = last_seen.insert(message.group_id, message.created_at.0) {
            assert_eq!((message.created_at.0 - previous).num_seconds(), 3600);
        }
        *per_group.entry(message.group_id).or_default() += 1;
    }

    assert_eq!(per_group.len(), 20);
    assert!(per_group.values().all(|count| *count == 6));
    let newest = last_seen.get(&1).copied().expect("group 1");
    assert_eq!((ctx.clock.now() - newest).num_seconds(), 3600);
}
