use chrono::{DateTime, Utc};

use huntseed_core::{ChallengeLayout, GroupLayout, TaskLayout};

use super::{GenerationContext, Nesting, remaining};
use crate::errors::GenerationError;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct HuntingRecord {
    pub id: u64,
    pub task_id: u64,
    pub hunter_id: u64,
    pub amount: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabularRecord for HuntingRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "task_id",
        "hunter_id",
        "amount",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.task_id),
            Field::Id(self.hunter_id),
            Field::Int(self.amount),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// One hunting per failed task of a completed challenge, claimed by the
/// circularly-next member of the challenge owner's group.
///
/// Walks group, member, then each completed challenge's failed slots; the
/// offset of the nesting counts `completed challenge * failed + slot`.
/// Hunting ids are a dense counter of their own.
pub struct HuntingGenerator {
    groups: GroupLayout,
    challenges: ChallengeLayout,
    tasks: TaskLayout,
    total: u64,
    amount: i64,
    now: DateTime<Utc>,
    at: Nesting,
    emitted: u64,
}

impl HuntingGenerator {
    pub fn new(ctx: &GenerationContext) -> Self {
        Self {
            groups: ctx.layout.groups,
            challenges: ctx.layout.challenges,
            tasks: ctx.layout.tasks,
            total: ctx.layout.huntings.total_huntings,
            amount: ctx.amounts.hunting_reward,
            now: ctx.clock.now(),
            at: Nesting::first(),
            emitted: 0,
        }
    }

    fn slots_per_member(&self) -> u64 {
        self.challenges
            .completed_per_member
            .saturating_mul(self.tasks.completed.failed)
    }

    fn build(&self, at: Nesting) -> Result<HuntingRecord, GenerationError> {
        let failed = self.tasks.completed.failed;
        let challenge_id = self.challenges.challenge_id(
            &self.groups,
            at.group_id,
            at.member_index,
            at.offset / failed,
        )?;
        let slot = self.tasks.completed.successful + at.offset % failed;
        let task_id = self.tasks.task_id(challenge_id, slot)?;
        let hunter_id = self.groups.hunter(at.group_id, at.member_index)?;
        Ok(HuntingRecord {
            id: self.emitted,
            task_id,
            hunter_id,
            amount: self.amount,
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
        })
    }
}

impl Iterator for HuntingGenerator {
    type Item = Result<HuntingRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.total {
            return None;
        }
        let at = self.at;
        self.at
            .advance(self.slots_per_member(), self.groups.members_per_group);
        self.emitted += 1;
        Some(self.build(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.emitted + 1, self.total)
    }
}
