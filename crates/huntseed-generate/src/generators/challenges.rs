use chrono::{DateTime, Utc};

use huntseed_core::{ChallengeKind, ChallengeLayout, GroupLayout};

use super::{GenerationContext, Nesting, remaining};
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct ChallengeRecord {
    pub id: u64,
    pub group_id: u64,
    pub owner_id: u64,
    pub title: String,
    pub description: String,
    pub amount: i64,
    pub initial_amount: i64,
    pub deadline: DateTime<Utc>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub kind: ChallengeKind,
}

impl TabularRecord for ChallengeRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "group_id",
        "owner_id",
        "title",
        "description",
        "amount",
        "initial_amount",
        "deadline",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.group_id),
            Field::Id(self.owner_id),
            Field::text(&self.title),
            Field::text(&self.description),
            Field::Int(self.amount),
            Field::Int(self.initial_amount),
            Field::Timestamp(self.deadline),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// Challenges in group, member, offset order: each member's completed
/// challenges first, then the ongoing ones. Ids are derived forward from the
/// position, never recovered from a counter.
pub struct ChallengeGenerator<F> {
    faker: F,
    groups: GroupLayout,
    challenges: ChallengeLayout,
    amount: i64,
    now: DateTime<Utc>,
    completed_deadline: DateTime<Utc>,
    ongoing_deadline: DateTime<Utc>,
    at: Nesting,
    emitted: u64,
}

impl<F: Faker> ChallengeGenerator<F> {
    pub fn new(ctx: &GenerationContext, faker: F) -> Self {
        Self {
            faker,
            groups: ctx.layout.groups,
            challenges: ctx.layout.challenges,
            amount: ctx.amounts.default_challenge_amount,
            now: ctx.clock.now(),
            completed_deadline: ctx.clock.yesterday_end_of_day(),
            ongoing_deadline: ctx.clock.week_ahead_end_of_day(),
            at: Nesting::first(),
            emitted: 0,
        }
    }

    fn build(&mut self, at: Nesting) -> Result<ChallengeRecord, GenerationError> {
        let id = self
            .challenges
            .challenge_id(&self.groups, at.group_id, at.member_index, at.offset)?;
        let owner_id = self.groups.member_user(at.group_id, at.member_index)?;
        let kind = self.challenges.kind_of(at.offset);
        let deadline = match kind {
            ChallengeKind::Completed => self.completed_deadline,
            ChallengeKind::Ongoing => self.ongoing_deadline,
        };
        Ok(ChallengeRecord {
            id,
            group_id: at.group_id,
            owner_id,
            title: self.faker.sentence(),
            description: self.faker.sentences(2),
            amount: self.amount,
            initial_amount: self.amount,
            deadline,
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
            kind,
        })
    }
}

impl<F: Faker> Iterator for ChallengeGenerator<F> {
    type Item = Result<ChallengeRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.challenges.total_challenges {
            return None;
        }
        let at = self.at;
        self.at.advance(
            self.challenges.challenges_per_member,
            self.groups.members_per_group,
        );
        self.emitted += 1;
        Some(self.build(at))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.emitted + 1, self.challenges.total_challenges)
    }
}
