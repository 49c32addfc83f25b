use chrono::{DateTime, Utc};

use huntseed_core::GroupLayout;

use super::{GenerationContext, remaining};
use crate::errors::GenerationError;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    pub id: u64,
    pub user_id: u64,
    pub group_id: u64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabularRecord for MembershipRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "user_id",
        "group_id",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.user_id),
            Field::Id(self.group_id),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// Every group's member block, group by group.
pub struct MembershipGenerator {
    groups: GroupLayout,
    now: DateTime<Utc>,
    group_id: u64,
    member_index: u64,
}

impl MembershipGenerator {
    pub fn new(ctx: &GenerationContext) -> Self {
        Self {
            groups: ctx.layout.groups,
            now: ctx.clock.now(),
            group_id: 1,
            member_index: 0,
        }
    }

    fn build(&self, group_id: u64, member_index: u64) -> Result<MembershipRecord, GenerationError> {
        Ok(MembershipRecord {
            id: self.groups.membership_id(group_id, member_index)?,
            user_id: self.groups.member_user(group_id, member_index)?,
            group_id,
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
        })
    }
}

impl Iterator for MembershipGenerator {
    type Item = Result<MembershipRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.group_id > self.groups.total_groups {
            return None;
        }
        let (group_id, member_index) = (self.group_id, self.member_index);
        self.member_index += 1;
        if self.member_index == self.groups.members_per_group {
            self.member_index = 0;
            self.group_id += 1;
        }
        Some(self.build(group_id, member_index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let done = (self.group_id - 1) * self.groups.members_per_group + self.member_index;
        remaining(done + 1, self.groups.total_memberships)
    }
}
