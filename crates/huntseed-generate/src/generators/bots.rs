use chrono::{DateTime, Utc};

use super::{GenerationContext, remaining};
use crate::errors::GenerationError;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct BotRecord {
    pub id: u64,
    pub group_id: u64,
    pub name: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabularRecord for BotRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "group_id",
        "name",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.group_id),
            Field::text(&self.name),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// One chat bot per group, sharing the group's id.
pub struct BotGenerator {
    now: DateTime<Utc>,
    next: u64,
    last: u64,
}

impl BotGenerator {
    pub fn new(ctx: &GenerationContext) -> Self {
        Self {
            now: ctx.clock.now(),
            next: 1,
            last: ctx.layout.groups.total_groups,
        }
    }
}

impl Iterator for BotGenerator {
    type Item = Result<BotRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let group_id = self.next;
        self.next += 1;
        Some(Ok(BotRecord {
            id: group_id,
            group_id,
            name: format!("Bot {group_id}"),
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.next, self.last)
    }
}
