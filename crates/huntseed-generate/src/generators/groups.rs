use chrono::{DateTime, Utc};

use huntseed_core::GroupLayout;

use super::{GenerationContext, remaining};
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub thumbnail_url: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: u64,
    pub updated_at: DateTime<Utc>,
    pub updated_by: u64,
}

impl TabularRecord for GroupRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "thumbnail_url",
        "deleted",
        "created_at",
        "created_by",
        "updated_at",
        "updated_by",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::text(&self.name),
            Field::text(&self.description),
            Field::text(&self.thumbnail_url),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Id(self.created_by),
            Field::Timestamp(self.updated_at),
            Field::Id(self.updated_by),
        ]
    }
}

/// Groups `1..=total_groups`, created and last updated by their owner.
pub struct GroupGenerator<F> {
    faker: F,
    groups: GroupLayout,
    now: DateTime<Utc>,
    next: u64,
}

impl<F: Faker> GroupGenerator<F> {
    pub fn new(ctx: &GenerationContext, faker: F) -> Self {
        Self {
            faker,
            groups: ctx.layout.groups,
            now: ctx.clock.now(),
            next: 1,
        }
    }

    fn build(&mut self, id: u64) -> Result<GroupRecord, GenerationError> {
        let owner = self.groups.owner(id)?;
        Ok(GroupRecord {
            id,
            name: self.faker.company_name(),
            description: self.faker.catch_phrase(),
            thumbnail_url: self.faker.image_url(),
            deleted: false,
            created_at: self.now,
            created_by: owner,
            updated_at: self.now,
            updated_by: owner,
        })
    }
}

impl<F: Faker> Iterator for GroupGenerator<F> {
    type Item = Result<GroupRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.groups.total_groups {
            return None;
        }
        let id = self.next;
        self.next += 1;
        Some(self.build(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.next, self.groups.total_groups)
    }
}
