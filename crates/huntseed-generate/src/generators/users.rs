use chrono::{DateTime, Utc};

use super::{GenerationContext, remaining};
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::csv::{Field, TabularRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub amount: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabularRecord for UserRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "amount",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::text(&self.username),
            Field::text(&self.email),
            Field::Int(self.amount),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// Users `1..=total_users`, each starting with the default point balance.
pub struct UserGenerator<F> {
    faker: F,
    amount: i64,
    now: DateTime<Utc>,
    next: u64,
    last: u64,
}

impl<F: Faker> UserGenerator<F> {
    pub fn new(ctx: &GenerationContext, faker: F) -> Self {
        Self {
            faker,
            amount: ctx.amounts.default_points,
            now: ctx.clock.now(),
            next: 1,
            last: ctx.layout.users.total_users,
        }
    }
}

impl<F: Faker> Iterator for UserGenerator<F> {
    type Item = Result<UserRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let id = self.next;
        self.next += 1;
        Some(Ok(UserRecord {
            id,
            username: self.faker.full_name(),
            email: self.faker.email(),
            amount: self.amount,
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.next, self.last)
    }
}
