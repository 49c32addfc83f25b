use chrono::{DateTime, Utc};

use super::{GenerationContext, remaining};
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::csv::{Field, TabularRecord};
use crate::token::SessionTokenMinter;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: u64,
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: String,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TabularRecord for SessionRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "user_id",
        "access_token",
        "refresh_token",
        "expiration",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.user_id),
            Field::text(&self.access_token),
            Field::text(&self.refresh_token),
            Field::Timestamp(self.expiration),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// One session per user with an expired access token and a live refresh
/// token.
pub struct SessionGenerator<'a, F> {
    faker: F,
    minter: &'a SessionTokenMinter,
    now: DateTime<Utc>,
    expiration: DateTime<Utc>,
    next: u64,
    last: u64,
}

impl<'a, F: Faker> SessionGenerator<'a, F> {
    pub fn new(ctx: &GenerationContext, minter: &'a SessionTokenMinter, faker: F) -> Self {
        Self {
            faker,
            minter,
            now: ctx.clock.now(),
            expiration: ctx.clock.week_ahead(),
            next: 1,
            last: ctx.layout.users.total_users,
        }
    }

    fn build(&mut self, user_id: u64) -> Result<SessionRecord, GenerationError> {
        Ok(SessionRecord {
            id: user_id,
            user_id,
            access_token: self.minter.mint(user_id, self.now)?,
            refresh_token: self.faker.opaque_token(),
            expiration: self.expiration,
            created_at: self.now,
            updated_at: self.now,
        })
    }
}

impl<F: Faker> Iterator for SessionGenerator<'_, F> {
    type Item = Result<SessionRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.last {
            return None;
        }
        let user_id = self.next;
        self.next += 1;
        Some(self.build(user_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        remaining(self.next, self.last)
    }
}
