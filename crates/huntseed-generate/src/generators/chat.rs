use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huntseed_core::{ChatLayout, Error as LayoutError};

use super::{GenerationContext, remaining};
use crate::clock::RunClock;
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::ndjson::TypedDate;

pub const SENDER_TYPE: &str = "BOT";

/// One chat message document, sent by the group's bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRecord {
    pub sender_id: u64,
    pub group_id: u64,
    pub content: String,
    pub sender_type: String,
    pub action_list: Vec<serde_json::Value>,
    pub created_at: TypedDate,
    pub updated_at: TypedDate,
}

/// `messages_per_group` messages per group, spaced by the configured interval
/// and ending one interval before the run clock.
pub struct ChatMessageGenerator<F> {
    faker: F,
    chat: ChatLayout,
    clock: RunClock,
    group_id: u64,
    last_group: u64,
    index: u64,
}

impl<F: Faker> ChatMessageGenerator<F> {
    pub fn new(ctx: &GenerationContext, faker: F) -> Self {
        Self {
            faker,
            chat: ctx.layout.chat,
            clock: ctx.clock,
            group_id: 1,
            last_group: ctx.layout.groups.total_groups,
            index: 0,
        }
    }

    /// `now - (messages_per_group - index) * interval`.
    pub fn sent_at(&self, index: u64) -> Result<DateTime<Utc>, GenerationError> {
        let steps = self.chat.messages_per_group.saturating_sub(index);
        steps
            .checked_mul(self.chat.interval_secs)
            .and_then(|secs| self.clock.seconds_before(secs))
            .ok_or_else(|| {
                LayoutError::Overflow(format!("chat timestamp for index {index}")).into()
            })
    }

    fn build(&mut self, group_id: u64, index: u64) -> Result<ChatMessageRecord, GenerationError> {
        let sent_at = TypedDate(self.sent_at(index)?);
        Ok(ChatMessageRecord {
            sender_id: group_id,
            group_id,
            content: self.faker.sentence(),
            sender_type: SENDER_TYPE.to_string(),
            action_list: Vec::new(),
            created_at: sent_at,
            updated_at: sent_at,
        })
    }
}

impl<F: Faker> Iterator for ChatMessageGenerator<F> {
    type Item = Result<ChatMessageRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.chat.messages_per_group == 0 || self.group_id > self.last_group {
            return None;
        }
        let (group_id, index) = (self.group_id, self.index);
        self.index += 1;
        if self.index == self.chat.messages_per_group {
            self.index = 0;
            self.group_id += 1;
        }
        Some(self.build(group_id, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.chat.messages_per_group == 0 {
            return (0, Some(0));
        }
        let done = (self.group_id - 1) * self.chat.messages_per_group + self.index;
        remaining(done + 1, self.chat.total_messages)
    }
}
