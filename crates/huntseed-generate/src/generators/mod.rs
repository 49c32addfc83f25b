//! Lazy per-entity record generators.
//!
//! Each generator walks its entity's natural nesting (group, member,
//! challenge, slot) and derives every identifier from the [`FixtureLayout`].
//! Building a generator again from the same context and faker replays the
//! exact same records.

mod bots;
mod challenges;
mod chat;
mod groups;
mod huntings;
mod members;
mod sessions;
mod tasks;
mod users;

pub use bots::{BotGenerator, BotRecord};
pub use challenges::{ChallengeGenerator, ChallengeRecord};
pub use chat::{ChatMessageGenerator, ChatMessageRecord, SENDER_TYPE};
pub use groups::{GroupGenerator, GroupRecord};
pub use huntings::{HuntingGenerator, HuntingRecord};
pub use members::{MembershipGenerator, MembershipRecord};
pub use sessions::{SessionGenerator, SessionRecord};
pub use tasks::{TaskGenerator, TaskRecord};
pub use users::{UserGenerator, UserRecord};

use huntseed_core::{AmountConfig, FixtureLayout};

use crate::clock::RunClock;

/// Immutable inputs shared by every generator of a run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext {
    pub layout: FixtureLayout,
    pub amounts: AmountConfig,
    pub clock: RunClock,
}

impl GenerationContext {
    pub fn new(layout: FixtureLayout, amounts: AmountConfig, clock: RunClock) -> Self {
        Self {
            layout,
            amounts,
            clock,
        }
    }
}

/// Forward position over (group, member, offset), the nesting every
/// per-member generator walks in id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Nesting {
    pub group_id: u64,
    pub member_index: u64,
    pub offset: u64,
}

impl Nesting {
    pub(crate) fn first() -> Self {
        Self {
            group_id: 1,
            member_index: 0,
            offset: 0,
        }
    }

    /// Step to the next offset, rolling over into the next member and group.
    pub(crate) fn advance(&mut self, offsets: u64, members: u64) {
        self.offset += 1;
        if self.offset >= offsets {
            self.offset = 0;
            self.member_index += 1;
            if self.member_index >= members {
                self.member_index = 0;
                self.group_id += 1;
            }
        }
    }
}

/// Remaining count of a dense `next..=last` cursor, for `size_hint`.
pub(crate) fn remaining(next: u64, last: u64) -> (usize, Option<usize>) {
    let left = last.saturating_add(1).saturating_sub(next);
    match usize::try_from(left) {
        Ok(left) => (left, Some(left)),
        Err(_) => (usize::MAX, None),
    }
}
