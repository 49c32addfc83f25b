use serde::{Deserialize, Serialize};

use crate::config::{ScaleConfig, TaskSplit};
use crate::error::{Error, Result};
use crate::identity::{
    base_challenge_of, base_task_of, hunter_of, member_user_of, membership_id_of, owner_user_of,
};

/// Validated, derived counts for every stage of the pipeline.
///
/// Each stage layout is resolved from the previous one, mirroring the run
/// order `users -> groups -> challenges -> tasks -> huntings`; chat messages
/// hang off the group layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureLayout {
    pub users: UserLayout,
    pub groups: GroupLayout,
    pub challenges: ChallengeLayout,
    pub tasks: TaskLayout,
    pub huntings: HuntingLayout,
    pub chat: ChatLayout,
}

impl FixtureLayout {
    /// Run every pre-flight check and derive the per-stage layouts.
    pub fn resolve(scale: &ScaleConfig) -> Result<Self> {
        let users = UserLayout::resolve(scale)?;
        let groups = GroupLayout::resolve(scale, &users)?;
        let challenges = ChallengeLayout::resolve(scale, &groups)?;
        let tasks = TaskLayout::resolve(scale, &challenges)?;
        let huntings = HuntingLayout::resolve(&groups, &challenges, &tasks)?;
        let chat = ChatLayout::resolve(scale, &groups)?;
        Ok(Self {
            users,
            groups,
            challenges,
            tasks,
            huntings,
            chat,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLayout {
    pub total_users: u64,
}

impl UserLayout {
    pub fn resolve(scale: &ScaleConfig) -> Result<Self> {
        if scale.total_users == 0 {
            return Err(Error::InvalidConfig(
                "total_users must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            total_users: scale.total_users,
        })
    }

    pub fn contains(&self, user_id: u64) -> bool {
        (1..=self.total_users).contains(&user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub total_groups: u64,
    pub members_per_group: u64,
    pub total_memberships: u64,
}

impl GroupLayout {
    pub fn resolve(scale: &ScaleConfig, users: &UserLayout) -> Result<Self> {
        let members = scale.members_per_group;
        if scale.total_groups == 0 {
            return Err(Error::InvalidConfig(
                "total_groups must be at least 1".to_string(),
            ));
        }
        if members == 0 {
            return Err(Error::InvalidConfig(
                "members_per_group must be at least 1".to_string(),
            ));
        }
        if users.total_users % members != 0 {
            return Err(Error::InvalidConfig(format!(
                "total_users ({}) must be divisible by members_per_group ({members})",
                users.total_users
            )));
        }

        // Highest user referenced by the last group's member block.
        let highest_user = checked_mul(
            scale.total_groups.div_ceil(members),
            members,
            "highest member user id",
        )?;
        if highest_user > users.total_users {
            return Err(Error::InvalidConfig(format!(
                "total_groups ({}) with members_per_group ({members}) references user {highest_user} \
                 but total_users is {}",
                scale.total_groups, users.total_users
            )));
        }

        Ok(Self {
            total_groups: scale.total_groups,
            members_per_group: members,
            total_memberships: checked_mul(scale.total_groups, members, "total memberships")?,
        })
    }

    pub fn group_ids(&self) -> std::ops::RangeInclusive<u64> {
        1..=self.total_groups
    }

    pub fn owner(&self, group_id: u64) -> Result<u64> {
        self.check_group(group_id)?;
        Ok(owner_user_of(group_id, self.members_per_group))
    }

    pub fn member_user(&self, group_id: u64, member_index: u64) -> Result<u64> {
        self.check_group(group_id)?;
        self.check_member(member_index)?;
        Ok(member_user_of(group_id, member_index, self.members_per_group))
    }

    pub fn membership_id(&self, group_id: u64, member_index: u64) -> Result<u64> {
        self.check_group(group_id)?;
        self.check_member(member_index)?;
        Ok(membership_id_of(
            group_id,
            member_index,
            self.members_per_group,
        ))
    }

    pub fn hunter(&self, group_id: u64, member_index: u64) -> Result<u64> {
        self.check_group(group_id)?;
        self.check_member(member_index)?;
        Ok(hunter_of(group_id, member_index, self.members_per_group))
    }

    /// True when `user_id` belongs to the member block of `group_id`.
    pub fn is_member(&self, group_id: u64, user_id: u64) -> bool {
        if !self.group_ids().contains(&group_id) {
            return false;
        }
        let owner = owner_user_of(group_id, self.members_per_group);
        (owner..owner + self.members_per_group).contains(&user_id)
    }

    fn check_group(&self, group_id: u64) -> Result<()> {
        if (1..=self.total_groups).contains(&group_id) {
            Ok(())
        } else {
            Err(Error::out_of_range("group", group_id, self.total_groups))
        }
    }

    fn check_member(&self, member_index: u64) -> Result<()> {
        if member_index < self.members_per_group {
            Ok(())
        } else {
            Err(Error::out_of_range(
                "group member",
                member_index,
                self.members_per_group,
            ))
        }
    }
}

/// Whether a challenge's deadline has passed or is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Completed,
    Ongoing,
}

/// Position of a task inside its challenge's fixed sub-layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSlice {
    Successful,
    Failed,
    InProgress,
}

/// Where a challenge id sits in the group/member/offset nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengePosition {
    pub group_id: u64,
    pub member_index: u64,
    pub offset: u64,
    pub kind: ChallengeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeLayout {
    pub completed_per_member: u64,
    pub ongoing_per_member: u64,
    pub challenges_per_member: u64,
    pub challenges_per_group: u64,
    pub total_challenges: u64,
    members_per_group: u64,
    total_groups: u64,
}

impl ChallengeLayout {
    pub fn resolve(scale: &ScaleConfig, groups: &GroupLayout) -> Result<Self> {
        let challenges_per_member = scale
            .completed_challenges_per_member
            .checked_add(scale.ongoing_challenges_per_member)
            .ok_or_else(|| Error::Overflow("challenges per member".to_string()))?;
        let challenges_per_group = checked_mul(
            challenges_per_member,
            groups.members_per_group,
            "challenges per group",
        )?;
        let total_challenges = checked_mul(
            challenges_per_group,
            groups.total_groups,
            "total challenges",
        )?;

        Ok(Self {
            completed_per_member: scale.completed_challenges_per_member,
            ongoing_per_member: scale.ongoing_challenges_per_member,
            challenges_per_member,
            challenges_per_group,
            total_challenges,
            members_per_group: groups.members_per_group,
            total_groups: groups.total_groups,
        })
    }

    /// Completed challenges come first in each member's run, then ongoing ones.
    pub fn kind_of(&self, offset: u64) -> ChallengeKind {
        if offset < self.completed_per_member {
            ChallengeKind::Completed
        } else {
            ChallengeKind::Ongoing
        }
    }

    pub fn base_challenge(
        &self,
        groups: &GroupLayout,
        group_id: u64,
        member_index: u64,
    ) -> Result<u64> {
        groups.check_group(group_id)?;
        groups.check_member(member_index)?;
        Ok(base_challenge_of(
            group_id,
            member_index,
            self.challenges_per_member,
            self.challenges_per_group,
        ))
    }

    pub fn challenge_id(
        &self,
        groups: &GroupLayout,
        group_id: u64,
        member_index: u64,
        offset: u64,
    ) -> Result<u64> {
        if offset >= self.challenges_per_member {
            return Err(Error::out_of_range(
                "challenge offset",
                offset,
                self.challenges_per_member,
            ));
        }
        Ok(self.base_challenge(groups, group_id, member_index)? + offset)
    }

    /// Inverse of [`Self::challenge_id`].
    pub fn locate(&self, challenge_id: u64) -> Result<ChallengePosition> {
        if !(1..=self.total_challenges).contains(&challenge_id) {
            return Err(Error::out_of_range(
                "challenge",
                challenge_id,
                self.total_challenges,
            ));
        }
        let zero_based = challenge_id - 1;
        let group_id = zero_based / self.challenges_per_group + 1;
        let within_group = zero_based % self.challenges_per_group;
        let member_index = within_group / self.challenges_per_member;
        let offset = within_group % self.challenges_per_member;
        Ok(ChallengePosition {
            group_id,
            member_index,
            offset,
            kind: self.kind_of(offset),
        })
    }

    /// Owning user of `challenge_id`.
    pub fn owner_of(&self, challenge_id: u64) -> Result<u64> {
        let position = self.locate(challenge_id)?;
        Ok(member_user_of(
            position.group_id,
            position.member_index,
            self.members_per_group,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLayout {
    pub tasks_per_challenge: u64,
    pub completed: TaskSplit,
    pub ongoing: TaskSplit,
    /// Rows actually emitted; smaller than the id space when completed
    /// challenges leave trailing slots unused.
    pub total_tasks: u64,
    /// Upper bound of the task id space.
    pub max_task_id: u64,
}

impl TaskLayout {
    pub fn resolve(scale: &ScaleConfig, challenges: &ChallengeLayout) -> Result<Self> {
        let tasks_per_challenge = scale.tasks_per_challenge;
        let completed = scale.completed_tasks;
        let ongoing = scale.ongoing_tasks;

        if challenges.completed_per_member > 0 {
            if completed.in_progress != 0 {
                return Err(Error::InvalidConfig(
                    "completed challenges cannot carry in-progress tasks".to_string(),
                ));
            }
            let used = split_total(&completed, "completed task split")?;
            if used > tasks_per_challenge {
                return Err(Error::InvalidConfig(format!(
                    "completed tasks ({} successful + {} failed) exceed tasks_per_challenge ({tasks_per_challenge})",
                    completed.successful, completed.failed
                )));
            }
        }

        if challenges.ongoing_per_member > 0 {
            let used = split_total(&ongoing, "ongoing task split")?;
            if used != tasks_per_challenge {
                return Err(Error::InvalidConfig(format!(
                    "ongoing tasks ({} successful + {} failed + {} in progress) must sum to tasks_per_challenge ({tasks_per_challenge})",
                    ongoing.successful, ongoing.failed, ongoing.in_progress
                )));
            }
        }

        let members = challenges.members_per_group;
        let completed_rows = checked_mul(
            challenges.completed_per_member,
            split_total(&completed, "completed task split")?,
            "completed tasks per member",
        )?;
        let ongoing_rows = if challenges.ongoing_per_member > 0 {
            checked_mul(
                challenges.ongoing_per_member,
                tasks_per_challenge,
                "ongoing tasks per member",
            )?
        } else {
            0
        };
        let per_member = completed_rows
            .checked_add(ongoing_rows)
            .ok_or_else(|| Error::Overflow("tasks per member".to_string()))?;
        let total_tasks = checked_mul(
            checked_mul(per_member, members, "tasks per group")?,
            challenges.total_groups,
            "total tasks",
        )?;
        let max_task_id = checked_mul(
            challenges.total_challenges,
            tasks_per_challenge,
            "task id space",
        )?;

        Ok(Self {
            tasks_per_challenge,
            completed,
            ongoing,
            total_tasks,
            max_task_id,
        })
    }

    pub fn split(&self, kind: ChallengeKind) -> TaskSplit {
        match kind {
            ChallengeKind::Completed => TaskSplit {
                in_progress: 0,
                ..self.completed
            },
            ChallengeKind::Ongoing => self.ongoing,
        }
    }

    /// Number of task rows a challenge of `kind` emits.
    pub fn rows_for(&self, kind: ChallengeKind) -> u64 {
        let split = self.split(kind);
        split.successful + split.failed + split.in_progress
    }

    /// Slice for the `slot`-th task of a challenge, `None` past the last row.
    pub fn slice_of(&self, kind: ChallengeKind, slot: u64) -> Option<TaskSlice> {
        let split = self.split(kind);
        if slot < split.successful {
            Some(TaskSlice::Successful)
        } else if slot < split.successful + split.failed {
            Some(TaskSlice::Failed)
        } else if slot < split.successful + split.failed + split.in_progress {
            Some(TaskSlice::InProgress)
        } else {
            None
        }
    }

    pub fn task_id(&self, challenge_id: u64, slot: u64) -> Result<u64> {
        if slot >= self.tasks_per_challenge {
            return Err(Error::out_of_range(
                "task slot",
                slot,
                self.tasks_per_challenge,
            ));
        }
        let id = base_task_of(challenge_id, self.tasks_per_challenge) + slot;
        if id > self.max_task_id {
            return Err(Error::out_of_range("task", id, self.max_task_id));
        }
        Ok(id)
    }

    /// Owning challenge and slot of `task_id`.
    pub fn locate(&self, task_id: u64) -> Result<(u64, u64)> {
        if !(1..=self.max_task_id).contains(&task_id) {
            return Err(Error::out_of_range("task", task_id, self.max_task_id));
        }
        let zero_based = task_id - 1;
        Ok((
            zero_based / self.tasks_per_challenge + 1,
            zero_based % self.tasks_per_challenge,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntingLayout {
    pub failed_per_challenge: u64,
    pub total_huntings: u64,
}

impl HuntingLayout {
    pub fn resolve(
        groups: &GroupLayout,
        challenges: &ChallengeLayout,
        tasks: &TaskLayout,
    ) -> Result<Self> {
        let failed_per_challenge = tasks.completed.failed;
        let total_huntings = checked_mul(
            checked_mul(
                groups.total_memberships,
                challenges.completed_per_member,
                "completed challenges",
            )?,
            failed_per_challenge,
            "total huntings",
        )?;

        if total_huntings > 0 && groups.members_per_group < 2 {
            return Err(Error::InvalidConfig(
                "members_per_group must be at least 2 when huntings are generated".to_string(),
            ));
        }

        Ok(Self {
            failed_per_challenge,
            total_huntings,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLayout {
    pub messages_per_group: u64,
    pub interval_secs: u64,
    pub total_messages: u64,
}

/// Longest chat history a timestamp offset can express in milliseconds.
pub const MAX_HISTORY_SPAN_SECS: u64 = (i64::MAX / 1_000) as u64;

impl ChatLayout {
    /// Seconds between the oldest message of a group and the run start.
    pub fn history_span_secs(&self) -> u64 {
        self.messages_per_group.saturating_mul(self.interval_secs)
    }

    pub fn resolve(scale: &ScaleConfig, groups: &GroupLayout) -> Result<Self> {
        if scale.message_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "message_interval_secs must be at least 1".to_string(),
            ));
        }
        // The oldest message sits messages_per_group intervals in the past,
        // and the span must fit a millisecond-precision duration.
        let span = checked_mul(
            scale.messages_per_group,
            scale.message_interval_secs,
            "chat history span",
        )?;
        if span > MAX_HISTORY_SPAN_SECS {
            return Err(Error::InvalidConfig(format!(
                "chat history span of {span}s exceeds {MAX_HISTORY_SPAN_SECS}s"
            )));
        }

        Ok(Self {
            messages_per_group: scale.messages_per_group,
            interval_secs: scale.message_interval_secs,
            total_messages: checked_mul(
                scale.messages_per_group,
                groups.total_groups,
                "total chat messages",
            )?,
        })
    }
}

fn split_total(split: &TaskSplit, what: &str) -> Result<u64> {
    split
        .total()
        .ok_or_else(|| Error::Overflow(what.to_string()))
}

fn checked_mul(a: u64, b: u64, what: &str) -> Result<u64> {
    a.checked_mul(b)
        .ok_or_else(|| Error::Overflow(format!("{what} ({a} * {b})")))
}
