use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use huntseed_core::FixtureLayout;

/// One fixture file of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Users,
    Groups,
    GroupMembers,
    Challenges,
    Tasks,
    Huntings,
    Bots,
    ChatMessages,
    UserSessions,
}

impl Stage {
    /// Documented run order. Later stages reference identifiers laid out by
    /// earlier ones.
    pub const PIPELINE: [Stage; 9] = [
        Stage::Users,
        Stage::Groups,
        Stage::GroupMembers,
        Stage::Challenges,
        Stage::Tasks,
        Stage::Huntings,
        Stage::Bots,
        Stage::ChatMessages,
        Stage::UserSessions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Users => "users",
            Stage::Groups => "groups",
            Stage::GroupMembers => "group_members",
            Stage::Challenges => "challenges",
            Stage::Tasks => "tasks",
            Stage::Huntings => "huntings",
            Stage::Bots => "bots",
            Stage::ChatMessages => "chat_messages",
            Stage::UserSessions => "user_sessions",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Stage::Users => "users.csv",
            Stage::Groups => "groups.csv",
            Stage::GroupMembers => "group_members.csv",
            Stage::Challenges => "challenges.csv",
            Stage::Tasks => "tasks.csv",
            Stage::Huntings => "huntings.csv",
            Stage::Bots => "bots.csv",
            Stage::ChatMessages => "chatMessages.json",
            Stage::UserSessions => "user_sessions.csv",
        }
    }

    /// Singular entity name used in error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Stage::Users => "user",
            Stage::Groups => "group",
            Stage::GroupMembers => "group member",
            Stage::Challenges => "challenge",
            Stage::Tasks => "task",
            Stage::Huntings => "hunting",
            Stage::Bots => "bot",
            Stage::ChatMessages => "chat message",
            Stage::UserSessions => "user session",
        }
    }

    /// Rows the stage must write for `layout`.
    pub fn expected_rows(self, layout: &FixtureLayout) -> u64 {
        match self {
            Stage::Users | Stage::UserSessions => layout.users.total_users,
            Stage::Groups | Stage::Bots => layout.groups.total_groups,
            Stage::GroupMembers => layout.groups.total_memberships,
            Stage::Challenges => layout.challenges.total_challenges,
            Stage::Tasks => layout.tasks.total_tasks,
            Stage::Huntings => layout.huntings.total_huntings,
            Stage::ChatMessages => layout.chat.total_messages,
        }
    }

    /// Sort and dedup a selection into pipeline order.
    pub fn ordered(selection: &[Stage]) -> Vec<Stage> {
        let mut stages = selection.to_vec();
        stages.sort();
        stages.dedup();
        stages
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        Stage::PIPELINE
            .into_iter()
            .find(|stage| stage.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Stage::PIPELINE.iter().map(|stage| stage.name()).collect();
                format!("unknown stage '{value}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_follows_pipeline() {
        let picked = Stage::ordered(&[Stage::Huntings, Stage::Users, Stage::Tasks, Stage::Users]);
        assert_eq!(picked, vec![Stage::Users, Stage::Tasks, Stage::Huntings]);
    }

    #[test]
    fn parses_cli_names() {
        assert_eq!("chat-messages".parse::<Stage>(), Ok(Stage::ChatMessages));
        assert_eq!("USER_SESSIONS".parse::<Stage>(), Ok(Stage::UserSessions));
        assert!("sessions".parse::<Stage>().is_err());
    }
}
