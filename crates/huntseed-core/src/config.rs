use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fully resolved configuration for a single generation run.
///
/// Every field has a default matching the reference scale (10k users, 10k
/// groups of five), so a config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Seed for cosmetic randomness (names, sentences, URLs, refresh tokens).
    pub seed: u64,
    pub scale: ScaleConfig,
    pub amounts: AmountConfig,
    pub output: OutputConfig,
    pub auth: AuthConfig,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scale: ScaleConfig::default(),
            amounts: AmountConfig::default(),
            output: OutputConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

/// Counts that drive every identifier derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    pub total_users: u64,
    pub total_groups: u64,
    pub members_per_group: u64,
    pub completed_challenges_per_member: u64,
    pub ongoing_challenges_per_member: u64,
    pub tasks_per_challenge: u64,
    pub completed_tasks: TaskSplit,
    pub ongoing_tasks: TaskSplit,
    pub messages_per_group: u64,
    /// Spacing between consecutive chat messages of a group.
    pub message_interval_secs: u64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            total_users: 10_000,
            total_groups: 10_000,
            members_per_group: 5,
            completed_challenges_per_member: 10,
            ongoing_challenges_per_member: 2,
            tasks_per_challenge: 20,
            completed_tasks: TaskSplit {
                successful: 10,
                failed: 10,
                in_progress: 0,
            },
            ongoing_tasks: TaskSplit {
                successful: 8,
                failed: 8,
                in_progress: 4,
            },
            messages_per_group: 1_500,
            message_interval_secs: 3_600,
        }
    }
}

/// Per-status task counts inside one challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskSplit {
    pub successful: u64,
    pub failed: u64,
    pub in_progress: u64,
}

impl TaskSplit {
    pub fn total(&self) -> Option<u64> {
        self.successful
            .checked_add(self.failed)?
            .checked_add(self.in_progress)
    }
}

/// Point balances and deposits written into the fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmountConfig {
    pub default_points: i64,
    pub default_challenge_amount: i64,
    pub hunting_reward: i64,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            default_points: 1_000,
            default_challenge_amount: 100,
            hunting_reward: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving every fixture file.
    pub dir: PathBuf,
    /// Default progress cadence, in records (or groups for chat messages).
    pub log_interval: u64,
    /// Per-stage overrides keyed by stage name (e.g. `chat_messages`).
    pub log_intervals: BTreeMap<String, u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let mut log_intervals = BTreeMap::new();
        log_intervals.insert("group_members".to_string(), 10_000);
        log_intervals.insert("chat_messages".to_string(), 100);
        Self {
            dir: PathBuf::from("out"),
            log_interval: 1_000,
            log_intervals,
        }
    }
}

impl OutputConfig {
    pub fn interval_for(&self, stage: &str) -> u64 {
        self.log_intervals
            .get(stage)
            .copied()
            .unwrap_or(self.log_interval)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret shared with the service's access-token verifier.
    pub jwt_secret: Option<Secret>,
}

/// Opaque secret value; never printed or serialized in clear.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Secret)
    }
}
