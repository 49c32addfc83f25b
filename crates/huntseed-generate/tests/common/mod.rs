#![allow(dead_code)]

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use huntseed_core::{ScaleConfig, SeedConfig, Secret, TaskSplit};
use huntseed_generate::{Faker, RunClock};

pub const SECRET: &str = "fixture-test-secret";

/// Predictable faker: every value carries a running counter.
#[derive(Debug, Default)]
pub struct CountingFaker {
    counter: u64,
}

impl CountingFaker {
    fn bump(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

impl Faker for CountingFaker {
    fn full_name(&mut self) -> String {
        format!("User {}", self.bump())
    }

    fn email(&mut self) -> String {
        format!("user{}@example.com", self.bump())
    }

    fn company_name(&mut self) -> String {
        format!("Company {}", self.bump())
    }

    fn catch_phrase(&mut self) -> String {
        format!("Phrase {}", self.bump())
    }

    fn image_url(&mut self) -> String {
        format!("https://img.example.com/{}", self.bump())
    }

    fn url(&mut self) -> String {
        format!("https://link.example.com/{}", self.bump())
    }

    fn sentence(&mut self) -> String {
        format!("Sentence {}.", self.bump())
    }

    fn count_between(&mut self, min: usize, _max: usize) -> usize {
        min
    }

    fn opaque_token(&mut self) -> String {
        format!("token-{}", self.bump())
    }
}

/// Faker whose text needs CSV quoting: quotes, commas and newlines.
#[derive(Debug, Default)]
pub struct AwkwardFaker;

impl Faker for AwkwardFaker {
    fn full_name(&mut self) -> String {
        "O\"Brien, \"Ace\"".to_string()
    }

    fn email(&mut self) -> String {
        "odd,\"mail\"@example.com".to_string()
    }

    fn company_name(&mut self) -> String {
        "Acme, Inc.".to_string()
    }

    fn catch_phrase(&mut self) -> String {
        "first line\nsecond \"line\"".to_string()
    }

    fn image_url(&mut self) -> String {
        "https://img.example.com/a,b".to_string()
    }

    fn url(&mut self) -> String {
        "https://link.example.com/\"q\"".to_string()
    }

    fn sentence(&mut self) -> String {
        "Say \"hi\", then\nleave.".to_string()
    }

    fn count_between(&mut self, _min: usize, max: usize) -> usize {
        max
    }

    fn opaque_token(&mut self) -> String {
        "tok,en".to_string()
    }
}

pub fn fixed_clock() -> RunClock {
    let now: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-03-20T10:15:30Z")
        .expect("timestamp")
        .with_timezone(&Utc);
    RunClock::fixed(now)
}

/// One group of five members, one completed challenge each with one
/// successful and one failed task.
pub fn single_group_scale() -> ScaleConfig {
    ScaleConfig {
        total_users: 5,
        total_groups: 1,
        members_per_group: 5,
        completed_challenges_per_member: 1,
        ongoing_challenges_per_member: 0,
        tasks_per_challenge: 2,
        completed_tasks: TaskSplit {
            successful: 1,
            failed: 1,
            in_progress: 0,
        },
        ongoing_tasks: TaskSplit::default(),
        messages_per_group: 3,
        message_interval_secs: 60,
    }
}

/// Default shape at a scale small enough for full scans.
pub fn small_scale() -> ScaleConfig {
    ScaleConfig {
        total_users: 20,
        total_groups: 20,
        messages_per_group: 6,
        ..ScaleConfig::default()
    }
}

pub fn config(out_dir: &Path, scale: ScaleConfig) -> SeedConfig {
    let mut config = SeedConfig::default();
    config.seed = 7;
    config.scale = scale;
    config.output.dir = out_dir.to_path_buf();
    config.auth.jwt_secret = Some(Secret::new(SECRET));
    config
}

pub fn temp_out_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("huntseed_{label}_{}", uuid::Uuid::new_v4()))
}

pub fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    use sha2::{Digest, Sha256};

    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
