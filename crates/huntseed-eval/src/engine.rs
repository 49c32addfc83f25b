use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use huntseed_core::{ChallengeKind, FixtureLayout, TaskSlice};
use huntseed_generate::generators::{ChatMessageRecord, SENDER_TYPE};
use huntseed_generate::model::GenerationReport;
use huntseed_generate::output::csv::NULL_MARKER;
use huntseed_generate::{REPORT_FILE, Stage};

use crate::errors::EvalError;
use crate::metrics::{
    CheckStats, FileMetrics, PerformanceMetrics, REPORT_VERSION, VerificationReport, WarningItem,
};
use crate::model::{VerificationResult, VerifyOptions, Violation};
use crate::report::render_report;

pub const REPORT_JSON: &str = "verification_report.json";
pub const REPORT_MARKDOWN: &str = "verification_report.md";
pub const VIOLATIONS_JSON: &str = "violations.json";

/// Verify a fixture directory against the layout it was generated from.
#[derive(Debug, Clone)]
pub struct VerifyEngine {
    options: VerifyOptions,
}

impl VerifyEngine {
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    pub fn run(
        &self,
        layout: &FixtureLayout,
        dataset_dir: &Path,
    ) -> Result<VerificationResult, EvalError> {
        if !dataset_dir.is_dir() {
            return Err(EvalError::InvalidDataset(format!(
                "{} is not a directory",
                dataset_dir.display()
            )));
        }
        let total_start = Instant::now();
        let mut checker = Checker::new(self.options.max_violations);

        let generation = read_generation_report(dataset_dir, &mut checker);
        if let Some(report) = &generation {
            if report.layout != *layout {
                checker.warn(
                    "layout_mismatch",
                    REPORT_FILE,
                    "generation report was written for a different layout".to_string(),
                );
            }
        }
        let reference_time = generation
            .as_ref()
            .map(|report| report.started_at)
            .unwrap_or_else(Utc::now);

        let scan_start = Instant::now();
        let mut files = Vec::new();
        for stage in Stage::PIPELINE {
            let file = stage.file_name();
            let path = dataset_dir.join(file);
            let rows_expected = stage.expected_rows(layout);
            if !path.exists() {
                checker.warn("missing_file", file, "fixture not found".to_string());
                files.push(FileMetrics {
                    file: file.to_string(),
                    present: false,
                    rows_found: 0,
                    rows_expected,
                });
                continue;
            }

            let rows_found = match stage {
                Stage::Users => verify_users(&path, &mut checker)?,
                Stage::Groups => verify_groups(&path, layout, &mut checker)?,
                Stage::GroupMembers => verify_memberships(&path, layout, &mut checker)?,
                Stage::Challenges => verify_challenges(&path, layout, &mut checker)?,
                Stage::Tasks => verify_tasks(&path, layout, &mut checker)?,
                Stage::Huntings => verify_huntings(&path, layout, &mut checker)?,
                Stage::Bots => verify_bots(&path, &mut checker)?,
                Stage::ChatMessages => verify_chat(&path, layout, reference_time, &mut checker)?,
                Stage::UserSessions => verify_sessions(&path, reference_time, &mut checker)?,
            };
            checker.check("row_count", file, None, rows_found == rows_expected, || {
                format!("found {rows_found} rows, layout expects {rows_expected}")
            });
            files.push(FileMetrics {
                file: file.to_string(),
                present: true,
                rows_found,
                rows_expected,
            });
        }
        let scan_ms = scan_start.elapsed().as_millis();

        let Checker {
            checks,
            mut violations,
            mut warnings,
            total,
            ..
        } = checker;
        sort_violations(&mut violations);
        warnings.sort_by(|a, b| (&a.file, &a.code).cmp(&(&b.file, &b.code)));

        let metrics = VerificationReport {
            report_version: REPORT_VERSION.to_string(),
            run_id: generation.as_ref().map(|report| report.run_id.clone()),
            seed: generation.as_ref().map(|report| report.seed),
            reference_time,
            files,
            checks: checks
                .into_iter()
                .map(|(name, stats)| (name.to_string(), stats))
                .collect(),
            violations_total: total,
            warnings,
            performance: PerformanceMetrics {
                scan_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };

        let report = render_report(&metrics, &violations, self.options.max_examples);
        let out_dir = self
            .options
            .out_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.to_path_buf());
        std::fs::create_dir_all(&out_dir)?;

        let metrics_path = out_dir.join(REPORT_JSON);
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&metrics)?)?;

        let report_path = out_dir.join(REPORT_MARKDOWN);
        std::fs::write(&report_path, report.as_bytes())?;

        let violations_path = if self.options.write_violations {
            let path = out_dir.join(VIOLATIONS_JSON);
            std::fs::write(&path, serde_json::to_vec_pretty(&violations)?)?;
            Some(path)
        } else {
            None
        };

        if self.options.strict && total > 0 {
            return Err(EvalError::Violations(total));
        }

        Ok(VerificationResult {
            out_dir,
            metrics_path,
            report_path,
            violations_path,
            metrics,
            report,
            violations,
        })
    }
}

/// Check counters plus the kept violations and warnings.
struct Checker {
    checks: BTreeMap<&'static str, CheckStats>,
    violations: Vec<Violation>,
    warnings: Vec<WarningItem>,
    total: u64,
    cap: usize,
}

impl Checker {
    fn new(cap: usize) -> Self {
        Self {
            checks: BTreeMap::new(),
            violations: Vec::new(),
            warnings: Vec::new(),
            total: 0,
            cap,
        }
    }

    fn check<M>(&mut self, code: &'static str, file: &str, row: Option<u64>, ok: bool, message: M)
    where
        M: FnOnce() -> String,
    {
        let stats = self.checks.entry(code).or_default();
        stats.checked += 1;
        if ok {
            return;
        }
        stats.violations += 1;
        self.total += 1;
        if self.violations.len() < self.cap {
            self.violations.push(Violation {
                code: code.to_string(),
                file: file.to_string(),
                message: message(),
                row_index: row,
            });
        }
    }

    fn warn(&mut self, code: &str, file: &str, message: String) {
        self.warnings.push(WarningItem {
            code: code.to_string(),
            file: file.to_string(),
            message,
        });
    }
}

#[derive(Clone, Copy)]
struct Cells<'a> {
    record: &'a csv::StringRecord,
    positions: &'a [usize],
}

impl<'a> Cells<'a> {
    fn text(&self, column: usize) -> &'a str {
        self.positions
            .get(column)
            .and_then(|position| self.record.get(*position))
            .unwrap_or_default()
    }

    fn id(&self, column: usize) -> Option<u64> {
        self.text(column).parse().ok()
    }
}

/// Stream `path` row by row, handing the requested columns to `visit` with a
/// 1-based row number.
fn scan_csv<F>(path: &Path, columns: &[&str], mut visit: F) -> Result<u64, EvalError>
where
    F: FnMut(u64, Cells<'_>),
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let positions = columns
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|header| header == *column)
                .ok_or_else(|| {
                    EvalError::InvalidDataset(format!(
                        "{} is missing column '{column}'",
                        path.display()
                    ))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut record = csv::StringRecord::new();
    let mut row = 0_u64;
    while reader.read_record(&mut record)? {
        row += 1;
        visit(
            row,
            Cells {
                record: &record,
                positions: &positions,
            },
        );
    }
    Ok(row)
}

fn verify_users(path: &Path, checker: &mut Checker) -> Result<u64, EvalError> {
    let file = Stage::Users.file_name();
    scan_csv(path, &["id"], |row, cells| {
        checker.check("user_dense", file, Some(row), cells.id(0) == Some(row), || {
            format!("expected user id {row}, found '{}'", cells.text(0))
        });
    })
}

fn verify_groups(
    path: &Path,
    layout: &FixtureLayout,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::Groups.file_name();
    scan_csv(path, &["id", "created_by", "updated_by"], |row, cells| {
        checker.check("group_dense", file, Some(row), cells.id(0) == Some(row), || {
            format!("expected group id {row}, found '{}'", cells.text(0))
        });
        let owner = layout.groups.owner(row).ok();
        let ok = owner.is_some() && cells.id(1) == owner && cells.id(2) == owner;
        checker.check("group_owner", file, Some(row), ok, || {
            format!(
                "group {row} created_by/updated_by {}/{} is not owner {owner:?}",
                cells.text(1),
                cells.text(2)
            )
        });
    })
}

fn verify_memberships(
    path: &Path,
    layout: &FixtureLayout,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::GroupMembers.file_name();
    let members = layout.groups.members_per_group;
    scan_csv(path, &["id", "user_id", "group_id"], |row, cells| {
        checker.check("membership_dense", file, Some(row), cells.id(0) == Some(row), || {
            format!("expected membership id {row}, found '{}'", cells.text(0))
        });
        let (group_id, user_id) = match members {
            0 => (0, None),
            _ => {
                let group_id = (row - 1) / members + 1;
                let user_id = layout.groups.member_user(group_id, (row - 1) % members).ok();
                (group_id, user_id)
            }
        };
        let ok = cells.id(2) == Some(group_id) && user_id.is_some() && cells.id(1) == user_id;
        checker.check("membership_partition", file, Some(row), ok, || {
            format!(
                "membership {row} is user {} in group {}, expected user {user_id:?} in group {group_id}",
                cells.text(1),
                cells.text(2)
            )
        });
    })
}

fn verify_challenges(
    path: &Path,
    layout: &FixtureLayout,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::Challenges.file_name();
    scan_csv(path, &["id", "group_id", "owner_id"], |row, cells| {
        checker.check("challenge_dense", file, Some(row), cells.id(0) == Some(row), || {
            format!("expected challenge id {row}, found '{}'", cells.text(0))
        });
        let position = layout.challenges.locate(row).ok();
        let owner = layout.challenges.owner_of(row).ok();
        let ok = match (position, cells.id(1), cells.id(2)) {
            (Some(position), Some(group_id), Some(owner_id)) => {
                group_id == position.group_id
                    && Some(owner_id) == owner
                    && layout.groups.is_member(group_id, owner_id)
            }
            _ => false,
        };
        checker.check("challenge_owner", file, Some(row), ok, || {
            format!(
                "challenge {row} owned by user {} in group {} does not match the layout",
                cells.text(2),
                cells.text(1)
            )
        });
    })
}

fn verify_tasks(
    path: &Path,
    layout: &FixtureLayout,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::Tasks.file_name();
    let mut previous = 0_u64;
    scan_csv(path, &["id", "challenge_id", "certified_at"], |row, cells| {
        let id = cells.id(0).unwrap_or_default();
        checker.check("task_order", file, Some(row), id > previous, || {
            format!("task id '{}' does not follow {previous}", cells.text(0))
        });
        previous = previous.max(id);

        let slot = layout.tasks.locate(id).ok().and_then(|(challenge_id, slot)| {
            let kind = layout.challenges.locate(challenge_id).ok()?.kind;
            Some((challenge_id, layout.tasks.slice_of(kind, slot)))
        });
        let slice = match slot {
            Some((challenge_id, slice)) if cells.id(1) == Some(challenge_id) => slice,
            _ => None,
        };
        checker.check("task_slot", file, Some(row), slice.is_some(), || {
            format!(
                "task {} is not an emitted slot of challenge {}",
                cells.text(0),
                cells.text(1)
            )
        });

        if let Some(slice) = slice {
            let certified = cells.text(2);
            let is_certified = !certified.is_empty() && certified != NULL_MARKER;
            checker.check(
                "task_certified",
                file,
                Some(row),
                is_certified == (slice == TaskSlice::Successful),
                || format!("task {id} is {slice:?} but certified_at is '{certified}'"),
            );
        }
    })
}

fn verify_huntings(
    path: &Path,
    layout: &FixtureLayout,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::Huntings.file_name();
    let mut previous = 0_u64;
    scan_csv(path, &["id", "task_id", "hunter_id"], |row, cells| {
        checker.check("hunting_dense", file, Some(row), cells.id(0) == Some(row), || {
            format!("expected hunting id {row}, found '{}'", cells.text(0))
        });

        let task_id = cells.id(1).unwrap_or_default();
        let position = layout
            .tasks
            .locate(task_id)
            .ok()
            .and_then(|(challenge_id, slot)| {
                let position = layout.challenges.locate(challenge_id).ok()?;
                let slice = layout.tasks.slice_of(position.kind, slot);
                Some((challenge_id, position, slice))
            });
        let failed_completed = matches!(
            position,
            Some((_, position, Some(TaskSlice::Failed))) if position.kind == ChallengeKind::Completed
        );
        checker.check("hunting_task", file, Some(row), failed_completed, || {
            format!("task {} is not a failed task of a completed challenge", cells.text(1))
        });
        // Huntings follow task order, so ascending ids also rule out repeats.
        checker.check("hunting_order", file, Some(row), task_id > previous, || {
            format!("task {task_id} is hunted again or out of order after {previous}")
        });
        previous = previous.max(task_id);

        let hunter_ok = match (position, cells.id(2)) {
            (Some((challenge_id, position, _)), Some(hunter_id)) => {
                layout.challenges.owner_of(challenge_id).ok() != Some(hunter_id)
                    && layout.groups.is_member(position.group_id, hunter_id)
            }
            _ => false,
        };
        checker.check("hunting_hunter", file, Some(row), hunter_ok, || {
            format!(
                "hunter {} of task {} is the owner or outside the group",
                cells.text(2),
                cells.text(1)
            )
        });
    })
}

fn verify_bots(path: &Path, checker: &mut Checker) -> Result<u64, EvalError> {
    let file = Stage::Bots.file_name();
    scan_csv(path, &["id", "group_id", "name"], |row, cells| {
        let ok = cells.id(0) == Some(row)
            && cells.id(1) == Some(row)
            && cells.text(2) == format!("Bot {row}");
        checker.check("bot_group", file, Some(row), ok, || {
            format!(
                "bot row {row} is id {} for group {} named '{}'",
                cells.text(0),
                cells.text(1),
                cells.text(2)
            )
        });
    })
}

fn verify_chat(
    path: &Path,
    layout: &FixtureLayout,
    reference_time: DateTime<Utc>,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::ChatMessages.file_name();
    let reader = BufReader::new(File::open(path)?);
    let mut last_sent: HashMap<u64, DateTime<Utc>> = HashMap::new();
    let mut row = 0_u64;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        row += 1;
        let message = serde_json::from_str::<ChatMessageRecord>(&line);
        checker.check("chat_parse", file, Some(row), message.is_ok(), || {
            format!("unreadable chat message: {}", line.chars().take(80).collect::<String>())
        });
        let Ok(message) = message else {
            continue;
        };

        let sender_ok = message.sender_id == message.group_id
            && message.sender_type == SENDER_TYPE
            && layout.groups.group_ids().contains(&message.group_id);
        checker.check("chat_sender", file, Some(row), sender_ok, || {
            format!(
                "message from {} ({}) in group {} is not the group bot",
                message.sender_id, message.sender_type, message.group_id
            )
        });

        let sent_at = message.created_at.0;
        checker.check("chat_past", file, Some(row), sent_at < reference_time, || {
            format!("message sent at {sent_at} is not before {reference_time}")
        });
        let previous = last_sent.insert(message.group_id, sent_at);
        let ordered = previous.map_or(true, |previous| sent_at > previous);
        checker.check("chat_order", file, Some(row), ordered, || {
            format!(
                "message in group {} at {sent_at} does not follow {previous:?}",
                message.group_id
            )
        });
    }
    Ok(row)
}

fn verify_sessions(
    path: &Path,
    reference_time: DateTime<Utc>,
    checker: &mut Checker,
) -> Result<u64, EvalError> {
    let file = Stage::UserSessions.file_name();
    let mut refresh_tokens = HashSet::new();
    scan_csv(
        path,
        &["id", "user_id", "refresh_token", "expiration"],
        |row, cells| {
            let ok = cells.id(0) == Some(row) && cells.id(1) == Some(row);
            checker.check("session_user", file, Some(row), ok, || {
                format!(
                    "session row {row} is id {} for user {}",
                    cells.text(0),
                    cells.text(1)
                )
            });
            let token = cells.text(2);
            let unique = !token.is_empty() && refresh_tokens.insert(token.to_string());
            checker.check("session_refresh_unique", file, Some(row), unique, || {
                format!("refresh token '{token}' is empty or repeated")
            });
            let expiration = DateTime::parse_from_rfc3339(cells.text(3))
                .map(|at| at.with_timezone(&Utc))
                .ok();
            checker.check(
                "session_expiration",
                file,
                Some(row),
                expiration.is_some_and(|at| at > reference_time),
                || format!("session expiration '{}' is not in the future", cells.text(3)),
            );
        },
    )
}

fn read_generation_report(dir: &Path, checker: &mut Checker) -> Option<GenerationReport> {
    let path = dir.join(REPORT_FILE);
    if !path.exists() {
        checker.warn(
            "missing_report",
            REPORT_FILE,
            "no generation report; timestamps are checked against the current time".to_string(),
        );
        return None;
    }
    let parsed = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|contents| {
            serde_json::from_str::<GenerationReport>(&contents).map_err(|err| err.to_string())
        });
    match parsed {
        Ok(report) => Some(report),
        Err(message) => {
            checker.warn("invalid_report", REPORT_FILE, message);
            None
        }
    }
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (&a.file, &a.code, a.row_index.unwrap_or_default()).cmp(&(
            &b.file,
            &b.code,
            b.row_index.unwrap_or_default(),
        ))
    });
}
