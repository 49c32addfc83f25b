use chrono::{DateTime, Utc};

use huntseed_core::{ChallengeKind, ChallengeLayout, TaskLayout, TaskSlice};

use super::GenerationContext;
use crate::errors::GenerationError;
use crate::faker_rs::Faker;
use crate::output::csv::{Field, TabularRecord};

const MIN_LINKS: usize = 3;
const MAX_LINKS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub id: u64,
    pub challenge_id: u64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub external_links: Vec<String>,
    pub image_urls: Vec<String>,
    pub certified_at: Option<DateTime<Utc>>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub slice: TaskSlice,
}

impl TabularRecord for TaskRecord {
    const HEADER: &'static [&'static str] = &[
        "id",
        "challenge_id",
        "title",
        "deadline",
        "external_links",
        "image_urls",
        "certified_at",
        "deleted",
        "created_at",
        "updated_at",
    ];

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::Id(self.id),
            Field::Id(self.challenge_id),
            Field::text(&self.title),
            Field::Timestamp(self.deadline),
            Field::lines(&self.external_links),
            Field::lines(&self.image_urls),
            Field::optional_timestamp(self.certified_at),
            Field::Bool(self.deleted),
            Field::Timestamp(self.created_at),
            Field::Timestamp(self.updated_at),
        ]
    }
}

/// Tasks of every challenge, in challenge order, following the fixed
/// successful / failed / in-progress sub-layout of the challenge's kind.
///
/// Completed challenges may leave trailing slots of their id range unused.
pub struct TaskGenerator<F> {
    faker: F,
    challenges: ChallengeLayout,
    tasks: TaskLayout,
    now: DateTime<Utc>,
    yesterday: DateTime<Utc>,
    ongoing_deadline: DateTime<Utc>,
    challenge_id: u64,
    kind: ChallengeKind,
    slot: u64,
    emitted: u64,
}

impl<F: Faker> TaskGenerator<F> {
    pub fn new(ctx: &GenerationContext, faker: F) -> Self {
        let challenges = ctx.layout.challenges;
        Self {
            faker,
            challenges,
            tasks: ctx.layout.tasks,
            now: ctx.clock.now(),
            yesterday: ctx.clock.yesterday(),
            ongoing_deadline: ctx.clock.week_ahead_end_of_day(),
            challenge_id: 1,
            kind: challenges.kind_of(0),
            slot: 0,
            emitted: 0,
        }
    }

    /// Move the cursor to the next slot that carries a task.
    fn advance(&mut self) -> Result<Option<(u64, u64, TaskSlice)>, GenerationError> {
        while self.challenge_id <= self.challenges.total_challenges {
            if let Some(slice) = self.tasks.slice_of(self.kind, self.slot) {
                let current = (self.challenge_id, self.slot, slice);
                self.slot += 1;
                return Ok(Some(current));
            }
            self.challenge_id += 1;
            self.slot = 0;
            if self.challenge_id <= self.challenges.total_challenges {
                self.kind = self.challenges.locate(self.challenge_id)?.kind;
            }
        }
        Ok(None)
    }

    fn build(
        &mut self,
        challenge_id: u64,
        slot: u64,
        slice: TaskSlice,
    ) -> Result<TaskRecord, GenerationError> {
        let id = self.tasks.task_id(challenge_id, slot)?;
        let title = self.faker.sentence();
        let (deadline, external_links, image_urls, certified_at) = match slice {
            TaskSlice::Successful => {
                let links = self.faker.url_list(MIN_LINKS, MAX_LINKS);
                let count = self.faker.count_between(MIN_LINKS, MAX_LINKS);
                let images = (0..count).map(|_| self.faker.image_url()).collect();
                (self.yesterday, links, images, Some(self.yesterday))
            }
            TaskSlice::Failed => (self.yesterday, Vec::new(), Vec::new(), None),
            TaskSlice::InProgress => (self.ongoing_deadline, Vec::new(), Vec::new(), None),
        };
        Ok(TaskRecord {
            id,
            challenge_id,
            title,
            deadline,
            external_links,
            image_urls,
            certified_at,
            deleted: false,
            created_at: self.now,
            updated_at: self.now,
            slice,
        })
    }
}

impl<F: Faker> Iterator for TaskGenerator<F> {
    type Item = Result<TaskRecord, GenerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.advance().and_then(|position| {
            position
                .map(|(challenge_id, slot, slice)| self.build(challenge_id, slot, slice))
                .transpose()
        });
        match step {
            Ok(Some(record)) => {
                self.emitted += 1;
                Some(Ok(record))
            }
            Ok(None) => None,
            Err(err) => {
                self.challenge_id = u64::MAX;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.tasks.total_tasks.saturating_sub(self.emitted);
        match usize::try_from(left) {
            Ok(left) => (left, Some(left)),
            Err(_) => (usize::MAX, None),
        }
    }
}
