use chrono::{DateTime, Days, NaiveTime, SecondsFormat, TimeDelta, Utc};

/// Single time anchor for a run; every timestamp in the fixtures derives from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    now: DateTime<Utc>,
}

impl RunClock {
    pub fn start() -> Self {
        Self { now: Utc::now() }
    }

    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// `now - secs`, or `None` when that falls outside the representable range.
    pub fn seconds_before(&self, secs: u64) -> Option<DateTime<Utc>> {
        i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| self.now.checked_sub_signed(delta))
    }

    pub fn yesterday(&self) -> DateTime<Utc> {
        self.now - TimeDelta::days(1)
    }

    /// Deadline of completed challenges: 23:59:59.999 the day before.
    pub fn yesterday_end_of_day(&self) -> DateTime<Utc> {
        end_of_day(self.yesterday())
    }

    pub fn week_ahead(&self) -> DateTime<Utc> {
        self.now + TimeDelta::days(7)
    }

    /// Deadline of ongoing challenges: 23:59:59.999 seven days ahead.
    pub fn week_ahead_end_of_day(&self) -> DateTime<Utc> {
        end_of_day(self.week_ahead())
    }
}

fn end_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    let next_midnight = (at.date_naive() + Days::new(1)).and_time(NaiveTime::MIN).and_utc();
    next_midnight - TimeDelta::milliseconds(1)
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-03-20T10:00:00.000Z`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
