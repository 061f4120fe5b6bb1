//! Daily completion records and date windows for task queries.

use super::{Task, TaskDomainError};
use crate::progress::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-user, per-day aggregate of completed tasks.
///
/// Keyed by `(user_id, date)` where `date` is the UTC calendar date of the
/// first completion that day. At most one record exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTaskRecord {
    user_id: UserId,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl DailyTaskRecord {
    /// Creates a record for `user_id` on `date`.
    #[must_use]
    pub const fn new(user_id: UserId, date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            date,
            created_at,
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns when the record was first created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A daily record together with the tasks completed on that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecordSummary {
    /// The daily record.
    pub record: DailyTaskRecord,
    /// Tasks linked to the record.
    pub tasks: Vec<Task>,
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a validated date range.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidDateRange`] when `from` is after
    /// `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, TaskDomainError> {
        if from > to {
            return Err(TaskDomainError::InvalidDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    /// Returns the first date in the range.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Returns the last date in the range.
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Returns `true` when `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Optional inclusive bounds on task deadlines for listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadlineWindow {
    /// Earliest deadline to include.
    pub start: Option<DateTime<Utc>>,
    /// Latest deadline to include.
    pub end: Option<DateTime<Utc>>,
}

impl DeadlineWindow {
    /// Window that matches every deadline.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Returns `true` when `deadline` falls inside the window.
    #[must_use]
    pub fn contains(&self, deadline: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| deadline >= start)
            && self.end.is_none_or(|end| deadline <= end)
    }
}
