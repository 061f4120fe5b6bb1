//! Task status and its transition table.

use super::ParseTaskStatusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task lifecycle status.
///
/// `Completed` is terminal. `NotDone` and `Overdue` may flip between each
/// other as the deadline moves relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Open with a deadline in the future.
    NotDone,
    /// Open with a deadline at or before the current time.
    Overdue,
    /// Completed; no further transitions.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotDone => "NOT_DONE",
            Self::Overdue => "OVERDUE",
            Self::Completed => "COMPLETED",
        }
    }

    /// Returns the open status implied by `deadline` at `now`.
    ///
    /// A deadline equal to `now` counts as overdue.
    #[must_use]
    pub fn for_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if deadline > now {
            Self::NotDone
        } else {
            Self::Overdue
        }
    }

    /// Returns `true` if no transition leaves this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns `true` if moving from `self` to `target` is permitted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::NotDone, Self::Overdue | Self::Completed)
                | (Self::Overdue, Self::NotDone | Self::Completed)
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "NOT_DONE" => Ok(Self::NotDone),
            "OVERDUE" => Ok(Self::Overdue),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}
