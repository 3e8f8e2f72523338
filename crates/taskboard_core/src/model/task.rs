//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its schedule variants.
//! - Provide validation and wall-clock parsing helpers used at write time.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `end` must be strictly later than `start`.
//! - `Schedule::Weekly` always carries at least one enabled weekday.
//! - Instants are local wall-clock values; no time-zone conversion happens.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task on the board.
pub type TaskId = Uuid;

const WALL_CLOCK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const WALL_CLOCK_STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Opaque user reference owned by the external user store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weekly day-of-week selector, indexed Monday(0)..Sunday(6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatMask([bool; 7]);

impl RepeatMask {
    pub const fn new(days: [bool; 7]) -> Self {
        Self(days)
    }

    /// Builds a mask with exactly the given weekdays enabled.
    pub fn from_weekdays(weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        weekdays
            .into_iter()
            .fold(Self::default(), |mask, weekday| mask.with(weekday))
    }

    /// Returns a copy with `weekday` enabled.
    pub fn with(mut self, weekday: Weekday) -> Self {
        self.0[weekday.num_days_from_monday() as usize] = true;
        self
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0[weekday.num_days_from_monday() as usize]
    }

    /// True when no weekday is enabled.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|enabled| !enabled)
    }

    pub fn days(&self) -> [bool; 7] {
        self.0
    }

    /// Enabled weekdays in Monday-first order.
    pub fn weekdays(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(index, _)| Weekday::try_from(index as u8).ok())
    }
}

/// Recurrence kind plus the completion state that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Single occurrence on the start date; one shared done flag.
    OneTime { completed: bool },
    /// Unbounded weekly recurrence; done state tracked per calendar date.
    Weekly {
        repeat_mask: RepeatMask,
        #[serde(default)]
        completed_dates: BTreeSet<NaiveDate>,
    },
}

impl Schedule {
    pub fn one_time() -> Self {
        Self::OneTime { completed: false }
    }

    pub fn weekly(repeat_mask: RepeatMask) -> Self {
        Self::Weekly {
            repeat_mask,
            completed_dates: BTreeSet::new(),
        }
    }

    /// Maps an editor mask to a schedule. An empty mask means one-time.
    pub fn from_mask(repeat_mask: RepeatMask) -> Self {
        if repeat_mask.is_empty() {
            Self::one_time()
        } else {
            Self::weekly(repeat_mask)
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Self::Weekly { .. })
    }

    pub fn repeat_mask(&self) -> Option<RepeatMask> {
        match self {
            Self::OneTime { .. } => None,
            Self::Weekly { repeat_mask, .. } => Some(*repeat_mask),
        }
    }
}

/// Canonical task record shared by employer and helper views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Rich markup, opaque to the engine.
    pub description: String,
    /// Wall-clock start. For weekly tasks only its time-of-day matters.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub employer_id: UserId,
    pub assigned_to: Option<UserId>,
    pub schedule: Schedule,
}

impl Task {
    /// Creates a one-time task with a generated stable ID.
    pub fn new(
        employer_id: UserId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            start,
            end,
            employer_id,
            assigned_to: None,
            schedule: Schedule::one_time(),
        }
    }

    /// Creates a one-time task with a caller-provided ID.
    ///
    /// # Errors
    /// - Returns `TaskValidationError::NilId` for `Uuid::nil()`.
    pub fn with_id(
        id: TaskId,
        employer_id: UserId,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        let mut task = Self::new(employer_id, title, start, end);
        task.id = id;
        Ok(task)
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.schedule.is_recurring()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Full write-time validation.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        self.validate_schedule()
    }

    /// Checks only what occurrence resolution depends on: the time window
    /// and the weekly mask.
    pub fn validate_schedule(&self) -> Result<(), TaskValidationError> {
        if self.end <= self.start {
            return Err(TaskValidationError::InvalidTimeWindow {
                start: self.start,
                end: self.end,
            });
        }
        if let Schedule::Weekly { repeat_mask, .. } = &self.schedule {
            if repeat_mask.is_empty() {
                return Err(TaskValidationError::EmptyRepeatMask);
            }
        }
        Ok(())
    }
}

/// Validation failures for task writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
    InvalidTimeWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    EmptyRepeatMask,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::InvalidTimeWindow { start, end } => write!(
                f,
                "task end ({}) must be after start ({})",
                format_wall_clock(*end),
                format_wall_clock(*start)
            ),
            Self::EmptyRepeatMask => write!(f, "weekly task must repeat on at least one day"),
        }
    }
}

impl Error for TaskValidationError {}

/// Create input collected by the task editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Empty mask stores a one-time task.
    pub repeat_mask: RepeatMask,
    pub assigned_to: Option<UserId>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start,
            end,
            repeat_mask: RepeatMask::default(),
            assigned_to: None,
        }
    }

    /// Materializes a validated task owned by `employer_id`.
    pub fn into_task(self, employer_id: UserId) -> Result<Task, TaskValidationError> {
        let task = Task {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            start: self.start,
            end: self.end,
            employer_id,
            assigned_to: self.assigned_to,
            schedule: Schedule::from_mask(self.repeat_mask),
        };
        task.validate()?;
        Ok(task)
    }
}

/// Partial edit of an existing task. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub repeat_mask: Option<RepeatMask>,
    /// `Some(None)` clears the assignment.
    pub assigned_to: Option<Option<UserId>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the update in place. Switching task kind starts the new kind
    /// with fresh completion state; keeping the kind keeps it.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(start) = self.start {
            task.start = start;
        }
        if let Some(end) = self.end {
            task.end = end;
        }
        if let Some(assigned_to) = &self.assigned_to {
            task.assigned_to = assigned_to.clone();
        }
        if let Some(mask) = self.repeat_mask {
            match (&mut task.schedule, mask.is_empty()) {
                (Schedule::OneTime { .. }, true) => {}
                (Schedule::Weekly { repeat_mask, .. }, false) => *repeat_mask = mask,
                (schedule, _) => *schedule = Schedule::from_mask(mask),
            }
        }
    }
}

/// Parses a local wall-clock instant (`YYYY-MM-DDTHH:MM[:SS]`, `T` or space).
///
/// Returns `None` for anything unparsable.
pub fn parse_wall_clock(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    WALL_CLOCK_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Formats an instant in the canonical storage form.
pub fn format_wall_clock(value: NaiveDateTime) -> String {
    value.format(WALL_CLOCK_STORAGE_FORMAT).to_string()
}

/// Formats a calendar date as a completion key (`YYYY-MM-DD`).
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_KEY_FORMAT).ok()
}

/// Monday=0 .. Sunday=6.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}
