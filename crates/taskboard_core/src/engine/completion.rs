//! Completion state model.
//!
//! # Responsibility
//! - Answer whether one occurrence is done.
//! - Turn a completion toggle into the minimal field delta to persist.
//!
//! # Invariants
//! - One-time tasks share one flag across every view of the task.
//! - Weekly tasks track each calendar date independently.
//! - Nothing here writes to storage; callers persist the returned patch and
//!   re-resolve.

use crate::engine::occurrence::occurs_on;
use crate::model::task::{Schedule, Task, TaskId};
use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimal completion delta for the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPatch {
    /// New value of a one-time task's done flag.
    Completed(bool),
    /// Full replacement set of a weekly task's done dates.
    CompletedDates(BTreeSet<NaiveDate>),
}

impl TaskPatch {
    /// Applies the patch to an in-memory task.
    ///
    /// Returns `false` and leaves `task` untouched when the patch targets the
    /// other task kind.
    pub fn apply_to(&self, task: &mut Task) -> bool {
        match (self, &mut task.schedule) {
            (Self::Completed(value), Schedule::OneTime { completed }) => {
                *completed = *value;
                true
            }
            (Self::CompletedDates(dates), Schedule::Weekly { completed_dates, .. }) => {
                *completed_dates = dates.clone();
                true
            }
            _ => {
                warn!(
                    "event=patch_ignored module=engine status=warn task_id={} reason=kind_mismatch",
                    task.id
                );
                false
            }
        }
    }

    pub fn matches_kind(&self, schedule: &Schedule) -> bool {
        matches!(
            (self, schedule),
            (Self::Completed(_), Schedule::OneTime { .. })
                | (Self::CompletedDates(_), Schedule::Weekly { .. })
        )
    }
}

/// Result of toggling against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Patched { task_id: TaskId, patch: TaskPatch },
    /// The id is not in the snapshot; no state was created.
    NoMatch { task_id: TaskId },
    /// The task exists but has no occurrence on `date`; no state was created.
    NoOccurrence { task_id: TaskId, date: NaiveDate },
}

impl ToggleOutcome {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Patched { task_id, .. }
            | Self::NoMatch { task_id }
            | Self::NoOccurrence { task_id, .. } => *task_id,
        }
    }

    pub fn is_patched(&self) -> bool {
        matches!(self, Self::Patched { .. })
    }
}

/// Whether the occurrence of `task` on `date` is done.
pub fn is_done(task: &Task, date: NaiveDate) -> bool {
    match &task.schedule {
        Schedule::OneTime { completed } => *completed,
        Schedule::Weekly {
            completed_dates, ..
        } => completed_dates.contains(&date),
    }
}

/// Flips the done state of the occurrence on `date`.
///
/// `date` is ignored for one-time tasks.
pub fn toggle(task: &Task, date: NaiveDate) -> TaskPatch {
    match &task.schedule {
        Schedule::OneTime { completed } => TaskPatch::Completed(!completed),
        Schedule::Weekly {
            completed_dates, ..
        } => {
            let mut next = completed_dates.clone();
            if !next.remove(&date) {
                next.insert(date);
            }
            TaskPatch::CompletedDates(next)
        }
    }
}

/// Looks `task_id` up in `tasks` and toggles its occurrence on `date`.
///
/// Only dates the task actually occurs on can be toggled.
pub fn toggle_in_snapshot(tasks: &[Task], task_id: TaskId, date: NaiveDate) -> ToggleOutcome {
    match tasks.iter().find(|task| task.id == task_id) {
        Some(task) if occurs_on(task, date) => ToggleOutcome::Patched {
            task_id,
            patch: toggle(task, date),
        },
        Some(_) => ToggleOutcome::NoOccurrence { task_id, date },
        None => ToggleOutcome::NoMatch { task_id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{parse_wall_clock, RepeatMask, UserId};
    use chrono::Weekday;
    use uuid::Uuid;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("valid date")
    }

    fn one_time() -> Task {
        Task::new(
            UserId::new("emp"),
            "call plumber",
            parse_wall_clock("2024-03-05T14:10").expect("valid start"),
            parse_wall_clock("2024-03-05T15:00").expect("valid end"),
        )
    }

    fn weekly_monday(done: &[&str]) -> Task {
        one_time().with_schedule(Schedule::Weekly {
            repeat_mask: RepeatMask::from_weekdays([Weekday::Mon]),
            completed_dates: done.iter().map(|text| date(text)).collect(),
        })
    }

    #[test]
    fn one_time_toggle_ignores_date() {
        let task = one_time();
        assert_eq!(toggle(&task, date("2024-03-05")), TaskPatch::Completed(true));
        assert_eq!(toggle(&task, date("1999-01-01")), TaskPatch::Completed(true));
    }

    #[test]
    fn weekly_toggle_twice_restores_state() {
        let mut task = weekly_monday(&["2024-03-11"]);
        for day in ["2024-03-11", "2024-03-18"] {
            let before = is_done(&task, date(day));
            assert!(toggle(&task, date(day)).apply_to(&mut task));
            assert_ne!(is_done(&task, date(day)), before);
            assert!(toggle(&task, date(day)).apply_to(&mut task));
            assert_eq!(is_done(&task, date(day)), before);
        }
    }

    #[test]
    fn weekly_dates_are_independent() {
        let mut task = weekly_monday(&[]);
        toggle(&task, date("2024-03-11")).apply_to(&mut task);
        assert!(is_done(&task, date("2024-03-11")));
        assert!(!is_done(&task, date("2024-03-18")));
        assert!(!is_done(&task, date("2024-03-04")));
    }

    #[test]
    fn patch_of_wrong_kind_is_ignored() {
        let mut task = weekly_monday(&["2024-03-11"]);
        let snapshot = task.clone();
        assert!(!TaskPatch::Completed(true).apply_to(&mut task));
        assert_eq!(task, snapshot);
        assert!(!TaskPatch::Completed(true).matches_kind(&task.schedule));
    }

    #[test]
    fn unknown_id_is_no_match() {
        let tasks = vec![one_time()];
        let missing = Uuid::new_v4();
        assert_eq!(
            toggle_in_snapshot(&tasks, missing, date("2024-03-05")),
            ToggleOutcome::NoMatch { task_id: missing }
        );
        assert_eq!(
            toggle_in_snapshot(&tasks, tasks[0].id, date("2024-03-05")),
            ToggleOutcome::Patched {
                task_id: tasks[0].id,
                patch: TaskPatch::Completed(true),
            }
        );
    }

    #[test]
    fn date_without_occurrence_is_not_toggled() {
        let tasks = vec![weekly_monday(&[]), one_time()];
        let tuesday = date("2024-03-12");
        assert_eq!(
            toggle_in_snapshot(&tasks, tasks[0].id, tuesday),
            ToggleOutcome::NoOccurrence {
                task_id: tasks[0].id,
                date: tuesday,
            }
        );

        let outcome = toggle_in_snapshot(&tasks, tasks[1].id, date("2024-03-06"));
        assert!(!outcome.is_patched());
        assert_eq!(outcome.task_id(), tasks[1].id);
    }
}
