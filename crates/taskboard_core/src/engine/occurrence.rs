//! Occurrence resolver.
//!
//! # Responsibility
//! - Project a task snapshot onto concrete calendar dates of a window.
//!
//! # Invariants
//! - One-time tasks match only their start date; weekly tasks match only by
//!   weekday membership. The two rules never combine for one task.
//! - Weekly recurrence is unbounded in both directions; the start date is a
//!   time-of-day template, not a lower bound.
//! - At most one occurrence per `(task, date)`.
//! - Output is ordered by date, then slot, then input task order.
//! - Tasks failing `Task::validate_schedule` are skipped with a warning.

use crate::engine::completion::is_done;
use crate::engine::slot::{bucket_of, TimeSlot};
use crate::model::task::{format_date_key, Schedule, Task, TaskId};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use log::warn;
use std::collections::BTreeSet;

/// One concrete calendar appearance of a task. Recomputed per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub task: &'a Task,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub is_done: bool,
}

impl Occurrence<'_> {
    /// Identity of this occurrence; it has no other.
    pub fn key(&self) -> (TaskId, NaiveDate) {
        (self.task.id, self.date)
    }

    /// Start instant of this occurrence on its own date.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.task.start.time())
    }
}

/// True when `task` has an occurrence on `date`.
pub fn occurs_on(task: &Task, date: NaiveDate) -> bool {
    match &task.schedule {
        Schedule::OneTime { .. } => task.start.date() == date,
        Schedule::Weekly { repeat_mask, .. } => repeat_mask.contains(date.weekday()),
    }
}

/// Expands `tasks` over `window`.
///
/// Duplicate window dates are collapsed and dates are visited in ascending
/// order.
pub fn resolve<'a>(tasks: &'a [Task], window: &[NaiveDate]) -> Vec<Occurrence<'a>> {
    let dates: BTreeSet<NaiveDate> = window.iter().copied().collect();
    let resolvable: Vec<&Task> = tasks.iter().filter(|task| is_resolvable(task)).collect();

    let mut occurrences = Vec::new();
    for date in dates {
        let day_start = occurrences.len();
        for &task in &resolvable {
            if occurs_on(task, date) {
                occurrences.push(Occurrence {
                    task,
                    date,
                    slot: bucket_of(task.start),
                    is_done: is_done(task, date),
                });
            }
        }
        // Stable: equal slots keep input task order.
        occurrences[day_start..].sort_by_key(|occurrence| occurrence.slot);
    }
    occurrences
}

fn is_resolvable(task: &Task) -> bool {
    match task.validate_schedule() {
        Ok(()) => true,
        Err(err) => {
            warn!(
                "event=task_skipped module=engine status=warn task_id={} start_date={} reason=\"{}\"",
                task.id,
                format_date_key(task.start.date()),
                err
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{parse_wall_clock, RepeatMask, UserId};
    use chrono::Weekday;

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("valid date")
    }

    fn task(title: &str, start: &str, end: &str) -> Task {
        Task::new(
            UserId::new("emp"),
            title,
            parse_wall_clock(start).expect("valid start"),
            parse_wall_clock(end).expect("valid end"),
        )
    }

    #[test]
    fn weekly_task_ignores_its_own_start_date_when_weekday_is_off() {
        // 2024-03-05 is a Tuesday; the task repeats on Mondays only.
        let weekly = task("standup", "2024-03-05T09:00", "2024-03-05T09:15").with_schedule(
            Schedule::weekly(RepeatMask::from_weekdays([Weekday::Mon])),
        );
        assert!(!occurs_on(&weekly, date("2024-03-05")));
        assert!(occurs_on(&weekly, date("2024-03-04")));
        // Recurrence extends backwards past the template date.
        assert!(occurs_on(&weekly, date("2020-01-06")));
    }

    #[test]
    fn duplicate_window_dates_do_not_duplicate_occurrences() {
        let tasks = vec![task("once", "2024-03-05T14:10", "2024-03-05T15:00")];
        let window = [date("2024-03-05"), date("2024-03-05")];
        assert_eq!(resolve(&tasks, &window).len(), 1);
    }

    #[test]
    fn resolve_orders_by_date_then_slot_then_input_order() {
        let tasks = vec![
            task("late", "2024-03-05T10:00", "2024-03-05T11:00"),
            task("early-a", "2024-03-05T09:10", "2024-03-05T09:20"),
            task("early-b", "2024-03-05T09:00", "2024-03-05T09:20"),
            task("prev-day", "2024-03-04T23:00", "2024-03-04T23:30"),
        ];
        let window = [date("2024-03-05"), date("2024-03-04")];
        let titles: Vec<&str> = resolve(&tasks, &window)
            .iter()
            .map(|occurrence| occurrence.task.title.as_str())
            .collect();
        assert_eq!(titles, vec!["prev-day", "early-a", "early-b", "late"]);
    }

    #[test]
    fn invalid_tasks_are_omitted_without_blanking_the_window() {
        let tasks = vec![
            task("backwards", "2024-03-05T15:00", "2024-03-05T14:00"),
            task("fine", "2024-03-05T08:00", "2024-03-05T08:30"),
            task("empty-mask", "2024-03-05T08:00", "2024-03-05T08:30")
                .with_schedule(Schedule::weekly(RepeatMask::default())),
        ];
        let occurrences = resolve(&tasks, &[date("2024-03-05")]);
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].task.title, "fine");
    }

    #[test]
    fn occurrence_start_moves_template_time_onto_the_date() {
        let tasks = vec![task("gym", "2024-03-04T18:45", "2024-03-04T19:45")
            .with_schedule(Schedule::weekly(RepeatMask::from_weekdays([Weekday::Thu])))];
        let occurrences = resolve(&tasks, &[date("2024-03-07")]);
        assert_eq!(
            occurrences[0].start(),
            parse_wall_clock("2024-03-07T18:45").expect("valid instant")
        );
        assert_eq!(occurrences[0].slot.label(), "18:30");
        assert_eq!(occurrences[0].key(), (tasks[0].id, date("2024-03-07")));
    }
}
