//! Board snapshot consumed by view adapters.
//!
//! A `Board` owns one fetched task snapshot plus the viewing window. Every
//! accessor re-resolves from that snapshot; after a mutation callers refetch
//! and build a new board.

use crate::engine::completion::is_done;
use crate::engine::occurrence::{resolve, Occurrence};
use crate::engine::slot::{group_by_day, group_by_day_and_slot, DayGrid, SlotGrid};
use crate::engine::window::ViewGranularity;
use crate::model::task::{Task, TaskId};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tasks: Vec<Task>,
    granularity: ViewGranularity,
    pivot: NaiveDate,
    dates: Vec<NaiveDate>,
}

impl Board {
    pub fn new(tasks: Vec<Task>, granularity: ViewGranularity, pivot: NaiveDate) -> Self {
        Self {
            tasks,
            granularity,
            pivot,
            dates: granularity.window_dates(pivot),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn granularity(&self) -> ViewGranularity {
        self.granularity
    }

    pub fn pivot(&self) -> NaiveDate {
        self.pivot
    }

    /// Window dates in ascending order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn occurrences(&self) -> Vec<Occurrence<'_>> {
        resolve(&self.tasks, &self.dates)
    }

    /// Cells for the day, three-day and week grids.
    pub fn slot_grid(&self) -> SlotGrid<'_> {
        group_by_day_and_slot(self.occurrences())
    }

    /// Cells for the month grid.
    pub fn day_grid(&self) -> DayGrid<'_> {
        group_by_day(self.occurrences())
    }

    /// Done state of one task on one date; `None` if the id is unknown.
    pub fn is_done(&self, task_id: TaskId, date: NaiveDate) -> Option<bool> {
        self.tasks
            .iter()
            .find(|task| task.id == task_id)
            .map(|task| is_done(task, date))
    }
}
