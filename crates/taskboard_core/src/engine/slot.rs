//! Half-hour slot bucketing.
//!
//! # Invariants
//! - There are exactly 48 slots per day, `00:00` through `23:30`.
//! - `bucket_of` truncates to the top of the current half-hour.
//! - Grouping keeps the resolver's order inside each cell; the position in a
//!   cell is the stacking index and carries no other meaning.

use crate::engine::occurrence::Occurrence;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const SLOTS_PER_DAY: u8 = 48;
pub const SLOT_MINUTES: u32 = 30;

/// One of the 48 half-hour buckets of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u8);

impl TimeSlot {
    pub fn from_index(index: u8) -> Option<Self> {
        (index < SLOTS_PER_DAY).then_some(Self(index))
    }

    pub fn from_time(time: NaiveTime) -> Self {
        let index = time.hour() * 2 + time.minute() / SLOT_MINUTES;
        Self(index as u8)
    }

    /// Parses an on-boundary `HH:MM` label.
    pub fn parse(label: &str) -> Option<Self> {
        let (hour, minute) = label.trim().split_once(':')?;
        if hour.len() != 2 || minute.len() != 2 {
            return None;
        }
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        if hour > 23 || !(minute == 0 || minute == SLOT_MINUTES) {
            return None;
        }
        Self::from_index((hour * 2 + minute / SLOT_MINUTES) as u8)
    }

    /// All slots of a day in time order.
    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (0..SLOTS_PER_DAY).map(Self)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0 / 2)
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0 % 2) * SLOT_MINUTES
    }

    pub fn start_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }

    /// 24-hour `HH:MM` label.
    pub fn label(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }

    /// Row label used by the time grid, e.g. `9:00 AM`, `12:30 PM`.
    pub fn label_12h(self) -> String {
        let hour = self.hour();
        let meridiem = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour % 12 {
            0 => 12,
            other => other,
        };
        format!("{display_hour}:{:02} {meridiem}", self.minute())
    }
}

impl Display for TimeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Maps an instant to its half-hour bucket. Total over all valid instants.
pub fn bucket_of(instant: NaiveDateTime) -> TimeSlot {
    TimeSlot::from_time(instant.time())
}

/// `(date, slot)` cells for day, three-day and week grids.
pub type SlotGrid<'a> = BTreeMap<(NaiveDate, TimeSlot), Vec<Occurrence<'a>>>;

/// Per-date cells for the month grid, which shows no time slots.
pub type DayGrid<'a> = BTreeMap<NaiveDate, Vec<Occurrence<'a>>>;

pub fn group_by_day_and_slot<'a>(
    occurrences: impl IntoIterator<Item = Occurrence<'a>>,
) -> SlotGrid<'a> {
    let mut grid = SlotGrid::new();
    for occurrence in occurrences {
        grid.entry((occurrence.date, occurrence.slot))
            .or_default()
            .push(occurrence);
    }
    grid
}

pub fn group_by_day<'a>(occurrences: impl IntoIterator<Item = Occurrence<'a>>) -> DayGrid<'a> {
    let mut grid = DayGrid::new();
    for occurrence in occurrences {
        grid.entry(occurrence.date).or_default().push(occurrence);
    }
    grid
}
