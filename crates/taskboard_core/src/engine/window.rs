//! Viewing windows for the four board granularities.
//!
//! # Invariants
//! - Weeks start on Monday.
//! - Month windows cover whole weeks: the Monday on or before the 1st through
//!   the Sunday on or after the last day.
//! - Returned dates are ascending and contiguous.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Board granularity chosen by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewGranularity {
    Day,
    ThreeDay,
    Week,
    Month,
}

impl ViewGranularity {
    /// Dates shown for `pivot`. Empty only at the edges of chrono's range.
    pub fn window_dates(self, pivot: NaiveDate) -> Vec<NaiveDate> {
        let span = match self {
            Self::Day => Some((pivot, 1)),
            Self::ThreeDay => Some((pivot, 3)),
            Self::Week => week_start(pivot).map(|monday| (monday, 7)),
            Self::Month => month_span(pivot),
        };
        span.map(|(first, count)| first.iter_days().take(count).collect())
            .unwrap_or_default()
    }

    /// Moves `pivot` by `steps` pages of this granularity (negative = back).
    ///
    /// Month steps clamp the day to the end of the target month.
    pub fn shift(self, pivot: NaiveDate, steps: i32) -> Option<NaiveDate> {
        let magnitude = u64::from(steps.unsigned_abs());
        let forward = steps >= 0;
        let by_days = |days_per_step: u64| {
            let days = Days::new(magnitude * days_per_step);
            if forward {
                pivot.checked_add_days(days)
            } else {
                pivot.checked_sub_days(days)
            }
        };

        match self {
            Self::Day => by_days(1),
            Self::ThreeDay => by_days(3),
            Self::Week => by_days(7),
            Self::Month => {
                let months = Months::new(steps.unsigned_abs());
                if forward {
                    pivot.checked_add_months(months)
                } else {
                    pivot.checked_sub_months(months)
                }
            }
        }
    }

    /// Month cells list tasks per day; every other granularity uses slots.
    pub fn shows_time_slots(self) -> bool {
        !matches!(self, Self::Month)
    }
}

fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

fn week_end(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(6 - date.weekday().num_days_from_monday())))
}

fn month_span(pivot: NaiveDate) -> Option<(NaiveDate, usize)> {
    let first_of_month = pivot.with_day(1)?;
    let last_of_month = first_of_month
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    let first = week_start(first_of_month)?;
    let last = week_end(last_of_month)?;
    let count = usize::try_from((last - first).num_days() + 1).ok()?;
    Some((first, count))
}
