//! Day grouping and per-day limits.
//!
//! # Invariants
//! - A multi-day event is attached to every day it occupies inside the
//!   requested range, and always to at least its start day.
//! - Within a day, all-day events come first, then ascending start, then
//!   title.
//! - Limiting never drops events silently: the cut count is kept in
//!   `DayEvents::overflow_count`.

use crate::model::event::CalendarEvent;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Events attached to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEvents {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
    pub is_today: bool,
    /// Events removed by `limit_events_per_day`.
    pub overflow_count: usize,
}

pub type DayMap = BTreeMap<NaiveDate, DayEvents>;

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `days` days starting at `start`.
    pub fn from_start(start: NaiveDate, days: u32) -> Self {
        Self {
            start,
            end: start + Duration::days(i64::from(days)),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset))
    }
}

/// Last day an event occupies for grouping purposes.
///
/// Timed events ending exactly at midnight do not spill onto the next day.
fn last_grouping_day(event: &CalendarEvent) -> NaiveDate {
    let start = event.start_date();
    let last = if event.all_day {
        event.end_inclusive_date()
    } else if event.end.time() == NaiveTime::MIN && event.end > event.start {
        event.end.date_naive() - Duration::days(1)
    } else {
        event.end.date_naive()
    };
    last.max(start)
}

/// Groups events onto the days they occupy, optionally limited to `range`.
pub fn group_events_by_day(
    events: &[CalendarEvent],
    range: Option<DateRange>,
    today: NaiveDate,
) -> DayMap {
    let mut by_day: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        let last = last_grouping_day(event);
        let mut current = event.start_date();
        if let Some(range) = range {
            current = current.max(range.start);
        }
        while current <= last {
            if let Some(range) = range {
                if current >= range.end {
                    break;
                }
            }
            by_day.entry(current).or_default().push(event.clone());
            current += Duration::days(1);
        }
    }

    by_day
        .into_iter()
        .map(|(date, mut events)| {
            events.sort_by(|a, b| {
                (!a.all_day, a.start)
                    .cmp(&(!b.all_day, b.start))
                    .then_with(|| a.title.cmp(&b.title))
            });
            (
                date,
                DayEvents {
                    date,
                    events,
                    is_today: date == today,
                    overflow_count: 0,
                },
            )
        })
        .collect()
}

/// Keeps at most `max_events` per day, recording how many were cut.
pub fn limit_events_per_day(days: DayMap, max_events: usize) -> DayMap {
    days.into_iter()
        .map(|(date, mut day)| {
            let total = day.events.len();
            day.events.truncate(max_events);
            day.overflow_count = total - day.events.len();
            (date, day)
        })
        .collect()
}

/// Groups `days_ahead` days starting at `today`.
pub fn events_for_range(
    events: &[CalendarEvent],
    today: NaiveDate,
    days_ahead: u32,
    max_per_day: Option<usize>,
) -> DayMap {
    let grouped = group_events_by_day(
        events,
        Some(DateRange::from_start(today, days_ahead)),
        today,
    );
    match max_per_day {
        Some(max) => limit_events_per_day(grouped, max),
        None => grouped,
    }
}

/// Monday before (or on) the 1st through the Sunday after (or on) the last
/// day of the month, as a half-open range.
pub fn month_grid_range(year: i32, month: u32) -> Option<DateRange> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_month - Duration::days(1);

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_monday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_monday()) + 1);
    Some(DateRange::new(start, end))
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}
