//! Calendar event domain model.
//!
//! # Responsibility
//! - Define the canonical event record shared by every view and layout pass.
//! - Provide the identity key used to deduplicate events across days.
//!
//! # Invariants
//! - `end` is never earlier than `start`.
//! - `calendar_id` is never empty.
//! - All-day events use an exclusive end: the last occupied day is
//!   `end.date() - 1 day`.

use crate::model::color::PaperColor;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of an event for deduplication.
///
/// Two events are the same when calendar, title and both RFC 3339 timestamps
/// match. Multi-day events are attached to every day they cover, so the same
/// key shows up once per day before dedup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub calendar_id: String,
    pub title: String,
    pub start: String,
    pub end: String,
}

impl Display for EventKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.calendar_id, self.title, self.start, self.end
        )
    }
}

/// Canonical event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CalendarEventRecord")]
pub struct CalendarEvent {
    /// Source calendar entity id, e.g. `calendar.family`.
    pub calendar_id: String,
    /// Human-readable calendar name used in legends.
    pub calendar_name: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    /// Exclusive for all-day events.
    pub end: DateTime<FixedOffset>,
    pub all_day: bool,
    /// Palette color assigned to the source calendar.
    pub color: PaperColor,
}

impl CalendarEvent {
    /// Creates a validated event with the calendar id as display name and a
    /// black color.
    ///
    /// # Errors
    /// - `EmptyCalendarId` when `calendar_id` is blank.
    /// - `InvalidWindow` when `end < start`.
    pub fn new(
        calendar_id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        all_day: bool,
    ) -> Result<Self, EventValidationError> {
        let calendar_id = calendar_id.into();
        let event = Self {
            calendar_name: calendar_id.clone(),
            calendar_id,
            title: title.into(),
            start,
            end,
            all_day,
            color: PaperColor::Black,
        };
        event.validate()?;
        Ok(event)
    }

    /// Replaces display name and color, keeping identity untouched.
    pub fn with_calendar_style(mut self, name: impl Into<String>, color: PaperColor) -> Self {
        self.calendar_name = name.into();
        self.color = color;
        self
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.calendar_id.trim().is_empty() {
            return Err(EventValidationError::EmptyCalendarId);
        }
        if self.end < self.start {
            return Err(EventValidationError::InvalidWindow {
                start: self.start.to_rfc3339(),
                end: self.end.to_rfc3339(),
            });
        }
        Ok(())
    }

    /// Returns the dedup identity of this event.
    pub fn key(&self) -> EventKey {
        EventKey {
            calendar_id: self.calendar_id.clone(),
            title: self.title.clone(),
            start: self.start.to_rfc3339(),
            end: self.end.to_rfc3339(),
        }
    }

    /// Local calendar date the event starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last day the event occupies.
    ///
    /// All-day events end exclusively, so the last day is one before
    /// `end.date()`. Timed events report `end.date()` unchanged, including
    /// those ending exactly at midnight.
    pub fn end_inclusive_date(&self) -> NaiveDate {
        let end = self.end.date_naive();
        if self.all_day {
            end - Duration::days(1)
        } else {
            end
        }
    }

    /// Whether this is an all-day event covering more than one day.
    pub fn spans_multiple_days(&self) -> bool {
        self.all_day && self.end_inclusive_date() > self.start_date()
    }

    /// Start time as fractional hours since local midnight.
    pub fn start_hour(&self) -> f32 {
        self.start.hour() as f32 + self.start.minute() as f32 / 60.0
    }

    /// Duration in fractional hours.
    pub fn duration_hours(&self) -> f32 {
        (self.end - self.start).num_seconds() as f32 / 3600.0
    }

    /// Display label: `HH:MM AM title` for timed events when requested.
    pub fn label(&self, show_time: bool) -> String {
        if show_time && !self.all_day {
            format!("{} {}", self.start.format("%I:%M %p"), self.title)
        } else {
            self.title.clone()
        }
    }
}

/// Wire shape used to run validation on deserialize.
#[derive(Deserialize)]
struct CalendarEventRecord {
    calendar_id: String,
    #[serde(default)]
    calendar_name: Option<String>,
    title: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    #[serde(default)]
    all_day: bool,
    #[serde(default)]
    color: PaperColor,
}

impl TryFrom<CalendarEventRecord> for CalendarEvent {
    type Error = EventValidationError;

    fn try_from(value: CalendarEventRecord) -> Result<Self, Self::Error> {
        let name = value
            .calendar_name
            .unwrap_or_else(|| value.calendar_id.clone());
        let event = Self::new(
            value.calendar_id,
            value.title,
            value.start,
            value.end,
            value.all_day,
        )?;
        Ok(event.with_calendar_style(name, value.color))
    }
}

/// Event record invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyCalendarId,
    InvalidWindow { start: String, end: String },
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCalendarId => write!(f, "event calendar_id must not be empty"),
            Self::InvalidWindow { start, end } => {
                write!(f, "event end ({end}) must be >= start ({start})")
            }
        }
    }
}

impl Error for EventValidationError {}

#[cfg(test)]
mod tests {
    use super::{CalendarEvent, EventValidationError};
    use chrono::{DateTime, FixedOffset};

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).expect("valid timestamp")
    }

    #[test]
    fn all_day_end_is_exclusive() {
        let event = CalendarEvent::new(
            "calendar.family",
            "Trip",
            at("2026-10-12T00:00:00-05:00"),
            at("2026-10-15T00:00:00-05:00"),
            true,
        )
        .unwrap();
        assert_eq!(event.end_inclusive_date().to_string(), "2026-10-14");
        assert!(event.spans_multiple_days());
    }

    #[test]
    fn single_all_day_is_not_multi_day() {
        let event = CalendarEvent::new(
            "calendar.family",
            "Holiday",
            at("2026-10-12T00:00:00-05:00"),
            at("2026-10-13T00:00:00-05:00"),
            true,
        )
        .unwrap();
        assert!(!event.spans_multiple_days());
    }

    #[test]
    fn timed_event_ending_at_midnight_keeps_end_date() {
        let event = CalendarEvent::new(
            "calendar.work",
            "Late shift",
            at("2026-10-12T18:00:00-05:00"),
            at("2026-10-13T00:00:00-05:00"),
            false,
        )
        .unwrap();
        assert_eq!(event.end_inclusive_date().to_string(), "2026-10-13");
        assert!(!event.spans_multiple_days());
        assert!((event.start_hour() - 18.0).abs() < f32::EPSILON);
        assert!((event.duration_hours() - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_reversed_window() {
        let err = CalendarEvent::new(
            "calendar.work",
            "Broken",
            at("2026-10-12T10:00:00Z"),
            at("2026-10-12T09:00:00Z"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, EventValidationError::InvalidWindow { .. }));
    }

    #[test]
    fn rejects_blank_calendar_id() {
        let err = CalendarEvent::new(
            "  ",
            "x",
            at("2026-10-12T10:00:00Z"),
            at("2026-10-12T11:00:00Z"),
            false,
        )
        .unwrap_err();
        assert_eq!(err, EventValidationError::EmptyCalendarId);
    }
}
