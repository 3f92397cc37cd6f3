//! Hub event ingestion and day grouping.
//!
//! # Responsibility
//! - Turn raw hub payloads into validated `CalendarEvent`s.
//! - Attach events to the days they occupy and cap per-day counts.
//!
//! # Invariants
//! - A malformed event never aborts ingestion of the others.
//! - Per-day limits report what they cut.

pub mod group;
pub mod parse;

pub use group::{
    events_for_range, group_events_by_day, limit_events_per_day, month_grid_range, week_start,
    DateRange, DayEvents, DayMap,
};
pub use parse::{parse_all_events, parse_event, ParseError};
