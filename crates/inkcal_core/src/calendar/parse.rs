//! Hub calendar payload parsing.
//!
//! The hub returns events as `{summary, start, end}` where `start`/`end`
//! carry either a `date` (all-day, exclusive end) or a `dateTime`.

use crate::model::color::CalendarColors;
use crate::model::event::{CalendarEvent, EventValidationError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const UNTITLED_EVENT: &str = "Untitled Event";

#[derive(Debug, Deserialize)]
struct HubEvent {
    #[serde(default)]
    summary: Option<String>,
    start: HubTime,
    end: HubTime,
}

#[derive(Debug, Default, Deserialize)]
struct HubTime {
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "dateTime")]
    date_time: Option<String>,
}

/// Event payload parse failures.
#[derive(Debug)]
pub enum ParseError {
    Json(serde_json::Error),
    MissingTime,
    InvalidDate(String),
    InvalidDateTime(String),
    Validation(EventValidationError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid event payload: {err}"),
            Self::MissingTime => write!(f, "event start/end carry neither date nor dateTime"),
            Self::InvalidDate(value) => write!(f, "invalid all-day date: {value}"),
            Self::InvalidDateTime(value) => write!(f, "invalid event dateTime: {value}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<EventValidationError> for ParseError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Parses one hub event for `calendar_id`.
///
/// All-day dates are anchored at local midnight in `offset`. Timed events are
/// converted into `offset` and flagged all-day when they run from midnight
/// to midnight for at least one full day.
pub fn parse_event(
    value: &serde_json::Value,
    calendar_id: &str,
    colors: &CalendarColors,
    offset: FixedOffset,
) -> Result<CalendarEvent, ParseError> {
    let raw = HubEvent::deserialize(value)?;
    let title = raw
        .summary
        .filter(|summary| !summary.trim().is_empty())
        .unwrap_or_else(|| UNTITLED_EVENT.to_string());

    let (start, end, all_day) = match (&raw.start.date, &raw.end.date) {
        (Some(start), Some(end)) => (
            local_midnight(parse_date(start)?, offset)?,
            local_midnight(parse_date(end)?, offset)?,
            true,
        ),
        _ => {
            let start = parse_date_time(raw.start.date_time.as_deref(), offset)?;
            let end = parse_date_time(raw.end.date_time.as_deref(), offset)?;
            let midnight_to_midnight = start.num_seconds_from_midnight() == 0
                && end.num_seconds_from_midnight() == 0
                && (end - start).num_days() >= 1;
            (start, end, midnight_to_midnight)
        }
    };

    let style = colors.style_for(calendar_id);
    let event = CalendarEvent::new(calendar_id, title, start, end, all_day)?;
    Ok(event.with_calendar_style(style.display_name, style.color))
}

/// Parses every calendar's raw events, skipping malformed entries.
///
/// Output is sorted by `(start, title)`.
pub fn parse_all_events(
    raw: &BTreeMap<String, Vec<serde_json::Value>>,
    colors: &CalendarColors,
    offset: FixedOffset,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for (calendar_id, items) in raw {
        for item in items {
            match parse_event(item, calendar_id, colors, offset) {
                Ok(event) => events.push(event),
                Err(err) => warn!(
                    "event=event_parse module=calendar status=skipped calendar={} error={}",
                    calendar_id, err
                ),
            }
        }
    }
    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
    info!(
        "event=events_parsed module=calendar status=ok calendars={} events={}",
        raw.len(),
        events.len()
    );
    events
}

fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::InvalidDate(value.to_string()))
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> Result<DateTime<FixedOffset>, ParseError> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ParseError::InvalidDate(date.to_string()))
}

fn parse_date_time(
    value: Option<&str>,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ParseError> {
    let value = value.ok_or(ParseError::MissingTime)?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&offset));
    }
    // Offset-less timestamps are taken as already local.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .ok_or_else(|| ParseError::InvalidDateTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_all_events, parse_event, ParseError};
    use crate::config::CalendarEntry;
    use crate::model::color::{CalendarColors, PaperColor};
    use chrono::FixedOffset;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn colors() -> CalendarColors {
        CalendarColors::assign(&[CalendarEntry {
            entity_id: "calendar.family".to_string(),
            color: Some("green".to_string()),
            display_name: Some("Family".to_string()),
        }])
    }

    fn chicago() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn parses_all_day_event_with_exclusive_end() {
        let value = json!({
            "summary": "Camping",
            "start": {"date": "2026-10-16"},
            "end": {"date": "2026-10-19"}
        });
        let event = parse_event(&value, "calendar.family", &colors(), chicago()).unwrap();
        assert!(event.all_day);
        assert_eq!(event.start_date().to_string(), "2026-10-16");
        assert_eq!(event.end_inclusive_date().to_string(), "2026-10-18");
        assert_eq!(event.color, PaperColor::Green);
        assert_eq!(event.calendar_name, "Family");
    }

    #[test]
    fn converts_timed_event_into_local_offset() {
        let value = json!({
            "summary": "Dentist",
            "start": {"dateTime": "2026-10-16T15:00:00+00:00"},
            "end": {"dateTime": "2026-10-16T16:00:00+00:00"}
        });
        let event = parse_event(&value, "calendar.family", &colors(), chicago()).unwrap();
        assert!(!event.all_day);
        assert!((event.start_hour() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn midnight_to_midnight_timed_event_is_all_day() {
        let value = json!({
            "start": {"dateTime": "2026-10-16T00:00:00-05:00"},
            "end": {"dateTime": "2026-10-18T00:00:00-05:00"}
        });
        let event = parse_event(&value, "calendar.family", &colors(), chicago()).unwrap();
        assert!(event.all_day);
        assert_eq!(event.title, "Untitled Event");
    }

    #[test]
    fn missing_times_are_rejected() {
        let value = json!({"summary": "x", "start": {}, "end": {}});
        let err = parse_event(&value, "calendar.family", &colors(), chicago()).unwrap_err();
        assert!(matches!(err, ParseError::MissingTime));
    }

    #[test]
    fn parse_all_skips_bad_items_and_sorts() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "calendar.family".to_string(),
            vec![
                json!({"summary": "B", "start": {"dateTime": "2026-10-16T09:00:00-05:00"}, "end": {"dateTime": "2026-10-16T10:00:00-05:00"}}),
                json!({"summary": "broken", "start": {"date": "nope"}, "end": {"date": "nope"}}),
                json!({"summary": "A", "start": {"dateTime": "2026-10-16T09:00:00-05:00"}, "end": {"dateTime": "2026-10-16T09:30:00-05:00"}}),
            ],
        );
        let events = parse_all_events(&raw, &colors(), chicago());
        let titles: Vec<&str> = events.iter().map(|event| event.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
