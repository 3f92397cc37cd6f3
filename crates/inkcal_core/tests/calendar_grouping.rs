use chrono::{FixedOffset, NaiveDate};
use inkcal_core::calendar::{events_for_range, group_events_by_day, limit_events_per_day, DateRange};
use inkcal_core::config::CalendarEntry;
use inkcal_core::{parse_all_events, CalendarColors, CalendarEvent, PaperColor};
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn offset() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn calendars() -> Vec<CalendarEntry> {
    vec![
        CalendarEntry {
            entity_id: "calendar.family".to_string(),
            color: Some("blue".to_string()),
            display_name: Some("Family".to_string()),
        },
        CalendarEntry {
            entity_id: "calendar.work".to_string(),
            color: None,
            display_name: None,
        },
    ]
}

fn timed(summary: &str, start: &str, end: &str) -> Value {
    json!({"summary": summary, "start": {"dateTime": start}, "end": {"dateTime": end}})
}

fn sample_events() -> Vec<CalendarEvent> {
    let mut raw = BTreeMap::new();
    raw.insert(
        "calendar.family".to_string(),
        vec![
            json!({"summary": "Camping", "start": {"date": "2026-10-16"}, "end": {"date": "2026-10-19"}}),
            timed("Soccer", "2026-10-15T17:00:00-05:00", "2026-10-15T18:30:00-05:00"),
        ],
    );
    raw.insert(
        "calendar.work".to_string(),
        vec![
            timed("Standup", "2026-10-15T09:00:00-05:00", "2026-10-15T09:15:00-05:00"),
            timed("Planning", "2026-10-15T13:00:00-05:00", "2026-10-15T14:00:00-05:00"),
            timed("Late deploy", "2026-10-15T23:00:00-05:00", "2026-10-16T01:00:00-05:00"),
        ],
    );
    parse_all_events(&raw, &CalendarColors::assign(&calendars()), offset())
}

#[test]
fn three_day_all_day_event_lands_on_three_days() {
    let grouped = group_events_by_day(&sample_events(), None, date("2026-10-15"));
    for day in ["2026-10-16", "2026-10-17", "2026-10-18"] {
        let titles: Vec<&str> = grouped[&date(day)]
            .events
            .iter()
            .map(|event| event.title.as_str())
            .collect();
        assert!(titles.contains(&"Camping"), "{day} is missing Camping");
    }
    assert!(!grouped.contains_key(&date("2026-10-19")));
}

#[test]
fn timed_event_crossing_midnight_shows_on_both_days() {
    let grouped = group_events_by_day(&sample_events(), None, date("2026-10-15"));
    let on = |day: &str| {
        grouped[&date(day)]
            .events
            .iter()
            .any(|event| event.title == "Late deploy")
    };
    assert!(on("2026-10-15"));
    assert!(on("2026-10-16"));
}

#[test]
fn days_sort_all_day_first_then_by_start() {
    let grouped = group_events_by_day(&sample_events(), None, date("2026-10-15"));
    let friday: Vec<&str> = grouped[&date("2026-10-16")]
        .events
        .iter()
        .map(|event| event.title.as_str())
        .collect();
    assert_eq!(friday, vec!["Camping", "Late deploy"]);

    let thursday = &grouped[&date("2026-10-15")];
    assert!(thursday.is_today);
    let titles: Vec<&str> = thursday.events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Standup", "Planning", "Soccer", "Late deploy"]);
}

#[test]
fn limiting_reports_what_was_cut() {
    let grouped = group_events_by_day(&sample_events(), None, date("2026-10-15"));
    let limited = limit_events_per_day(grouped, 2);
    let thursday = &limited[&date("2026-10-15")];
    assert_eq!(thursday.events.len(), 2);
    assert_eq!(thursday.overflow_count, 2);
    assert_eq!(limited[&date("2026-10-17")].overflow_count, 0);
}

#[test]
fn range_clips_grouping() {
    let grouped = events_for_range(&sample_events(), date("2026-10-17"), 2, None);
    let days: Vec<NaiveDate> = grouped.keys().copied().collect();
    assert_eq!(days, vec![date("2026-10-17"), date("2026-10-18")]);
    assert!(DateRange::from_start(date("2026-10-17"), 2).contains(date("2026-10-18")));
}

#[test]
fn calendar_styles_follow_configuration() {
    let events = sample_events();
    let soccer = events.iter().find(|event| event.title == "Soccer").unwrap();
    assert_eq!(soccer.color, PaperColor::Blue);
    assert_eq!(soccer.calendar_name, "Family");

    let standup = events.iter().find(|event| event.title == "Standup").unwrap();
    assert_eq!(standup.calendar_name, "calendar.work");
    assert_ne!(standup.color, PaperColor::Black);
}
