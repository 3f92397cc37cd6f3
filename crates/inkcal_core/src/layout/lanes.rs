//! Multi-day all-day event lane packing.
//!
//! # Responsibility
//! - Turn multi-day all-day events touching a row of days into row-clipped
//!   spans.
//! - Stack spans into the fewest lanes a greedy first-fit finds, in a stable
//!   order.
//!
//! # Invariants
//! - Two spans in one lane never share a day index.
//! - Every qualifying event is either in exactly one lane or counted in
//!   `overflow_count`; `placed + overflow == qualifying`.
//! - One-day all-day events and timed events never become spans.

use crate::model::event::{CalendarEvent, EventKey};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Row-clipped portion of a multi-day event, as inclusive day indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub event: CalendarEvent,
}

impl Span {
    /// `end - start`; zero for a span clipped down to one day.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        !(self.end < other.start || self.start > other.end)
    }
}

/// Horizontal strip of non-overlapping spans, ordered by insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lane {
    spans: Vec<Span>,
}

impl Lane {
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn accepts(&self, span: &Span) -> bool {
        self.spans.iter().all(|existing| !existing.overlaps(span))
    }
}

/// Lane packing result for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanePacking {
    pub lanes: Vec<Lane>,
    /// Spans dropped because every lane was taken.
    pub overflow_count: usize,
    /// Keys of every event classified as a span, placed or not. Day cells
    /// skip these so a bar is never repeated inside each cell.
    pub consumed_keys: BTreeSet<EventKey>,
}

impl LanePacking {
    /// Number of spans that made it into a lane.
    pub fn placed_count(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }

    pub fn is_consumed(&self, event: &CalendarEvent) -> bool {
        self.consumed_keys.contains(&event.key())
    }
}

/// Packs multi-day all-day events of a row into at most `max_lanes` lanes.
///
/// `events_on` returns the events attached to a day; an event attached to
/// several days is considered once.
pub fn pack_spans<'a, F, I>(row_dates: &[NaiveDate], events_on: F, max_lanes: usize) -> LanePacking
where
    F: Fn(NaiveDate) -> I,
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let (Some(&row_first), Some(&row_last)) = (row_dates.first(), row_dates.last()) else {
        return LanePacking::default();
    };

    let mut consumed_keys = BTreeSet::new();
    let mut spans = Vec::new();
    for day in row_dates {
        for event in events_on(*day) {
            if !event.spans_multiple_days() {
                continue;
            }
            let start = event.start_date();
            let end = event.end_inclusive_date();
            if start > row_last || end < row_first {
                continue;
            }
            let key = event.key();
            if consumed_keys.contains(&key) {
                continue;
            }
            if let Some(span) = clip_to_row(row_dates, start, end, event) {
                consumed_keys.insert(key);
                spans.push(span);
            }
        }
    }

    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.width().cmp(&b.width()))
            .then_with(|| a.event.title.cmp(&b.event.title))
    });

    let span_count = spans.len();
    let mut lanes: Vec<Lane> = Vec::new();
    let mut overflow_count = 0;
    for span in spans {
        if let Some(lane) = lanes.iter_mut().find(|lane| lane.accepts(&span)) {
            lane.spans.push(span);
        } else if lanes.len() < max_lanes {
            lanes.push(Lane { spans: vec![span] });
        } else {
            overflow_count += 1;
        }
    }

    debug!(
        "event=lane_pack module=layout status=ok row_start={} spans={} lanes={} overflow={}",
        row_first,
        span_count,
        lanes.len(),
        overflow_count
    );

    LanePacking {
        lanes,
        overflow_count,
        consumed_keys,
    }
}

/// Convenience wrapper over a plain day map.
pub fn pack_spans_from_map(
    row_dates: &[NaiveDate],
    events_by_day: &BTreeMap<NaiveDate, Vec<CalendarEvent>>,
    max_lanes: usize,
) -> LanePacking {
    pack_spans(
        row_dates,
        |day| events_by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]),
        max_lanes,
    )
}

fn clip_to_row(
    row_dates: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
    event: &CalendarEvent,
) -> Option<Span> {
    let start_index = row_dates.iter().position(|day| *day >= start)?;
    let end_index = row_dates.iter().rposition(|day| *day <= end)?;
    (start_index <= end_index).then(|| Span {
        start: start_index,
        end: end_index,
        event: event.clone(),
    })
}
