//! Time-proportional placement of one day's events in a column.
//!
//! # Responsibility
//! - Map event start times onto a fixed pixel window and size blocks by
//!   duration.
//! - Push blocks down instead of letting them overlap.
//!
//! # Invariants
//! - Blocks come out in iteration order with strictly increasing `top`, and
//!   `blocks[i].top + blocks[i].height <= blocks[i + 1].top`.
//! - Every block is at least `min_block_height` tall and ends inside the
//!   region; an event that cannot fit at that height is counted as overflow.
//! - Never panics on degenerate input (empty region, empty window).

use crate::layout::text::{wrap_text, TextMeasure};
use crate::layout::Region;
use crate::model::event::CalendarEvent;
use log::debug;
use serde::{Deserialize, Serialize};

/// Knobs for the placer. Defaults follow the four-day column view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// First hour mapped to the region top.
    pub start_hour: f32,
    /// Hour mapped to the region bottom.
    pub end_hour: f32,
    pub min_block_height: u32,
    pub line_height: u32,
    /// Vertical padding inside a block, split above/below the text.
    pub inner_padding: u32,
    /// Space left between consecutive blocks.
    pub gap: u32,
    /// Upper bound on wrapped lines per block.
    pub max_lines: usize,
    /// Horizontal space inside a block not available to text.
    pub text_inset: u32,
    /// Prefix timed events with their start time.
    pub show_time: bool,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            start_hour: 6.0,
            end_hour: 22.0,
            min_block_height: 22,
            line_height: 14,
            inner_padding: 4,
            gap: 2,
            max_lines: 5,
            text_inset: 6,
            show_time: true,
        }
    }
}

/// One positioned event block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    pub top: u32,
    pub height: u32,
    pub lines: Vec<String>,
    pub event: CalendarEvent,
}

impl PlacedBlock {
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }
}

/// Placement result for one day column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayPlacement {
    pub blocks: Vec<PlacedBlock>,
    /// Events skipped for lack of vertical space.
    pub overflow_count: usize,
}

/// Places a day's events inside `region`.
///
/// Events are visited all-day first, then by start time. Each block starts
/// at `max(time-based top, cursor)` and moves the cursor past itself plus
/// `gap`, so a busy morning pushes later events down rather than overlapping
/// them.
pub fn place_day_events<'a, I, M>(
    events: I,
    region: Region,
    config: &PlacerConfig,
    measure: &M,
) -> DayPlacement
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    M: TextMeasure + ?Sized,
{
    let mut ordered: Vec<&CalendarEvent> = events.into_iter().collect();
    ordered.sort_by(|a, b| (!a.all_day, a.start).cmp(&(!b.all_day, b.start)));

    let window_hours = config.end_hour - config.start_hour;
    if region.height == 0 || window_hours <= 0.0 || !window_hours.is_finite() {
        return DayPlacement {
            blocks: Vec::new(),
            overflow_count: ordered.len(),
        };
    }

    let pixels_per_hour = region.height as f32 / window_hours;
    let bottom = region.bottom();
    let all_day_cap = (region.height / 3)
        .min(config.min_block_height.saturating_mul(3))
        .max(config.min_block_height);
    let text_width = region.width.saturating_sub(config.text_inset);

    let mut placement = DayPlacement::default();
    let mut cursor = region.y;

    for event in ordered {
        let (time_top, duration_height) = if event.all_day {
            (region.y, config.min_block_height)
        } else {
            let height = (event.duration_hours().max(0.0) * pixels_per_hour) as u32;
            (hour_to_y(event.start_hour(), region, config), height)
        };

        let top = time_top.max(cursor);
        if top >= bottom || bottom - top < config.min_block_height {
            placement.overflow_count += 1;
            continue;
        }
        let available = bottom - top;

        let line_budget = (available.saturating_sub(config.inner_padding) / config.line_height.max(1))
            as usize;
        let max_lines = line_budget.min(config.max_lines).max(1);
        let mut lines = wrap_text(
            &event.label(config.show_time),
            text_width,
            max_lines,
            measure,
        );
        let text_height = lines.len() as u32 * config.line_height + config.inner_padding;

        let mut height = duration_height
            .max(text_height)
            .max(config.min_block_height);
        if event.all_day {
            height = height.min(all_day_cap);
        }
        if height > available {
            height = available;
        }

        let fitting_lines = (height.saturating_sub(config.inner_padding)
            / config.line_height.max(1)) as usize;
        lines.truncate(fitting_lines.max(1));

        cursor = top.saturating_add(height).saturating_add(config.gap);
        placement.blocks.push(PlacedBlock {
            top,
            height,
            lines,
            event: event.clone(),
        });
    }

    if placement.overflow_count > 0 {
        debug!(
            "event=day_place module=layout status=overflow placed={} overflow={}",
            placement.blocks.len(),
            placement.overflow_count
        );
    }
    placement
}

/// Pixel offset of `hour` inside `region` under `config`'s window.
pub fn hour_to_y(hour: f32, region: Region, config: &PlacerConfig) -> u32 {
    let window_hours = config.end_hour - config.start_hour;
    if window_hours <= 0.0 || !window_hours.is_finite() || hour.is_nan() {
        return region.y;
    }
    let clamped = hour.clamp(config.start_hour, config.end_hour);
    let offset = ((clamped - config.start_hour) * region.height as f32 / window_hours) as u32;
    region.y.saturating_add(offset)
}

#[cfg(test)]
mod tests {
    use super::{hour_to_y, place_day_events, PlacerConfig};
    use crate::layout::text::MonospaceMeasure;
    use crate::layout::Region;
    use crate::model::event::CalendarEvent;
    use chrono::DateTime;

    fn timed(title: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(
            "calendar.work",
            title,
            DateTime::parse_from_rfc3339(start).unwrap(),
            DateTime::parse_from_rfc3339(end).unwrap(),
            false,
        )
        .unwrap()
    }

    #[test]
    fn hour_mapping_is_linear_and_clamped() {
        let region = Region::new(0, 100, 200, 400);
        let config = PlacerConfig::default();
        assert_eq!(hour_to_y(6.0, region, &config), 100);
        assert_eq!(hour_to_y(14.0, region, &config), 300);
        assert_eq!(hour_to_y(3.0, region, &config), 100);
        assert_eq!(hour_to_y(23.5, region, &config), 500);
    }

    #[test]
    fn hour_mapping_survives_broken_windows() {
        let region = Region::new(0, 100, 200, 400);
        let config = PlacerConfig {
            start_hour: f32::NAN,
            ..PlacerConfig::default()
        };
        assert_eq!(hour_to_y(9.0, region, &config), 100);
        assert_eq!(hour_to_y(f32::NAN, region, &PlacerConfig::default()), 100);
    }

    #[test]
    fn region_at_the_coordinate_limit_overflows_instead_of_wrapping() {
        let events = [timed(
            "Late call",
            "2026-10-12T21:00:00+00:00",
            "2026-10-12T22:00:00+00:00",
        )];
        let placement = place_day_events(
            &events,
            Region::new(0, u32::MAX - 100, 120, 400),
            &PlacerConfig::default(),
            &MonospaceMeasure::new(7),
        );
        assert!(placement.blocks.is_empty());
        assert_eq!(placement.overflow_count, 1);
    }

    #[test]
    fn early_event_clamps_to_window_top() {
        let events = [timed(
            "Gym",
            "2026-10-12T05:00:00+00:00",
            "2026-10-12T06:30:00+00:00",
        )];
        let placement = place_day_events(
            &events,
            Region::new(0, 0, 200, 400),
            &PlacerConfig::default(),
            &MonospaceMeasure::new(7),
        );
        assert_eq!(placement.blocks[0].top, 0);
        assert_eq!(placement.overflow_count, 0);
    }

    #[test]
    fn degenerate_window_overflows_everything() {
        let events = [timed(
            "Gym",
            "2026-10-12T08:00:00+00:00",
            "2026-10-12T09:00:00+00:00",
        )];
        let config = PlacerConfig {
            start_hour: 10.0,
            end_hour: 10.0,
            ..PlacerConfig::default()
        };
        let placement = place_day_events(
            &events,
            Region::new(0, 0, 200, 400),
            &config,
            &MonospaceMeasure::new(7),
        );
        assert!(placement.blocks.is_empty());
        assert_eq!(placement.overflow_count, 1);
    }

    #[test]
    fn long_title_grows_short_event() {
        let events = [timed(
            "Quarterly planning review with finance and operations leads",
            "2026-10-12T09:00:00+00:00",
            "2026-10-12T09:15:00+00:00",
        )];
        let config = PlacerConfig {
            show_time: false,
            ..PlacerConfig::default()
        };
        let placement = place_day_events(
            &events,
            Region::new(0, 0, 106, 400),
            &config,
            &MonospaceMeasure::new(10),
        );
        let block = &placement.blocks[0];
        assert!(block.lines.len() > 1);
        assert_eq!(
            block.height,
            block.lines.len() as u32 * config.line_height + config.inner_padding
        );
    }
}
