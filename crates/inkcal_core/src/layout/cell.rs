//! Sequential event stacking inside grid cells.
//!
//! Grid views (two-week, week, month) ignore start times inside a cell and
//! stack event bars top-down. Fewer events get larger text.

use crate::layout::day::PlacedBlock;
use crate::layout::text::{wrap_text, TextMeasure};
use crate::layout::Region;
use crate::model::event::CalendarEvent;
use serde::{Deserialize, Serialize};

/// Text size bucket picked from the number of shown events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellTextSize {
    Medium,
    Normal,
    Small,
}

impl CellTextSize {
    /// Size bucket, line height and max lines per event for `shown` events.
    pub fn for_event_count(shown: usize) -> (Self, u32, usize) {
        match shown {
            0..=2 => (Self::Medium, 18, 3),
            3 => (Self::Normal, 16, 2),
            _ => (Self::Small, 14, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellConfig {
    pub show_time: bool,
    /// Padding added to each bar around its text lines.
    pub bar_padding: u32,
    pub gap: u32,
    pub text_inset: u32,
    /// Height reserved for the `+N more` label.
    pub more_label_height: u32,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            show_time: true,
            bar_padding: 4,
            gap: 2,
            text_inset: 6,
            more_label_height: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPlacement {
    pub blocks: Vec<PlacedBlock>,
    pub text_size: CellTextSize,
    /// Events not shown, whether cut by `max_events` or by space.
    pub overflow_count: usize,
    /// Where to draw `+N more`, when there is overflow and room for it.
    pub more_label_top: Option<u32>,
}

/// Stacks up to `max_events` events top-down inside `region`.
///
/// Stops at the first bar that would cross the region bottom; everything not
/// stacked counts toward `overflow_count`.
pub fn stack_cell_events<'a, I, M>(
    events: I,
    max_events: usize,
    region: Region,
    config: &CellConfig,
    measure: &M,
) -> CellPlacement
where
    I: IntoIterator<Item = &'a CalendarEvent>,
    M: TextMeasure + ?Sized,
{
    let events: Vec<&CalendarEvent> = events.into_iter().collect();
    let shown = events.len().min(max_events);
    let (text_size, line_height, max_lines) = CellTextSize::for_event_count(shown);
    let bottom = region.bottom();
    let text_width = region.width.saturating_sub(config.text_inset);

    let mut blocks = Vec::new();
    let mut current = region.y;
    for event in events.iter().take(shown) {
        let lines = wrap_text(
            &event.label(config.show_time),
            text_width,
            max_lines,
            measure,
        );
        let height = lines.len().max(1) as u32 * line_height + config.bar_padding;
        if current + height > bottom {
            break;
        }
        blocks.push(PlacedBlock {
            top: current,
            height,
            lines,
            event: (*event).clone(),
        });
        current += height + config.gap;
    }

    let overflow_count = events.len() - blocks.len();
    let more_label_top = (overflow_count > 0 && current + config.more_label_height <= bottom)
        .then_some(current);

    CellPlacement {
        blocks,
        text_size,
        overflow_count,
        more_label_top,
    }
}

#[cfg(test)]
mod tests {
    use super::{stack_cell_events, CellConfig, CellTextSize};
    use crate::layout::text::MonospaceMeasure;
    use crate::layout::Region;
    use crate::model::event::CalendarEvent;
    use chrono::{DateTime, Duration};

    fn events(count: usize) -> Vec<CalendarEvent> {
        let base = DateTime::parse_from_rfc3339("2026-10-12T09:00:00+00:00").unwrap();
        (0..count)
            .map(|i| {
                let start = base + Duration::hours(i as i64);
                CalendarEvent::new(
                    "calendar.home",
                    format!("E{i}"),
                    start,
                    start + Duration::minutes(30),
                    false,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn picks_text_size_from_count() {
        assert_eq!(CellTextSize::for_event_count(1).0, CellTextSize::Medium);
        assert_eq!(CellTextSize::for_event_count(3).0, CellTextSize::Normal);
        assert_eq!(CellTextSize::for_event_count(7).0, CellTextSize::Small);
    }

    #[test]
    fn limited_events_count_as_overflow() {
        let events = events(5);
        let placement = stack_cell_events(
            &events,
            3,
            Region::new(0, 0, 200, 300),
            &CellConfig::default(),
            &MonospaceMeasure::new(6),
        );
        assert_eq!(placement.blocks.len(), 3);
        assert_eq!(placement.overflow_count, 2);
        assert!(placement.more_label_top.is_some());
        for pair in placement.blocks.windows(2) {
            assert!(pair[0].bottom() <= pair[1].top);
        }
    }

    #[test]
    fn stops_at_region_bottom() {
        let events = events(3);
        let placement = stack_cell_events(
            &events,
            3,
            Region::new(0, 10, 200, 45),
            &CellConfig::default(),
            &MonospaceMeasure::new(6),
        );
        // Each bar is 16 + 4 = 20px with a 2px gap: two fit in 45px.
        assert_eq!(placement.blocks.len(), 2);
        assert_eq!(placement.overflow_count, 1);
        assert_eq!(placement.more_label_top, None);
    }
}
