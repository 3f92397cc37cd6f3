use chrono::{DateTime, Duration, FixedOffset};
use inkcal_core::layout::{place_day_events, DayPlacement, PlacerConfig};
use inkcal_core::{CalendarEvent, MonospaceMeasure, Region};

fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(&format!("2026-10-15T{hour:02}:{minute:02}:00+00:00")).unwrap()
}

fn timed(title: &str, hour: u32, minute: u32, minutes: i64) -> CalendarEvent {
    let start = at(hour, minute);
    CalendarEvent::new(
        "calendar.work",
        title,
        start,
        start + Duration::minutes(minutes),
        false,
    )
    .unwrap()
}

fn region() -> Region {
    Region::new(10, 50, 120, 400)
}

fn place(events: &[CalendarEvent]) -> DayPlacement {
    place_day_events(
        events,
        region(),
        &PlacerConfig::default(),
        &MonospaceMeasure::new(8),
    )
}

fn assert_well_formed(placement: &DayPlacement, config: &PlacerConfig) {
    for pair in placement.blocks.windows(2) {
        assert!(
            pair[0].bottom() <= pair[1].top,
            "`{}` ends at {} but `{}` starts at {}",
            pair[0].event.title,
            pair[0].bottom(),
            pair[1].event.title,
            pair[1].top
        );
    }
    for block in &placement.blocks {
        assert!(block.top >= region().y);
        assert!(block.bottom() <= region().bottom());
        assert!(
            block.height >= config.min_block_height || block.bottom() == region().bottom(),
            "`{}` is {}px tall",
            block.event.title,
            block.height
        );
    }
}

#[test]
fn separate_events_keep_time_order_without_overlap() {
    let events = vec![
        timed("Standup", 9, 0, 60),
        timed("Review", 10, 0, 60),
        timed("Workshop", 14, 0, 120),
    ];
    let placement = place(&events);

    assert_eq!(placement.blocks.len(), 3);
    assert_eq!(placement.overflow_count, 0);
    let titles: Vec<&str> = placement
        .blocks
        .iter()
        .map(|block| block.event.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Standup", "Review", "Workshop"]);
    assert!(placement.blocks.windows(2).all(|pair| pair[0].top < pair[1].top));
    // 25px per hour from 6am: 9am maps to 75px below the region top.
    assert_eq!(placement.blocks[0].top, region().y + 75);
    assert_eq!(placement.blocks[2].top, region().y + 200);
    assert_eq!(placement.blocks[2].height, 50);
    assert_well_formed(&placement, &PlacerConfig::default());
}

#[test]
fn simultaneous_starts_push_down_until_the_region_runs_out() {
    let events: Vec<CalendarEvent> = (0..5)
        .map(|index| timed(&format!("Block {index}"), 9, 0, 180))
        .collect();
    let placement = place(&events);

    assert_eq!(placement.blocks.len(), 4);
    assert_eq!(placement.overflow_count, 1);
    for pair in placement.blocks.windows(2) {
        assert_eq!(pair[1].top, pair[0].bottom() + PlacerConfig::default().gap);
    }
    assert_well_formed(&placement, &PlacerConfig::default());
}

#[test]
fn all_day_events_sit_on_top_and_push_timed_events() {
    let trip = CalendarEvent::new("calendar.family", "Trip", at(0, 0), at(0, 0) + Duration::days(1), true)
        .unwrap();
    let events = vec![timed("Breakfast", 6, 0, 30), trip];
    let placement = place(&events);

    assert_eq!(placement.blocks[0].event.title, "Trip");
    assert_eq!(placement.blocks[0].top, region().y);
    assert!(placement.blocks[1].top > placement.blocks[0].bottom());
    assert_well_formed(&placement, &PlacerConfig::default());
}

#[test]
fn long_all_day_title_stays_under_the_height_cap() {
    let config = PlacerConfig::default();
    let reunion = CalendarEvent::new(
        "calendar.family",
        "Annual family reunion at the lake house with all the cousins",
        at(0, 0),
        at(0, 0) + Duration::days(1),
        true,
    )
    .unwrap();
    let placement = place(std::slice::from_ref(&reunion));

    let cap = (region().height / 3).min(3 * config.min_block_height);
    let block = &placement.blocks[0];
    assert_eq!(block.top, region().y);
    assert!(block.height <= cap, "{}px exceeds cap {cap}px", block.height);
    assert!(block.height >= config.min_block_height);
    assert!(block.lines.len() as u32 * config.line_height + config.inner_padding <= block.height);
}

#[test]
fn late_long_event_is_clamped_to_the_region_bottom() {
    let events = vec![timed("Movie night", 20, 30, 180)];
    let placement = place(&events);

    assert_eq!(placement.overflow_count, 0);
    let block = &placement.blocks[0];
    // 25px per hour: three hours would need 75px below 8:30pm.
    assert_eq!(block.top, region().y + 362);
    assert_eq!(block.bottom(), region().bottom());
    assert!(block.height < 75);
    assert!(block.height >= PlacerConfig::default().min_block_height);
}

#[test]
fn events_outside_the_window_are_clamped_into_it() {
    let events = vec![timed("Early", 4, 0, 30), timed("Late", 23, 0, 30)];
    let placement = place(&events);

    assert_eq!(placement.blocks[0].top, region().y);
    assert_eq!(placement.blocks.len(), 1);
    assert_eq!(placement.overflow_count, 1);
}

#[test]
fn degenerate_window_overflows_everything() {
    let config = PlacerConfig {
        start_hour: 12.0,
        end_hour: 12.0,
        ..PlacerConfig::default()
    };
    let events = vec![timed("Lunch", 12, 0, 60)];
    let placement = place_day_events(&events, region(), &config, &MonospaceMeasure::new(8));
    assert!(placement.blocks.is_empty());
    assert_eq!(placement.overflow_count, 1);
}

#[test]
fn generated_days_never_overlap_and_conserve_events() {
    let config = PlacerConfig::default();
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: u64| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed % bound
    };
    for round in 0..200 {
        let count = next(10) as usize;
        let events: Vec<CalendarEvent> = (0..count)
            .map(|index| {
                timed(
                    &format!("R{round} event {index} with a longer title"),
                    5 + next(18) as u32,
                    (next(4) * 15) as u32,
                    15 + next(240) as i64,
                )
            })
            .collect();
        let placement = place(&events);

        assert_eq!(
            placement.blocks.len() + placement.overflow_count,
            events.len(),
            "round {round}"
        );
        assert_well_formed(&placement, &config);
    }
}
