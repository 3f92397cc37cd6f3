//! Render plan assembly.
//!
//! # Responsibility
//! - Run lane packing per row and cell/column placement per day for the
//!   selected view.
//! - Hand the drawing collaborator a serializable plan with every overflow
//!   count it needs for `+N more` labels.
//!
//! # Invariants
//! - Events consumed by a row's lanes never reappear inside that row's day
//!   cells.
//! - Day regions of one row tile the row left to right without overlap.

use crate::calendar::group::{group_events_by_day, DayMap};
use crate::config::{Config, GridViewConfig};
use crate::layout::cell::{stack_cell_events, CellConfig, CellPlacement};
use crate::layout::day::{place_day_events, DayPlacement, PlacerConfig};
use crate::layout::lanes::{pack_spans, LanePacking};
use crate::layout::text::{truncate_text, TextMeasure};
use crate::layout::Region;
use crate::model::color::{CalendarColors, CalendarStyle, PaperColor};
use crate::model::event::CalendarEvent;
use crate::view::ViewKind;
use crate::weather::WeatherInfo;
use chrono::{Duration, NaiveDate};
use log::info;
use serde::Serialize;

const LANE_HEIGHT: u32 = 16;
const LANE_GAP: u32 = 2;
const FOUR_DAY_LABEL_HEIGHT: u32 = 60;
const FOUR_DAY_PADDING: u32 = 5;
const AGENDA_TITLE_HEIGHT: u32 = 45;
const AGENDA_FOOTER_HEIGHT: u32 = 40;
const AGENDA_LINE_HEIGHT: u32 = 24;
const AGENDA_HEADING_GAP: u32 = 5;
const AGENDA_DAY_GAP: u32 = 10;
const AGENDA_PADDING: u32 = 20;
const AGENDA_TEXT_INDENT: u32 = 30;
const LEGEND_TOP_OFFSET: u32 = 13;
const LEGEND_SPACING: u32 = 150;
const LEGEND_SWATCH: u32 = 15;
const LEGEND_TEXT_GAP: u32 = 8;

/// Complete layout for one panel refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub view: ViewKind,
    pub today: NaiveDate,
    pub canvas: Region,
    pub header: Region,
    /// Weather icon and temperature, when weather is available.
    pub header_text: Option<String>,
    pub header_icon_color: Option<PaperColor>,
    /// Day rows; empty for the agenda view.
    pub rows: Vec<RowPlan>,
    /// Agenda sections; empty for the other views.
    pub agenda: Vec<AgendaSection>,
    /// Agenda days or entries left out for lack of space.
    pub agenda_hidden: usize,
    /// Footer strip holding the calendar legend (agenda only).
    pub footer: Option<Region>,
    pub legend: Vec<LegendEntry>,
}

impl RenderPlan {
    /// Every event not drawn, across lanes, cells, columns and agenda.
    pub fn total_overflow(&self) -> usize {
        let rows: usize = self
            .rows
            .iter()
            .map(|row| {
                row.lanes.overflow_count
                    + row
                        .days
                        .iter()
                        .map(|day| day.content.overflow_count())
                        .sum::<usize>()
            })
            .sum();
        rows + self.agenda_hidden
    }
}

/// One row of days with its multi-day bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPlan {
    pub region: Region,
    pub dates: Vec<NaiveDate>,
    pub column_width: u32,
    /// Top of the first lane; lane `i` sits at `lanes_top + i * (lane_height + gap)`.
    pub lanes_top: u32,
    pub lane_height: u32,
    pub lanes: LanePacking,
    pub days: Vec<DayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub is_today: bool,
    /// Whole cell, including its date label.
    pub region: Region,
    pub content: DayContent,
}

/// Per-day content, depending on the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayContent {
    /// Sequential stack (two-week, week, month).
    Cell(CellPlacement),
    /// Time-proportional column (four-day).
    Column(DayPlacement),
}

impl DayContent {
    pub fn overflow_count(&self) -> usize {
        match self {
            Self::Cell(cell) => cell.overflow_count,
            Self::Column(column) => column.overflow_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaSection {
    pub date: NaiveDate,
    pub heading: String,
    pub top: u32,
    pub entries: Vec<AgendaEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaEntry {
    pub top: u32,
    pub text: String,
    pub color: PaperColor,
}

/// One calendar in the footer legend: a color swatch and its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub swatch: Region,
    pub text_x: u32,
    pub style: CalendarStyle,
}

/// Grid cell metrics per view.
struct GridMetrics {
    label_height: u32,
    padding: u32,
}

impl GridMetrics {
    fn for_view(view: ViewKind) -> Self {
        match view {
            ViewKind::Week => Self {
                label_height: 40,
                padding: 8,
            },
            ViewKind::Month => Self {
                label_height: 22,
                padding: 3,
            },
            _ => Self {
                label_height: 30,
                padding: 5,
            },
        }
    }
}

/// Builds the plan for `view` on `today`.
///
/// `events` may cover more days than the view shows; only days in the
/// view's range are grouped.
pub fn build_plan<M>(
    view: ViewKind,
    today: NaiveDate,
    events: &[CalendarEvent],
    weather: Option<&WeatherInfo>,
    config: &Config,
    measure: &M,
) -> RenderPlan
where
    M: TextMeasure + ?Sized,
{
    let display = config.display;
    let canvas = Region::new(0, 0, display.width, display.height);
    let header = Region::new(0, 0, display.width, display.header_height);
    let body = Region::new(
        0,
        display.header_height,
        display.width,
        display.height.saturating_sub(display.header_height),
    );

    let grouped = group_events_by_day(events, Some(view.fetch_range(today, config)), today);
    let row_dates = view.rows(today, config);

    let mut plan = RenderPlan {
        view,
        today,
        canvas,
        header,
        header_text: weather.map(WeatherInfo::header_text),
        header_icon_color: weather.map(|info| crate::weather::condition_color(&info.condition)),
        rows: Vec::new(),
        agenda: Vec::new(),
        agenda_hidden: 0,
        footer: None,
        legend: Vec::new(),
    };

    match view {
        ViewKind::TwoWeek | ViewKind::Week | ViewKind::Month => {
            let grid = match view {
                ViewKind::Week => config.views.week,
                ViewKind::Month => config.views.month,
                _ => config.views.two_week,
            };
            plan.rows = plan_grid(view, today, &row_dates, &grouped, body, &grid, measure);
        }
        ViewKind::FourDay => {
            plan.rows = plan_columns(
                today,
                &row_dates,
                &grouped,
                body,
                &config.views.four_day,
                measure,
            );
        }
        ViewKind::Agenda => {
            let (sections, hidden) = plan_agenda(&grouped, today, canvas, body, measure);
            plan.agenda = sections;
            plan.agenda_hidden = hidden;
            let footer = Region::new(
                0,
                canvas.bottom().saturating_sub(AGENDA_FOOTER_HEIGHT),
                canvas.width,
                AGENDA_FOOTER_HEIGHT.min(canvas.height),
            );
            plan.legend = legend_entries(&CalendarColors::assign(&config.calendars), footer);
            plan.footer = Some(footer);
        }
    }

    info!(
        "event=plan_built module=view status=ok view={} rows={} agenda_sections={} overflow={}",
        view,
        plan.rows.len(),
        plan.agenda.len(),
        plan.total_overflow()
    );
    plan
}

fn day_events<'a>(grouped: &'a DayMap, day: NaiveDate) -> &'a [CalendarEvent] {
    grouped
        .get(&day)
        .map(|entry| entry.events.as_slice())
        .unwrap_or(&[])
}

fn lanes_height(packing: &LanePacking) -> u32 {
    packing.lanes.len() as u32 * (LANE_HEIGHT + LANE_GAP)
}

fn plan_grid<M>(
    view: ViewKind,
    today: NaiveDate,
    rows: &[Vec<NaiveDate>],
    grouped: &DayMap,
    body: Region,
    grid: &GridViewConfig,
    measure: &M,
) -> Vec<RowPlan>
where
    M: TextMeasure + ?Sized,
{
    if rows.is_empty() {
        return Vec::new();
    }
    let metrics = GridMetrics::for_view(view);
    let row_height = body.height / rows.len() as u32;
    let cell_config = CellConfig {
        show_time: grid.show_time,
        ..CellConfig::default()
    };

    rows.iter()
        .enumerate()
        .map(|(row_index, dates)| {
            let columns = dates.len().max(1) as u32;
            let column_width = body.width / columns;
            let region = Region::new(
                body.x,
                body.y + row_index as u32 * row_height,
                body.width,
                row_height,
            );
            let lanes = pack_spans(dates, |day| day_events(grouped, day), grid.max_lanes);
            let lanes_top = region.y + metrics.label_height;
            let reserved = metrics.label_height + lanes_height(&lanes);

            let days = dates
                .iter()
                .enumerate()
                .map(|(column, date)| {
                    let cell = Region::new(
                        region.x + column as u32 * column_width,
                        region.y,
                        column_width,
                        row_height,
                    );
                    let remaining = day_events(grouped, *date)
                        .iter()
                        .filter(|event| !lanes.is_consumed(event));
                    let content: CellPlacement = stack_cell_events(
                        remaining,
                        grid.max_events_per_day,
                        cell.inset(reserved, metrics.padding),
                        &cell_config,
                        measure,
                    );
                    DayPlan {
                        date: *date,
                        is_today: *date == today,
                        region: cell,
                        content: DayContent::Cell(content),
                    }
                })
                .collect();

            RowPlan {
                region,
                dates: dates.clone(),
                column_width,
                lanes_top,
                lane_height: LANE_HEIGHT,
                lanes,
                days,
            }
        })
        .collect()
}

fn plan_columns<M>(
    today: NaiveDate,
    rows: &[Vec<NaiveDate>],
    grouped: &DayMap,
    body: Region,
    grid: &GridViewConfig,
    measure: &M,
) -> Vec<RowPlan>
where
    M: TextMeasure + ?Sized,
{
    let placer = PlacerConfig {
        show_time: grid.show_time,
        ..PlacerConfig::default()
    };

    rows.iter()
        .map(|dates| {
            let columns = dates.len().max(1) as u32;
            let column_width = body.width / columns;
            let lanes = pack_spans(dates, |day| day_events(grouped, day), grid.max_lanes);
            let lanes_top = body.y + FOUR_DAY_LABEL_HEIGHT;
            let reserved = FOUR_DAY_LABEL_HEIGHT + lanes_height(&lanes);

            let days = dates
                .iter()
                .enumerate()
                .map(|(column, date)| {
                    let cell = Region::new(
                        body.x + column as u32 * column_width,
                        body.y,
                        column_width,
                        body.height,
                    );
                    let remaining: Vec<&CalendarEvent> = day_events(grouped, *date)
                        .iter()
                        .filter(|event| !lanes.is_consumed(event))
                        .collect();
                    let cut = remaining.len().saturating_sub(grid.max_events_per_day);
                    let mut area = cell.inset(reserved, FOUR_DAY_PADDING);
                    area.height = area.height.saturating_sub(FOUR_DAY_PADDING);
                    let mut content = place_day_events(
                        remaining.into_iter().take(grid.max_events_per_day),
                        area,
                        &placer,
                        measure,
                    );
                    content.overflow_count += cut;
                    DayPlan {
                        date: *date,
                        is_today: *date == today,
                        region: cell,
                        content: DayContent::Column(content),
                    }
                })
                .collect();

            RowPlan {
                region: body,
                dates: dates.clone(),
                column_width,
                lanes_top,
                lane_height: LANE_HEIGHT,
                lanes,
                days,
            }
        })
        .collect()
}

fn agenda_heading(date: NaiveDate, today: NaiveDate) -> String {
    let long = date.format("%A, %B %d");
    if date == today {
        format!("TODAY - {long}")
    } else if date == today + Duration::days(1) {
        format!("TOMORROW - {long}")
    } else {
        long.to_string()
    }
}

fn agenda_text(event: &CalendarEvent) -> String {
    if event.all_day {
        format!("{} (All Day) - {}", event.title, event.calendar_name)
    } else {
        format!(
            "{} - {} ({})",
            event.start.format("%I:%M %p"),
            event.title,
            event.calendar_name
        )
    }
}

fn plan_agenda<M>(
    grouped: &DayMap,
    today: NaiveDate,
    canvas: Region,
    body: Region,
    measure: &M,
) -> (Vec<AgendaSection>, usize)
where
    M: TextMeasure + ?Sized,
{
    let bottom = canvas.bottom().saturating_sub(AGENDA_FOOTER_HEIGHT);
    let text_width = canvas
        .width
        .saturating_sub(2 * AGENDA_PADDING + AGENDA_TEXT_INDENT);
    let mut y = body.y + AGENDA_TITLE_HEIGHT;
    let mut sections = Vec::new();
    let mut hidden = 0;

    let mut days = grouped.values().filter(|day| !day.events.is_empty());
    for day in days.by_ref() {
        let needed = AGENDA_LINE_HEIGHT * (day.events.len() as u32 + 1);
        if y + needed > bottom {
            hidden += day.events.len();
            break;
        }
        let top = y;
        y += AGENDA_LINE_HEIGHT + AGENDA_HEADING_GAP;

        let mut entries = Vec::new();
        for event in &day.events {
            if y + AGENDA_LINE_HEIGHT > bottom {
                break;
            }
            entries.push(AgendaEntry {
                top: y,
                text: truncate_text(&agenda_text(event), text_width, measure),
                color: event.color,
            });
            y += AGENDA_LINE_HEIGHT;
        }
        hidden += day.events.len() - entries.len();
        sections.push(AgendaSection {
            date: day.date,
            heading: agenda_heading(day.date, today),
            top,
            entries,
        });
        y += AGENDA_DAY_GAP;
    }
    hidden += days.map(|day| day.events.len()).sum::<usize>();
    (sections, hidden)
}

fn legend_entries(colors: &CalendarColors, footer: Region) -> Vec<LegendEntry> {
    colors
        .legend()
        .into_iter()
        .enumerate()
        .map(|(index, style)| {
            let x = AGENDA_PADDING + index as u32 * LEGEND_SPACING;
            LegendEntry {
                swatch: Region::new(x, footer.y + LEGEND_TOP_OFFSET, LEGEND_SWATCH, LEGEND_SWATCH),
                text_x: x + LEGEND_SWATCH + LEGEND_TEXT_GAP,
                style,
            }
        })
        .collect()
}
