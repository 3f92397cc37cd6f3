//! View selection and day-row planning.
//!
//! # Responsibility
//! - Name the supported views and parse hub/selector spellings leniently.
//! - Decide which days each view shows and how they split into rows.
//!
//! # Invariants
//! - Every row is a contiguous, ascending run of days.
//! - Grid rows (two-week, week, month) start on Monday.

pub mod plan;

use crate::calendar::group::{month_grid_range, week_start, DateRange};
use crate::config::Config;
use chrono::{Datelike, Duration, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use plan::{
    build_plan, AgendaEntry, AgendaSection, DayContent, DayPlan, LegendEntry, RenderPlan, RowPlan,
};

/// Supported calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    TwoWeek,
    Week,
    FourDay,
    Month,
    Agenda,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::TwoWeek,
        ViewKind::Week,
        ViewKind::FourDay,
        ViewKind::Month,
        ViewKind::Agenda,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoWeek => "two_week",
            Self::Week => "week",
            Self::FourDay => "four_day",
            Self::Month => "month",
            Self::Agenda => "agenda",
        }
    }

    /// Parses selector spellings such as `Two Week`, `4-day` or `2_week`.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        let normalized = match normalized.as_str() {
            "4_day" => "four_day",
            "2_week" => "two_week",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|view| view.as_str() == normalized)
    }

    /// Picks the view: local override first, then the hub selector state,
    /// then the configured default.
    pub fn select(config: &Config, selector_state: Option<&str>) -> Self {
        if let Some(raw) = config.view_selector.override_view.as_deref() {
            match Self::parse_lenient(raw) {
                Some(view) => return view,
                None => warn!(
                    "event=view_select module=view status=ignored source=override value={}",
                    raw
                ),
            }
        }
        if let Some(raw) = selector_state {
            match Self::parse_lenient(raw) {
                Some(view) => return view,
                None => warn!(
                    "event=view_select module=view status=ignored source=selector value={}",
                    raw
                ),
            }
        }
        config.view_selector.default_view
    }

    /// Days shown by this view, split into rows.
    pub fn rows(self, today: NaiveDate, config: &Config) -> Vec<Vec<NaiveDate>> {
        match self {
            Self::TwoWeek => weeks_from(week_start(today), 2),
            Self::Week => weeks_from(week_start(today), 1),
            Self::FourDay => vec![DateRange::from_start(today, 4).days().collect()],
            Self::Month => month_grid_range(today.year(), today.month())
                .map(|range| {
                    let days: Vec<NaiveDate> = range.days().collect();
                    days.chunks(7).map(<[NaiveDate]>::to_vec).collect()
                })
                .unwrap_or_default(),
            Self::Agenda => DateRange::from_start(today, config.views.agenda.days_ahead)
                .days()
                .map(|day| vec![day])
                .collect(),
        }
    }

    /// Date range to fetch and group for this view.
    pub fn fetch_range(self, today: NaiveDate, config: &Config) -> DateRange {
        let rows = self.rows(today, config);
        let first = rows.first().and_then(|row| row.first()).copied();
        let last = rows.last().and_then(|row| row.last()).copied();
        match (first, last) {
            (Some(first), Some(last)) => DateRange::new(first, last + Duration::days(1)),
            _ => DateRange::new(today, today),
        }
    }
}

impl Display for ViewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn weeks_from(monday: NaiveDate, weeks: u32) -> Vec<Vec<NaiveDate>> {
    (0..weeks)
        .map(|week| {
            DateRange::from_start(monday + Duration::weeks(i64::from(week)), 7)
                .days()
                .collect()
        })
        .collect()
}
