//! Core layout engine for the e-paper calendar panel.
//! This crate owns event ingestion, day grouping and every placement
//! decision; drawing pixels is left to the caller.

pub mod calendar;
pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod view;
pub mod weather;

pub use calendar::{
    group_events_by_day, limit_events_per_day, parse_all_events, parse_event, DateRange,
    DayEvents, DayMap, ParseError,
};
pub use config::{Config, ConfigError};
pub use layout::{
    pack_spans, place_day_events, stack_cell_events, LanePacking, MonospaceMeasure, PlacerConfig,
    Region, TextMeasure,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::color::{CalendarColors, PaperColor};
pub use model::event::{CalendarEvent, EventKey, EventValidationError};
pub use source::{fetch_all, CalendarSource, JsonFileSource, RetryPolicy, SourceError};
pub use state::{load_state, save_state, DisplayState, StateError};
pub use view::{build_plan, RenderPlan, ViewKind};
pub use weather::WeatherInfo;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
