//! JSON configuration loading and validation.
//!
//! # Responsibility
//! - Deserialize the on-disk configuration with per-field defaults.
//! - Reject configurations that would make later stages misbehave.
//!
//! # Invariants
//! - A `Config` returned by `Config::load`/`Config::from_json_str` has passed
//!   `validate()`.
//! - Entity ids are checked syntactically only; existence on the hub is not
//!   verified here.

use crate::view::ViewKind;
use chrono::{FixedOffset, Offset, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static CALENDAR_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^calendar\.[a-z0-9_]+$").expect("valid calendar entity regex"));
static WEATHER_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^weather\.[a-z0-9_]+$").expect("valid weather entity regex"));

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub calendars: Vec<CalendarEntry>,
    /// Weather entity, e.g. `weather.home`.
    pub weather_entity: Option<String>,
    pub view_selector: ViewSelectorConfig,
    pub views: ViewsConfig,
    /// Offset applied to all-day dates and used to localize timed events.
    pub utc_offset_minutes: i32,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
    pub state_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            calendars: Vec::new(),
            weather_entity: None,
            view_selector: ViewSelectorConfig::default(),
            views: ViewsConfig::default(),
            utc_offset_minutes: 0,
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
            state_file: PathBuf::from("state.json"),
        }
    }
}

/// Panel dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub header_height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            header_height: 50,
        }
    }
}

/// One configured calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub entity_id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSelectorConfig {
    pub default_view: ViewKind,
    /// Local override; wins over the hub selector when it names a valid view.
    pub override_view: Option<String>,
}

impl Default for ViewSelectorConfig {
    fn default() -> Self {
        Self {
            default_view: ViewKind::TwoWeek,
            override_view: None,
        }
    }
}

/// Per-grid-view knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridViewConfig {
    pub max_events_per_day: usize,
    #[serde(default = "default_true")]
    pub show_time: bool,
    /// Lanes reserved for multi-day all-day bars per row.
    #[serde(default = "default_max_lanes")]
    pub max_lanes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaViewConfig {
    pub days_ahead: u32,
}

impl Default for AgendaViewConfig {
    fn default() -> Self {
        Self { days_ahead: 14 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub two_week: GridViewConfig,
    pub week: GridViewConfig,
    pub month: GridViewConfig,
    pub four_day: GridViewConfig,
    pub agenda: AgendaViewConfig,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            two_week: GridViewConfig {
                max_events_per_day: 3,
                show_time: true,
                max_lanes: 2,
            },
            week: GridViewConfig {
                max_events_per_day: 5,
                show_time: true,
                max_lanes: 3,
            },
            month: GridViewConfig {
                max_events_per_day: 2,
                show_time: false,
                max_lanes: 1,
            },
            four_day: GridViewConfig {
                max_events_per_day: 10,
                show_time: true,
                max_lanes: 2,
            },
            agenda: AgendaViewConfig::default(),
        }
    }
}

/// Parallel fetch and retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_workers: usize,
    pub max_attempts: u32,
    pub backoff_factor: u32,
    pub base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            max_attempts: 3,
            backoff_factor: 2,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub level: Option<String>,
    /// Absolute log directory; logging stays off when unset.
    pub directory: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_max_lanes() -> usize {
    2
}

impl Config {
    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates configuration text.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height <= self.display.header_height {
            return Err(ConfigError::InvalidDisplay {
                width: self.display.width,
                height: self.display.height,
            });
        }

        let mut seen = BTreeSet::<&str>::new();
        for calendar in &self.calendars {
            let id = calendar.entity_id.as_str();
            if !CALENDAR_ENTITY_RE.is_match(id) {
                return Err(ConfigError::InvalidEntityId(id.to_string()));
            }
            if !seen.insert(id) {
                return Err(ConfigError::DuplicateCalendar(id.to_string()));
            }
        }

        if let Some(weather) = self.weather_entity.as_deref() {
            if !WEATHER_ENTITY_RE.is_match(weather) {
                return Err(ConfigError::InvalidEntityId(weather.to_string()));
            }
        }

        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidUtcOffset(self.utc_offset_minutes));
        }

        if self.fetch.max_workers == 0 {
            return Err(ConfigError::InvalidFetch("max_workers must be >= 1"));
        }
        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::InvalidFetch("max_attempts must be >= 1"));
        }
        Ok(())
    }

    /// Fixed offset used to localize events.
    pub fn utc_offset(&self) -> FixedOffset {
        // validate() bounds the offset to +/-14h, which east_opt accepts.
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Configuration loading/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    InvalidDisplay {
        width: u32,
        height: u32,
    },
    InvalidEntityId(String),
    DuplicateCalendar(String),
    InvalidUtcOffset(i32),
    InvalidFetch(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::InvalidDisplay { width, height } => write!(
                f,
                "display size {width}x{height} is invalid (height must exceed header)"
            ),
            Self::InvalidEntityId(value) => write!(f, "entity id is invalid: {value}"),
            Self::DuplicateCalendar(value) => write!(f, "calendar configured twice: {value}"),
            Self::InvalidUtcOffset(value) => {
                write!(f, "utc_offset_minutes out of range: {value}")
            }
            Self::InvalidFetch(details) => write!(f, "invalid fetch policy: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}
