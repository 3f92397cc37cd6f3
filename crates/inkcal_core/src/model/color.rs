//! E-paper palette and per-calendar color assignment.
//!
//! # Responsibility
//! - Name the colors the 6-color panel can show (plus `gold`, a yellow that
//!   reads better on the panel).
//! - Assign one accent color to each configured calendar.
//!
//! # Invariants
//! - Only `red|yellow|green|blue` are assignable to calendars; black/white
//!   are reserved for text, grid and background.
//! - Assignment is deterministic for a given calendar order.

use crate::config::CalendarEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Panel palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperColor {
    #[default]
    Black,
    White,
    Red,
    Yellow,
    Gold,
    Green,
    Blue,
}

/// Calendar accent colors in assignment priority order.
pub const CALENDAR_COLOR_PRIORITY: [PaperColor; 4] = [
    PaperColor::Red,
    PaperColor::Yellow,
    PaperColor::Green,
    PaperColor::Blue,
];

impl PaperColor {
    pub const ALL: [PaperColor; 7] = [
        PaperColor::Black,
        PaperColor::White,
        PaperColor::Red,
        PaperColor::Yellow,
        PaperColor::Gold,
        PaperColor::Green,
        PaperColor::Blue,
    ];

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Black => (0, 0, 0),
            Self::White => (255, 255, 255),
            Self::Red => (255, 0, 0),
            Self::Yellow => (255, 255, 0),
            Self::Gold => (255, 180, 0),
            Self::Green => (0, 255, 0),
            Self::Blue => (0, 0, 255),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Gold => "gold",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// Case-insensitive lookup by palette name.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.name() == normalized)
    }

    /// Nearest palette entry by Euclidean distance in RGB space.
    pub fn quantize(rgb: (u8, u8, u8)) -> Self {
        let distance = |color: PaperColor| {
            let (r, g, b) = color.rgb();
            let dr = i32::from(rgb.0) - i32::from(r);
            let dg = i32::from(rgb.1) - i32::from(g);
            let db = i32::from(rgb.2) - i32::from(b);
            dr * dr + dg * dg + db * db
        };
        // min_by_key keeps the first minimum, so ties resolve in palette order.
        Self::ALL
            .into_iter()
            .min_by_key(|color| distance(*color))
            .unwrap_or(Self::Black)
    }
}

/// Resolved style for one calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarStyle {
    pub color: PaperColor,
    pub display_name: String,
}

/// Calendar id to style mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarColors {
    styles: BTreeMap<String, CalendarStyle>,
    order: Vec<String>,
}

impl CalendarColors {
    /// Assigns colors to calendars in configuration order.
    ///
    /// A calendar keeps its configured color when that color is assignable;
    /// otherwise it gets `CALENDAR_COLOR_PRIORITY[index % 4]`.
    pub fn assign(calendars: &[CalendarEntry]) -> Self {
        let mut colors = Self::default();
        for (index, calendar) in calendars.iter().enumerate() {
            let configured = calendar
                .color
                .as_deref()
                .and_then(PaperColor::from_name)
                .filter(|color| CALENDAR_COLOR_PRIORITY.contains(color));
            let color = configured.unwrap_or(
                CALENDAR_COLOR_PRIORITY[index % CALENDAR_COLOR_PRIORITY.len()],
            );
            let display_name = calendar
                .display_name
                .clone()
                .unwrap_or_else(|| calendar.entity_id.clone());
            if colors
                .styles
                .insert(
                    calendar.entity_id.clone(),
                    CalendarStyle {
                        color,
                        display_name,
                    },
                )
                .is_none()
            {
                colors.order.push(calendar.entity_id.clone());
            }
        }
        colors
    }

    /// Style for a calendar; unknown ids fall back to black with the id as
    /// display name.
    pub fn style_for(&self, entity_id: &str) -> CalendarStyle {
        self.styles
            .get(entity_id)
            .cloned()
            .unwrap_or_else(|| CalendarStyle {
                color: PaperColor::Black,
                display_name: entity_id.to_string(),
            })
    }

    /// Legend entries in configuration order.
    pub fn legend(&self) -> Vec<CalendarStyle> {
        self.order
            .iter()
            .filter_map(|id| self.styles.get(id).cloned())
            .collect()
    }
}
