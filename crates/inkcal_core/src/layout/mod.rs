//! Layout algorithms for calendar views.
//!
//! # Responsibility
//! - Pack multi-day all-day events into horizontal lanes per row.
//! - Place a day's remaining events inside a column or cell.
//!
//! # Invariants
//! - Layout is pure: no I/O, no shared mutable state, same input gives the
//!   same output.
//! - Capacity problems surface as overflow counts, never as errors or
//!   panics.

pub mod cell;
pub mod day;
pub mod lanes;
pub mod text;

use serde::{Deserialize, Serialize};

pub use cell::{stack_cell_events, CellConfig, CellPlacement, CellTextSize};
pub use day::{place_day_events, DayPlacement, PlacedBlock, PlacerConfig};
pub use lanes::{pack_spans, pack_spans_from_map, Lane, LanePacking, Span};
pub use text::{truncate_text, wrap_text, MonospaceMeasure, TextMeasure};

/// Axis-aligned pixel rectangle, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Region shrunk by `top` pixels from above and `sides` on left/right.
    pub fn inset(&self, top: u32, sides: u32) -> Self {
        Self {
            x: self.x.saturating_add(sides),
            y: self.y.saturating_add(top.min(self.height)),
            width: self.width.saturating_sub(sides.saturating_mul(2)),
            height: self.height.saturating_sub(top),
        }
    }
}
