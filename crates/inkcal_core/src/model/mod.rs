//! Domain model for calendar events and panel colors.
//!
//! # Responsibility
//! - Define canonical data structures consumed by grouping and layout.
//! - Keep event identity (`EventKey`) in one place.
//!
//! # Invariants
//! - Every event carries its source calendar id.
//! - Event identity is the (calendar, title, start, end) tuple, never a
//!   position in a list.

pub mod color;
pub mod event;
