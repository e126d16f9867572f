//! Map adapter: gesture translation and layer reconciliation.
//!
//! # Responsibility
//! - Translate drawing gestures into AOI lifecycle events.
//! - Keep rendered layers consistent with the externally-owned AOI list via
//!   full wipe-and-redraw.
//!
//! # Invariants
//! - The map widget is a pure rendering sink; state is never read back out
//!   of it except at the moment of a gesture event.
//! - After each re-sync, exactly one layer exists per stored AOI.

pub mod adapter;
pub mod surface;
pub mod tiles;

/// Stroke color applied to drawn vector shapes.
pub const SHAPE_STROKE_COLOR: &str = "#d97828";
/// Stroke weight applied to drawn vector shapes.
pub const SHAPE_STROKE_WEIGHT: u32 = 3;
