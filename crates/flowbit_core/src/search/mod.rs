//! Place-search entry points.
//!
//! # Responsibility
//! - Convert free-text queries into ranked place suggestions through an
//!   opaque geocoding provider.
//! - Coalesce keystrokes so the remote lookup is never flooded.

pub mod debounce;
pub mod geocode;
