//! Panel controller: mutation mediation and presentation rows.
//!
//! # Responsibility
//! - Route every map gesture event and sidebar intent through the store.
//! - Re-sync the map surface after each successful mutation.
//!
//! # Invariants
//! - The store list is the only logical source of truth; the panel never
//!   derives state from the surface.

pub mod controller;
