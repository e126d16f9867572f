//! Domain model for the AOI panel.
//!
//! # Responsibility
//! - Define the canonical record shared by the store, the map adapter and
//!   the presentation rows.
//!
//! # Invariants
//! - Every AOI is identified by a stable `AoiId`.
//! - Deletion is hard removal from the authoritative list; there are no
//!   tombstones, records are recreatable by hand.

pub mod aoi;
