//! Authoritative AOI list and its persistence boundary.
//!
//! # Responsibility
//! - Own the ordered AOI list that every other component renders from.
//! - Isolate blob persistence details behind the archive contract.
//!
//! # Invariants
//! - The store is the only writer of the list; the map adapter only reads
//!   it for re-rendering.
//! - Every successful mutation is followed by a full-list archive write.

pub mod aoi_store;
pub mod archive;
