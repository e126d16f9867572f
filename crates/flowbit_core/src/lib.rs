//! Core domain logic for the Flowbit AOI panel.
//! This crate is the single source of truth for business invariants: the
//! map widget only ever renders what the store list says.

pub mod db;
pub mod logging;
pub mod map;
pub mod model;
pub mod panel;
pub mod search;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use map::adapter::{AoiEvent, InteractionMode, MapAdapter};
pub use map::surface::{
    BufferedSurface, DrawTool, LayerHandle, MapSurface, SurfaceCommand, SurfaceError,
};
pub use model::aoi::{centroid_of, Aoi, AoiId, AoiKind, AoiValidationError};
pub use panel::controller::{AoiRow, ConfirmPrompt, Panel, CLEAR_ALL_PROMPT};
pub use search::debounce::{PendingLookup, SearchBox, SearchNotice, SEARCH_DEBOUNCE};
pub use search::geocode::{
    GeocodeError, GeocodeResult, Geocoder, NominatimGeocoder, PlaceSuggestion,
};
pub use store::aoi_store::AoiStore;
pub use store::archive::{AoiArchive, ArchiveError, ArchiveResult, SqliteAoiArchive, AOI_BLOB_KEY};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
