//! Slippy-map tile addressing and view defaults.
//!
//! The tile source is a rendering backdrop only; beyond URLs and the
//! attribution text there is no data contract.

/// Tile URL template for widgets that substitute `{s}`/`{z}`/`{x}`/`{y}`
/// themselves.
pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Subdomains rotated across tile requests.
pub const TILE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Attribution text the widget must display alongside the tiles.
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Maximum tile zoom supported by the source.
pub const MAX_TILE_ZOOM: u8 = 19;

/// Initial map center `(lat, lng)`.
pub const DEFAULT_CENTER: (f64, f64) = (51.5, 7.5);

/// Initial map zoom.
pub const DEFAULT_ZOOM: u8 = 6;

/// Zoom applied when jumping to a search suggestion.
pub const SUGGESTION_ZOOM: u8 = 13;

/// Builds the tile URL for one `z/x/y` address, rotating subdomains the way
/// slippy-map widgets do.
pub fn tile_url(z: u8, x: u32, y: u32) -> String {
    let subdomain = TILE_SUBDOMAINS[((x + y) % TILE_SUBDOMAINS.len() as u32) as usize];
    format!("https://{subdomain}.tile.openstreetmap.org/{z}/{x}/{y}.png")
}
