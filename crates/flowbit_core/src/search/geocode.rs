//! Geocoding provider contract and Nominatim-style HTTP client.
//!
//! # Responsibility
//! - Decode provider payloads into typed suggestions.
//! - Keep transport and payload failures inside the search layer.
//!
//! # Invariants
//! - No failure propagates past `GeocodeError`; the UI only ever sees the
//!   short inline notices mapped from it.
//! - Candidate coordinates arrive as numeric-parseable strings and are
//!   parsed at this boundary; unparseable candidates are skipped.

use log::warn;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Search-layer error for lookup transport and payload decoding.
#[derive(Debug)]
pub enum GeocodeError {
    /// The provider answered with something other than a candidate array.
    NoResults,
    /// Network-level failure reaching the provider.
    Transport(String),
    /// The response body is not valid JSON.
    Malformed(String),
}

impl Display for GeocodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResults => write!(f, "geocoder returned no candidate array"),
            Self::Transport(message) => write!(f, "geocoder request failed: {message}"),
            Self::Malformed(message) => write!(f, "geocoder response unreadable: {message}"),
        }
    }
}

impl Error for GeocodeError {}

/// One ranked place candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Opaque free-text place lookup.
pub trait Geocoder {
    fn lookup(&self, query: &str) -> GeocodeResult<Vec<PlaceSuggestion>>;
}

/// Decodes a provider payload into suggestions.
///
/// A non-array payload is the "no results" error state, not a crash;
/// candidates missing a display name or with unparseable coordinates are
/// dropped with a log entry.
pub fn parse_candidates(payload: &Value) -> GeocodeResult<Vec<PlaceSuggestion>> {
    let Some(items) = payload.as_array() else {
        return Err(GeocodeError::NoResults);
    };

    let suggestions = items
        .iter()
        .filter_map(|item| {
            let candidate = parse_candidate(item);
            if candidate.is_none() {
                warn!("event=candidate_parse module=search status=skipped");
            }
            candidate
        })
        .collect();
    Ok(suggestions)
}

fn parse_candidate(item: &Value) -> Option<PlaceSuggestion> {
    let display_name = item.get("display_name")?.as_str()?.to_string();
    let lat = coordinate(item.get("lat")?)?;
    let lng = coordinate(item.get("lon")?)?;
    Some(PlaceSuggestion {
        display_name,
        lat,
        lng,
    })
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::String(text) => text.trim().parse().ok(),
        other => other.as_f64(),
    }
}

const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const LOOKUP_LIMIT: &str = "5";
const USER_AGENT: &str = concat!("flowbit-aoi/", env!("CARGO_PKG_VERSION"));

/// Nominatim-style place search over HTTP GET.
pub struct NominatimGeocoder {
    endpoint: String,
    agent: ureq::Agent,
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self::with_endpoint(NOMINATIM_ENDPOINT)
    }

    /// Points the client at a different endpoint (local test servers).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new().timeout(LOOKUP_TIMEOUT).build(),
        }
    }
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Geocoder for NominatimGeocoder {
    fn lookup(&self, query: &str) -> GeocodeResult<Vec<PlaceSuggestion>> {
        let response = self
            .agent
            .get(&self.endpoint)
            .query("format", "json")
            .query("q", query)
            .query("addressdetails", "1")
            .query("limit", LOOKUP_LIMIT)
            .set("Accept", "application/json")
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;

        let payload: Value = response
            .into_json()
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
        parse_candidates(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_candidates, GeocodeError};
    use serde_json::json;

    #[test]
    fn parses_string_coordinates() {
        let payload = json!([
            { "display_name": "Berlin, Deutschland", "lat": "52.5170365", "lon": "13.3888599" }
        ]);
        let suggestions = parse_candidates(&payload).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].display_name, "Berlin, Deutschland");
        assert!((suggestions[0].lat - 52.5170365).abs() < 1e-9);
        assert!((suggestions[0].lng - 13.3888599).abs() < 1e-9);
    }

    #[test]
    fn non_array_payload_is_no_results() {
        let payload = json!({ "error": "rate limited" });
        assert!(matches!(
            parse_candidates(&payload),
            Err(GeocodeError::NoResults)
        ));
    }

    #[test]
    fn unparseable_candidates_are_skipped() {
        let payload = json!([
            { "display_name": "ok", "lat": "1.0", "lon": "2.0" },
            { "display_name": "bad coords", "lat": "north", "lon": "2.0" },
            { "lat": "3.0", "lon": "4.0" }
        ]);
        let suggestions = parse_candidates(&payload).unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].display_name, "ok");
    }
}
