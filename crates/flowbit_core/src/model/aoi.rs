//! AOI domain model.
//!
//! # Responsibility
//! - Define the canonical Area-of-Interest record shared by the store, the
//!   map adapter and the panel rows.
//! - Derive centroid coordinates from raw geometry, best effort.
//!
//! # Invariants
//! - `id` is stable for the record's lifetime and never reused.
//! - `kind` is fixed at creation time and must agree with the GeoJSON
//!   geometry type; a rectangle is only distinguishable from a polygon
//!   because the creating gesture tagged it.
//! - A missing centroid never invalidates a record.

use geojson::{Feature, Geometry, Value};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every AOI, used as the reconciliation key between
/// the store list and rendered map layers.
pub type AoiId = Uuid;

/// Gesture-derived AOI classification.
///
/// Serialized as `type` on the wire. `Rectangle` and `Polygon` share the
/// same GeoJSON geometry, so the value is persisted verbatim and never
/// re-inferred from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AoiKind {
    Point,
    Polygon,
    Polyline,
    Rectangle,
}

impl AoiKind {
    /// Stable string label used in persisted state and panel rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
            Self::Rectangle => "rectangle",
        }
    }

    /// Whether this kind is compatible with the given geometry value.
    fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Point, Value::Point(_))
                | (Self::Polygon, Value::Polygon(_))
                | (Self::Rectangle, Value::Polygon(_))
                | (Self::Polyline, Value::LineString(_))
        )
    }
}

impl Display for AoiKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for AOI construction and deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AoiValidationError {
    NilId,
    MissingGeometry(AoiId),
    KindMismatch {
        kind: AoiKind,
        geometry: &'static str,
    },
}

impl Display for AoiValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "aoi id must not be the nil uuid"),
            Self::MissingGeometry(id) => write!(f, "aoi {id} has no geometry payload"),
            Self::KindMismatch { kind, geometry } => {
                write!(f, "aoi kind `{kind}` does not accept geometry `{geometry}`")
            }
        }
    }
}

impl Error for AoiValidationError {}

/// Canonical Area-of-Interest record.
///
/// The `geojson` feature is the authoritative shape payload for non-point
/// kinds; `lat`/`lng` hold the derived centroid and stay `None` when the
/// geometry could not be summarized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAoi")]
pub struct Aoi {
    /// Stable opaque ID, generated at creation.
    pub id: AoiId,
    /// User-editable display label; defaults to a timestamp-derived string.
    pub name: String,
    /// Serialized as `type` to match the persisted blob schema.
    #[serde(rename = "type")]
    pub kind: AoiKind,
    /// Centroid latitude, best effort.
    pub lat: Option<f64>,
    /// Centroid longitude, best effort.
    pub lng: Option<f64>,
    /// Raw geometry payload (Feature with Point/Polygon/LineString).
    pub geojson: Feature,
}

/// Wire shape used to re-validate records on deserialization.
#[derive(Debug, Deserialize)]
struct RawAoi {
    id: AoiId,
    name: String,
    #[serde(rename = "type")]
    kind: AoiKind,
    // Older blobs omit the centroid keys entirely instead of storing null.
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    geojson: Feature,
}

impl TryFrom<RawAoi> for Aoi {
    type Error = AoiValidationError;

    fn try_from(raw: RawAoi) -> Result<Self, Self::Error> {
        let aoi = Aoi {
            id: raw.id,
            name: raw.name,
            kind: raw.kind,
            lat: raw.lat,
            lng: raw.lng,
            geojson: raw.geojson,
        };
        aoi.validate()?;
        Ok(aoi)
    }
}

impl Aoi {
    /// Creates an AOI with a fresh stable ID and a timestamp-derived name.
    ///
    /// The centroid is derived from `geometry` and left unset when the
    /// geometry is malformed; that never blocks creation.
    pub fn new(kind: AoiKind, geometry: Geometry) -> Result<Self, AoiValidationError> {
        Self::with_id(Uuid::new_v4(), kind, geometry)
    }

    /// Creates an AOI with a caller-provided stable ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: AoiId,
        kind: AoiKind,
        geometry: Geometry,
    ) -> Result<Self, AoiValidationError> {
        let centroid = centroid_of(&geometry);
        let aoi = Self {
            id,
            name: default_name(epoch_millis()),
            kind,
            lat: centroid.map(|(lat, _)| lat),
            lng: centroid.map(|(_, lng)| lng),
            geojson: Feature::from(geometry),
        };
        aoi.validate()?;
        Ok(aoi)
    }

    /// Checks the record-level invariants.
    ///
    /// Write paths call this before persistence; deserialization re-runs it
    /// so malformed persisted state is rejected instead of masked.
    pub fn validate(&self) -> Result<(), AoiValidationError> {
        if self.id.is_nil() {
            return Err(AoiValidationError::NilId);
        }
        let Some(geometry) = self.geojson.geometry.as_ref() else {
            return Err(AoiValidationError::MissingGeometry(self.id));
        };
        if !self.kind.accepts(&geometry.value) {
            return Err(AoiValidationError::KindMismatch {
                kind: self.kind,
                geometry: geometry_label(&geometry.value),
            });
        }
        Ok(())
    }

    /// Returns the centroid as `(lat, lng)` when both components are set.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lng?))
    }
}

/// Derives a representative `(lat, lng)` for a geometry.
///
/// Unweighted arithmetic mean of the vertex coordinates: the outer ring for
/// polygons (closing duplicate vertex dropped), the vertex sequence for
/// lines, the point itself for points. A coarse summary, not an
/// area-weighted centroid; fine for small simple shapes.
pub fn centroid_of(geometry: &Geometry) -> Option<(f64, f64)> {
    match &geometry.value {
        Value::Point(position) => latlng(position),
        Value::Polygon(rings) => vertex_mean(ring_without_closure(rings.first()?)),
        Value::LineString(positions) => vertex_mean(positions),
        _ => None,
    }
}

/// GeoJSON polygon rings repeat the first vertex at the end; averaging must
/// not count it twice.
fn ring_without_closure(ring: &[Vec<f64>]) -> &[Vec<f64>] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

fn vertex_mean(positions: &[Vec<f64>]) -> Option<(f64, f64)> {
    if positions.is_empty() {
        return None;
    }
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;
    for position in positions {
        let (lat, lng) = latlng(position)?;
        lat_sum += lat;
        lng_sum += lng;
    }
    let count = positions.len() as f64;
    Some((lat_sum / count, lng_sum / count))
}

/// GeoJSON positions are `[lng, lat]`; everything user-facing is `(lat, lng)`.
fn latlng(position: &[f64]) -> Option<(f64, f64)> {
    match position {
        [lng, lat, ..] => Some((*lat, *lng)),
        _ => None,
    }
}

fn geometry_label(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Default display label: `AOI ` plus the last five digits of the creation
/// timestamp in epoch milliseconds.
pub fn default_name(epoch_ms: i64) -> String {
    format!("AOI {:05}", epoch_ms.rem_euclid(100_000))
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::{centroid_of, default_name, ring_without_closure};
    use geojson::{Geometry, Value};

    #[test]
    fn ring_closure_is_dropped_once() {
        let ring = vec![vec![0.0, 0.0], vec![0.0, 2.0], vec![0.0, 0.0]];
        assert_eq!(ring_without_closure(&ring).len(), 2);

        let open = vec![vec![0.0, 0.0], vec![0.0, 2.0]];
        assert_eq!(ring_without_closure(&open).len(), 2);
    }

    #[test]
    fn point_centroid_is_the_point() {
        let geometry = Geometry::new(Value::Point(vec![7.5, 51.5]));
        assert_eq!(centroid_of(&geometry), Some((51.5, 7.5)));
    }

    #[test]
    fn short_position_yields_no_centroid() {
        let geometry = Geometry::new(Value::LineString(vec![vec![1.0], vec![2.0, 3.0]]));
        assert_eq!(centroid_of(&geometry), None);
    }

    #[test]
    fn default_name_keeps_five_digits() {
        assert_eq!(default_name(1_700_000_012_345), "AOI 12345");
        assert_eq!(default_name(1_700_000_000_007), "AOI 00007");
    }
}
