//! Gesture-to-event translation and layer reconciliation.
//!
//! # Responsibility
//! - Track the interaction mode state machine (idle / one-shot marker
//!   placement / toolkit-driven drawing).
//! - Turn completed gestures into fully-formed AOI events.
//! - Re-render the authoritative list through the surface and rebuild the
//!   layer side table.
//!
//! # Invariants
//! - Marker placement and drawing never overlap; starting one forcibly
//!   exits the other.
//! - Plain map clicks are suppressed entirely while a shape gesture is in
//!   progress.
//! - `sync` is a full wipe-and-redraw; the side table is rebuilt from the
//!   list, never from walking widget internals.

use crate::map::surface::{DrawTool, LayerHandle, MapSurface};
use crate::model::aoi::{Aoi, AoiId, AoiKind};
use geojson::{Geometry, Value};
use log::{error, warn};
use std::collections::HashMap;

/// Adapter-internal interaction mode, invisible to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Map clicks are ignored.
    #[default]
    Idle,
    /// The next map click places one pin, then the mode resets.
    MarkerPlacement,
    /// The toolkit's gesture handler owns input until the shape completes
    /// or is cancelled.
    Drawing(DrawTool),
}

/// Lifecycle event emitted toward the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AoiEvent {
    /// Fired exactly once per completed gesture; the record carries a fresh
    /// id and a best-effort centroid.
    Created(Aoi),
    /// Layers removed directly on the map (toolkit delete action), resolved
    /// to ids through the side table.
    Deleted(Vec<AoiId>),
    /// Broader "layers changed, resync" signal fired alongside deletes.
    LayersCleared,
}

/// Wraps the map widget's drawing toolkit.
pub struct MapAdapter {
    mode: InteractionMode,
    /// Side table mapping surface layer handles to AOI ids, rebuilt on
    /// every re-sync; replaces tagging widget-internal objects.
    layer_index: HashMap<LayerHandle, AoiId>,
}

impl Default for MapAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MapAdapter {
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::Idle,
            layer_index: HashMap::new(),
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Number of layers currently tracked in the side table.
    pub fn layer_count(&self) -> usize {
        self.layer_index.len()
    }

    /// Arms a drawing tool from a toolbar press.
    ///
    /// Marker placement is the adapter's own one-shot click mode. Shape
    /// tools delegate to the toolkit's native handler, then to its internal
    /// toolbar handler; when both are unavailable the press is a logged
    /// no-op and the mode stays idle.
    pub fn arm(&mut self, surface: &mut dyn MapSurface, tool: DrawTool) {
        // Starting any tool forcibly exits the previous mode.
        self.mode = InteractionMode::Idle;

        if tool == DrawTool::Marker {
            self.mode = InteractionMode::MarkerPlacement;
            return;
        }

        if surface.arm_draw_tool(tool).is_ok() || surface.arm_draw_tool_via_toolbar(tool).is_ok() {
            self.mode = InteractionMode::Drawing(tool);
            return;
        }

        error!("event=draw_arm module=map status=error tool={tool} error=no_handler_available");
    }

    /// Handles a plain map click.
    ///
    /// Only meaningful in marker-placement mode: one pin per arming, then
    /// back to idle. Clicks while drawing belong to the shape gesture and
    /// are never misread as marker placement.
    pub fn click(&mut self, lat: f64, lng: f64) -> Option<AoiEvent> {
        match self.mode {
            InteractionMode::Idle | InteractionMode::Drawing(_) => None,
            InteractionMode::MarkerPlacement => {
                self.mode = InteractionMode::Idle;
                let geometry = Geometry::new(Value::Point(vec![lng, lat]));
                self.build_created(AoiKind::Point, geometry)
            }
        }
    }

    /// Handles a completed toolkit gesture carrying the drawn geometry.
    ///
    /// The rectangle kind exists only here: both rectangle and polygon
    /// serialize to a GeoJSON Polygon, so the armed tool tags the record at
    /// creation time. Completion always resets to idle.
    pub fn complete_draw(&mut self, geometry: Geometry) -> Option<AoiEvent> {
        let armed = match self.mode {
            InteractionMode::Drawing(tool) => Some(tool),
            _ => None,
        };
        self.mode = InteractionMode::Idle;

        let kind = match (&geometry.value, armed) {
            (Value::Point(_), _) => AoiKind::Point,
            (Value::Polygon(_), Some(DrawTool::Rectangle)) => AoiKind::Rectangle,
            (Value::Polygon(_), _) => AoiKind::Polygon,
            (Value::LineString(_), _) => AoiKind::Polyline,
            _ => {
                warn!("event=draw_complete module=map status=error error=unsupported_geometry");
                return None;
            }
        };

        self.build_created(kind, geometry)
    }

    /// Cancels an in-progress gesture (toolkit draw-stop).
    pub fn cancel_draw(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Full wipe-and-redraw of the surface from the authoritative list.
    ///
    /// O(n) per update, no incremental diffing. Shapes whose payload the
    /// surface rejects are skipped with a log entry.
    pub fn sync(&mut self, surface: &mut dyn MapSurface, aois: &[Aoi]) {
        surface.clear_layers();
        self.layer_index.clear();

        for aoi in aois {
            let handle = match (aoi.kind, aoi.centroid()) {
                (AoiKind::Point, Some((lat, lng))) => surface.add_marker(lat, lng, &aoi.name),
                _ => match surface.add_shape(&aoi.geojson) {
                    Ok(handle) => handle,
                    Err(err) => {
                        warn!(
                            "event=layer_render module=map status=error aoi={} error={err}",
                            aoi.id
                        );
                        continue;
                    }
                },
            };
            self.layer_index.insert(handle, aoi.id);
        }
    }

    /// Reports layers the toolkit removed directly on the map, bypassing
    /// the sidebar delete button.
    pub fn layers_removed(&mut self, handles: &[LayerHandle]) -> Vec<AoiEvent> {
        let ids: Vec<AoiId> = handles
            .iter()
            .filter_map(|handle| self.layer_index.remove(handle))
            .collect();
        self.mode = InteractionMode::Idle;

        let mut events = Vec::new();
        if !ids.is_empty() {
            events.push(AoiEvent::Deleted(ids));
        }
        events.push(AoiEvent::LayersCleared);
        events
    }

    /// Toolbar "clear all": wipes the surface and reports every tracked
    /// layer as deleted.
    pub fn clear_all(&mut self, surface: &mut dyn MapSurface) -> Vec<AoiEvent> {
        let ids: Vec<AoiId> = self.layer_index.drain().map(|(_, id)| id).collect();
        surface.clear_layers();
        self.mode = InteractionMode::Idle;

        let mut events = Vec::new();
        if !ids.is_empty() {
            events.push(AoiEvent::Deleted(ids));
        }
        events.push(AoiEvent::LayersCleared);
        events
    }

    fn build_created(&mut self, kind: AoiKind, geometry: Geometry) -> Option<AoiEvent> {
        match Aoi::new(kind, geometry) {
            Ok(aoi) => Some(AoiEvent::Created(aoi)),
            Err(err) => {
                warn!("event=draw_complete module=map status=error error={err}");
                None
            }
        }
    }
}
