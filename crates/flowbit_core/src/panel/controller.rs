//! AOI panel controller.
//!
//! # Responsibility
//! - Own the store, the map adapter and the search box, and mediate every
//!   mutation between them.
//! - Produce the sidebar's render rows and the rename editing flow.
//!
//! # Invariants
//! - Every mutation ends with one full surface re-sync.
//! - Clear-all runs only after the user confirmed the blocking prompt;
//!   declining leaves the list untouched.

use crate::map::adapter::{AoiEvent, InteractionMode, MapAdapter};
use crate::map::surface::{DrawTool, LayerHandle, MapSurface};
use crate::map::tiles::{DEFAULT_CENTER, DEFAULT_ZOOM, SUGGESTION_ZOOM};
use crate::model::aoi::{Aoi, AoiId};
use crate::search::debounce::{PendingLookup, SearchBox};
use crate::search::geocode::{GeocodeResult, PlaceSuggestion};
use crate::store::aoi_store::AoiStore;
use crate::store::archive::AoiArchive;
use geojson::Geometry;
use log::info;
use std::time::Instant;

/// Blocking yes/no confirmation shown before destructive actions.
///
/// The shell implements this with its native dialog; tests stub it.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Prompt text for the clear-all confirmation.
pub const CLEAR_ALL_PROMPT: &str = "Clear all AOIs?";

/// One sidebar list row, pure render data.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiRow {
    pub id: AoiId,
    pub name: String,
    pub kind: &'static str,
    /// Centroid summary (`"51.5000, 7.5000"`), empty when unknown.
    pub summary: String,
}

/// Panel controller wiring the store, the map adapter and search together.
pub struct Panel<A: AoiArchive> {
    store: AoiStore<A>,
    adapter: MapAdapter,
    search: SearchBox,
    editing: Option<AoiId>,
}

impl<A: AoiArchive> Panel<A> {
    /// Opens the panel: loads the persisted list, centers the view on the
    /// default location and renders the initial layers.
    pub fn open(archive: A, surface: &mut dyn MapSurface) -> Self {
        let mut panel = Self {
            store: AoiStore::open(archive),
            adapter: MapAdapter::new(),
            search: SearchBox::new(),
            editing: None,
        };
        let (lat, lng) = DEFAULT_CENTER;
        surface.set_view(lat, lng, DEFAULT_ZOOM);
        panel.resync(surface);
        info!(
            "event=panel_open module=panel status=ok count={}",
            panel.store.len()
        );
        panel
    }

    pub fn aois(&self) -> &[Aoi] {
        self.store.aois()
    }

    pub fn mode(&self) -> InteractionMode {
        self.adapter.mode()
    }

    pub fn search(&self) -> &SearchBox {
        &self.search
    }

    /// Id currently in the rename editing state, if any.
    pub fn editing(&self) -> Option<AoiId> {
        self.editing
    }

    /// Sidebar rows in display order.
    pub fn rows(&self) -> Vec<AoiRow> {
        self.store
            .aois()
            .iter()
            .map(|aoi| AoiRow {
                id: aoi.id,
                name: aoi.name.clone(),
                kind: aoi.kind.as_str(),
                summary: aoi
                    .centroid()
                    .map(|(lat, lng)| format!("{lat:.4}, {lng:.4}"))
                    .unwrap_or_default(),
            })
            .collect()
    }

    // ---- map gestures -------------------------------------------------

    /// Toolbar press for one of the four drawing tools.
    pub fn arm_tool(&mut self, surface: &mut dyn MapSurface, tool: DrawTool) {
        self.adapter.arm(surface, tool);
    }

    /// Plain map click; creates a pin when marker placement is armed.
    pub fn map_click(&mut self, surface: &mut dyn MapSurface, lat: f64, lng: f64) {
        let event = self.adapter.click(lat, lng);
        self.apply_events(surface, event.into_iter().collect());
    }

    /// Completed toolkit gesture with the drawn geometry.
    pub fn complete_shape(&mut self, surface: &mut dyn MapSurface, geometry: Geometry) {
        let event = self.adapter.complete_draw(geometry);
        self.apply_events(surface, event.into_iter().collect());
    }

    /// Cancelled toolkit gesture.
    pub fn cancel_shape(&mut self) {
        self.adapter.cancel_draw();
    }

    /// Layers removed by the toolkit's own delete action on the map.
    pub fn layers_removed(&mut self, surface: &mut dyn MapSurface, handles: &[LayerHandle]) {
        let events = self.adapter.layers_removed(handles);
        self.apply_events(surface, events);
    }

    /// Toolbar trash button: wipe the map, deleting every AOI.
    pub fn clear_map(&mut self, surface: &mut dyn MapSurface) {
        let events = self.adapter.clear_all(surface);
        self.apply_events(surface, events);
    }

    // ---- sidebar intents ----------------------------------------------

    /// Deletes one AOI from the sidebar. Absent ids are a no-op.
    pub fn delete(&mut self, surface: &mut dyn MapSurface, id: AoiId) -> bool {
        if !self.store.delete_one(id) {
            return false;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.resync(surface);
        true
    }

    /// Enters the rename editing state for an existing AOI.
    pub fn begin_rename(&mut self, id: AoiId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.editing = Some(id);
        true
    }

    /// Saves a rename; mutates the name only. Absent ids are a no-op.
    pub fn save_rename(
        &mut self,
        surface: &mut dyn MapSurface,
        id: AoiId,
        name: impl Into<String>,
    ) -> bool {
        self.editing = None;
        if !self.store.rename(id, name) {
            return false;
        }
        self.resync(surface);
        true
    }

    pub fn cancel_rename(&mut self) {
        self.editing = None;
    }

    /// Sidebar "Clear": empties the list after the blocking confirmation.
    /// Returns whether the list was cleared.
    pub fn clear_all(&mut self, surface: &mut dyn MapSurface, prompt: &dyn ConfirmPrompt) -> bool {
        if !prompt.confirm(CLEAR_ALL_PROMPT) {
            return false;
        }
        self.store.clear_all();
        self.editing = None;
        self.resync(surface);
        true
    }

    // ---- search --------------------------------------------------------

    pub fn search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search.input(text, now);
    }

    pub fn search_poll(&mut self, now: Instant) -> Option<PendingLookup> {
        self.search.poll(now)
    }

    pub fn search_apply(&mut self, generation: u64, outcome: GeocodeResult<Vec<PlaceSuggestion>>) {
        self.search.apply(generation, outcome);
    }

    /// Jumps the view to a clicked suggestion.
    pub fn search_select(&mut self, surface: &mut dyn MapSurface, index: usize) -> bool {
        let Some((lat, lng)) = self.search.select(index) else {
            return false;
        };
        surface.set_view(lat, lng, SUGGESTION_ZOOM);
        true
    }

    /// "Go" button: jump to the top suggestion.
    pub fn search_go(&mut self, surface: &mut dyn MapSurface) -> bool {
        let Some((lat, lng)) = self.search.go() else {
            return false;
        };
        surface.set_view(lat, lng, SUGGESTION_ZOOM);
        true
    }

    // ---- reconciliation -----------------------------------------------

    fn apply_events(&mut self, surface: &mut dyn MapSurface, events: Vec<AoiEvent>) {
        if events.is_empty() {
            return;
        }
        for event in events {
            match event {
                AoiEvent::Created(aoi) => self.store.create(aoi),
                AoiEvent::Deleted(ids) => {
                    self.store.delete_many(&ids);
                }
                AoiEvent::LayersCleared => {}
            }
        }
        self.resync(surface);
    }

    fn resync(&mut self, surface: &mut dyn MapSurface) {
        self.adapter.sync(surface, self.store.aois());
    }
}
