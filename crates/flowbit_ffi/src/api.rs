//! FFI use-case API for the map shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level panel functions to the UI via FRB.
//! - Hold the process-global panel runtime and the buffered render plan.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The shell never reads map state back; it replays the drained render
//!   plan onto the widget and reports gestures through these entry points.

use flowbit_core::db::open_db;
use flowbit_core::map::tiles;
use flowbit_core::map::{SHAPE_STROKE_COLOR, SHAPE_STROKE_WEIGHT};
use flowbit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BufferedSurface, ConfirmPrompt, DrawTool, Geocoder, NominatimGeocoder, Panel,
    SqliteAoiArchive, SurfaceCommand,
};
use geojson::GeoJson;
use log::info;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;
use uuid::Uuid;

const PANEL_DB_FILE_NAME: &str = "flowbit_panel.sqlite3";
const PANEL_DB_PATH_ENV: &str = "FLOWBIT_DB_PATH";

static RUNTIME: OnceLock<Mutex<Option<PanelRuntime>>> = OnceLock::new();

struct PanelRuntime {
    panel: Panel<SqliteAoiArchive>,
    surface: BufferedSurface,
    geocoder: NominatimGeocoder,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same configuration (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// One sidebar row in the panel snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelAoiItem {
    /// Stable AOI ID in string form.
    pub id: String,
    pub name: String,
    /// Kind label (`point|polygon|polyline|rectangle`).
    pub kind: String,
    /// Centroid summary, empty when unknown.
    pub summary: String,
}

/// Snapshot envelope for the sidebar list.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshotResponse {
    pub items: Vec<PanelAoiItem>,
    pub message: String,
}

/// One drained drawing command for the widget to replay, flattened into an
/// FRB-friendly shape. `op` selects which optional fields are set.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommandItem {
    /// `clear_layers|add_marker|add_shape|set_view|arm_draw_tool`.
    pub op: String,
    pub handle: Option<u64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<u8>,
    pub label: Option<String>,
    pub geojson: Option<String>,
    pub tool: Option<String>,
}

/// Render-plan envelope; commands are consumed by the drain.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlanResponse {
    pub commands: Vec<RenderCommandItem>,
    pub message: String,
}

/// One place suggestion for the search dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSuggestionItem {
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Search-box state envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStateResponse {
    pub query: String,
    pub loading: bool,
    /// Inline notice (`No results` / `Search failed`), empty when clear.
    pub notice: String,
    pub suggestions: Vec<SearchSuggestionItem>,
    pub message: String,
}

/// Static widget configuration: initial view, tile source and shape style.
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefaultsResponse {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    pub tile_url_template: String,
    pub tile_subdomains: Vec<String>,
    pub tile_attribution: String,
    pub max_tile_zoom: u8,
    pub shape_stroke_color: String,
    pub shape_stroke_weight: u32,
}

/// Returns the widget configuration the shell applies before the first
/// render plan.
///
/// # FFI contract
/// - Sync call, non-blocking, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn map_defaults() -> MapDefaultsResponse {
    let (center_lat, center_lng) = tiles::DEFAULT_CENTER;
    MapDefaultsResponse {
        center_lat,
        center_lng,
        zoom: tiles::DEFAULT_ZOOM,
        tile_url_template: tiles::TILE_URL_TEMPLATE.to_string(),
        tile_subdomains: tiles::TILE_SUBDOMAINS
            .iter()
            .map(|subdomain| subdomain.to_string())
            .collect(),
        tile_attribution: tiles::TILE_ATTRIBUTION.to_string(),
        max_tile_zoom: tiles::MAX_TILE_ZOOM,
        shape_stroke_color: SHAPE_STROKE_COLOR.to_string(),
        shape_stroke_weight: SHAPE_STROKE_WEIGHT,
    }
}

/// Returns the current sidebar rows.
///
/// # FFI contract
/// - Sync call, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn panel_snapshot() -> PanelSnapshotResponse {
    match with_runtime(|runtime| {
        runtime
            .panel
            .rows()
            .into_iter()
            .map(|row| PanelAoiItem {
                id: row.id.to_string(),
                name: row.name,
                kind: row.kind.to_string(),
                summary: row.summary,
            })
            .collect::<Vec<_>>()
    }) {
        Ok(items) => PanelSnapshotResponse {
            message: format!("{} AOI(s).", items.len()),
            items,
        },
        Err(err) => PanelSnapshotResponse {
            items: Vec::new(),
            message: format!("panel_snapshot failed: {err}"),
        },
    }
}

/// Arms one of the four drawing tools from a toolbar press.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Unknown tool ids fail softly with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn map_arm_tool(tool: String) -> ActionResponse {
    let Some(tool) = DrawTool::parse(tool.as_str()) else {
        return ActionResponse::failure(format!("unknown draw tool `{tool}`"));
    };
    run_action(format!("Tool `{tool}` armed."), move |runtime| {
        runtime.panel.arm_tool(&mut runtime.surface, tool);
        Ok(())
    })
}

/// Reports a plain map click.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Creates a pin only while marker placement is armed.
#[flutter_rust_bridge::frb(sync)]
pub fn map_click(lat: f64, lng: f64) -> ActionResponse {
    run_action("Click handled.", move |runtime| {
        runtime.panel.map_click(&mut runtime.surface, lat, lng);
        Ok(())
    })
}

/// Reports a completed toolkit gesture with its GeoJSON payload (a Feature
/// or a bare geometry).
///
/// # FFI contract
/// - Sync call, never panics.
/// - Unreadable payloads fail softly with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn map_complete_shape(geojson: String) -> ActionResponse {
    let geometry = match geojson.parse::<GeoJson>() {
        Ok(GeoJson::Feature(feature)) => feature.geometry,
        Ok(GeoJson::Geometry(geometry)) => Some(geometry),
        Ok(GeoJson::FeatureCollection(_)) => None,
        Err(err) => {
            return ActionResponse::failure(format!("shape payload unreadable: {err}"));
        }
    };
    let Some(geometry) = geometry else {
        return ActionResponse::failure("shape payload has no geometry");
    };

    run_action("Shape completed.", move |runtime| {
        runtime.panel.complete_shape(&mut runtime.surface, geometry);
        Ok(())
    })
}

/// Reports a cancelled toolkit gesture.
///
/// # FFI contract
/// - Sync call, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn map_cancel_shape() -> ActionResponse {
    run_action("Draw cancelled.", |runtime| {
        runtime.panel.cancel_shape();
        Ok(())
    })
}

/// Reports layers the toolkit removed directly on the map.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Unknown handles only trigger a re-sync.
#[flutter_rust_bridge::frb(sync)]
pub fn map_layers_removed(handles: Vec<u64>) -> ActionResponse {
    run_action("Layer removal handled.", move |runtime| {
        runtime.panel.layers_removed(&mut runtime.surface, &handles);
        Ok(())
    })
}

/// Toolbar trash button: clears the map, deleting every AOI.
///
/// # FFI contract
/// - Sync call, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn map_clear_all() -> ActionResponse {
    run_action("Map cleared.", |runtime| {
        runtime.panel.clear_map(&mut runtime.surface);
        Ok(())
    })
}

/// Renames one AOI; mutates the display name only.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Absent ids fail softly with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn panel_rename(id: String, name: String) -> ActionResponse {
    let Ok(id) = Uuid::parse_str(id.as_str()) else {
        return ActionResponse::failure(format!("invalid aoi id `{id}`"));
    };
    run_action("AOI renamed.", move |runtime| {
        if runtime.panel.save_rename(&mut runtime.surface, id, name) {
            Ok(())
        } else {
            Err(format!("aoi not found: {id}"))
        }
    })
}

/// Deletes one AOI from the sidebar.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Absent ids fail softly with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn panel_delete(id: String) -> ActionResponse {
    let Ok(id) = Uuid::parse_str(id.as_str()) else {
        return ActionResponse::failure(format!("invalid aoi id `{id}`"));
    };
    run_action("AOI deleted.", move |runtime| {
        if runtime.panel.delete(&mut runtime.surface, id) {
            Ok(())
        } else {
            Err(format!("aoi not found: {id}"))
        }
    })
}

/// Sidebar "Clear": empties the list when the shell's blocking prompt was
/// confirmed.
///
/// # FFI contract
/// - Sync call, never panics.
/// - `confirmed=false` leaves the list untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn panel_clear_all(confirmed: bool) -> ActionResponse {
    run_action("All AOIs cleared.", move |runtime| {
        if runtime
            .panel
            .clear_all(&mut runtime.surface, &ShellAnswer(confirmed))
        {
            Ok(())
        } else {
            Err("clear cancelled".to_string())
        }
    })
}

/// Drains the buffered drawing commands for the widget to replay in order.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Consuming: each command is returned exactly once.
#[flutter_rust_bridge::frb(sync)]
pub fn render_plan() -> RenderPlanResponse {
    match with_runtime(|runtime| {
        runtime
            .surface
            .drain()
            .into_iter()
            .map(to_render_command)
            .collect::<Vec<_>>()
    }) {
        Ok(commands) => RenderPlanResponse {
            message: format!("{} command(s).", commands.len()),
            commands,
        },
        Err(err) => RenderPlanResponse {
            commands: Vec::new(),
            message: format!("render_plan failed: {err}"),
        },
    }
}

/// Records a search-box keystroke.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Blank input clears suggestions without a lookup.
#[flutter_rust_bridge::frb(sync)]
pub fn search_input(text: String) -> ActionResponse {
    run_action("Query recorded.", move |runtime| {
        runtime.panel.search_input(text, Instant::now());
        Ok(())
    })
}

/// Drives the debounced lookup and returns the current search-box state.
///
/// The shell calls this on a short tick; once the debounce window has
/// settled the due lookup is dispatched to the geocoding provider and its
/// outcome applied. Stale generations are dropped in core.
///
/// # FFI contract
/// - Sync call; may block on the network for up to the lookup timeout, so
///   the shell keeps it off the UI thread.
/// - Never panics; lookup failures surface as the inline notice.
#[flutter_rust_bridge::frb(sync)]
pub fn search_pump() -> SearchStateResponse {
    let state = with_runtime(|runtime| {
        if let Some(pending) = runtime.panel.search_poll(Instant::now()) {
            let outcome = runtime.geocoder.lookup(pending.query.as_str());
            runtime.panel.search_apply(pending.generation, outcome);
        }

        let search = runtime.panel.search();
        SearchStateResponse {
            query: search.query().to_string(),
            loading: search.is_loading(),
            notice: search
                .notice()
                .map(|notice| notice.message().to_string())
                .unwrap_or_default(),
            suggestions: search
                .suggestions()
                .iter()
                .map(|suggestion| SearchSuggestionItem {
                    display_name: suggestion.display_name.clone(),
                    lat: suggestion.lat,
                    lng: suggestion.lng,
                })
                .collect(),
            message: String::new(),
        }
    });

    match state {
        Ok(state) => state,
        Err(err) => SearchStateResponse {
            query: String::new(),
            loading: false,
            notice: String::new(),
            suggestions: Vec::new(),
            message: format!("search_pump failed: {err}"),
        },
    }
}

/// Jumps the view to a clicked suggestion.
///
/// # FFI contract
/// - Sync call, never panics.
/// - Out-of-range indices fail softly with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn search_select(index: u32) -> ActionResponse {
    run_action("Suggestion selected.", move |runtime| {
        if runtime.panel.search_select(&mut runtime.surface, index as usize) {
            Ok(())
        } else {
            Err("no suggestion at that position".to_string())
        }
    })
}

/// The "Go" button: jumps to the top suggestion.
///
/// # FFI contract
/// - Sync call, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn search_go() -> ActionResponse {
    run_action("Jumped to top suggestion.", |runtime| {
        if runtime.panel.search_go(&mut runtime.surface) {
            Ok(())
        } else {
            Err("no suggestions to go to".to_string())
        }
    })
}

struct ShellAnswer(bool);

impl ConfirmPrompt for ShellAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

fn run_action(
    success_message: impl Into<String>,
    action: impl FnOnce(&mut PanelRuntime) -> Result<(), String>,
) -> ActionResponse {
    match with_runtime(action) {
        Ok(Ok(())) => ActionResponse::success(success_message),
        Ok(Err(message)) | Err(message) => ActionResponse::failure(message),
    }
}

fn with_runtime<T>(f: impl FnOnce(&mut PanelRuntime) -> T) -> Result<T, String> {
    let cell = RUNTIME.get_or_init(|| Mutex::new(None));
    let mut guard = cell
        .lock()
        .map_err(|_| "panel runtime lock poisoned".to_string())?;

    if guard.is_none() {
        *guard = Some(bootstrap_runtime()?);
    }
    match guard.as_mut() {
        Some(runtime) => Ok(f(runtime)),
        None => Err("panel runtime unavailable".to_string()),
    }
}

fn bootstrap_runtime() -> Result<PanelRuntime, String> {
    let db_path = resolve_panel_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("panel DB open failed: {err}"))?;
    let archive = SqliteAoiArchive::try_new(conn)
        .map_err(|err| format!("panel archive init failed: {err}"))?;

    let mut surface = BufferedSurface::new();
    let panel = Panel::open(archive, &mut surface);
    info!(
        "event=ffi_bootstrap module=panel status=ok db={}",
        db_path.display()
    );

    Ok(PanelRuntime {
        panel,
        surface,
        geocoder: NominatimGeocoder::new(),
    })
}

fn resolve_panel_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(PANEL_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(PANEL_DB_FILE_NAME)
}

fn to_render_command(command: SurfaceCommand) -> RenderCommandItem {
    let empty = RenderCommandItem {
        op: String::new(),
        handle: None,
        lat: None,
        lng: None,
        zoom: None,
        label: None,
        geojson: None,
        tool: None,
    };

    match command {
        SurfaceCommand::ClearLayers => RenderCommandItem {
            op: "clear_layers".to_string(),
            ..empty
        },
        SurfaceCommand::AddMarker {
            handle,
            lat,
            lng,
            label,
        } => RenderCommandItem {
            op: "add_marker".to_string(),
            handle: Some(handle),
            lat: Some(lat),
            lng: Some(lng),
            label: Some(label),
            ..empty
        },
        SurfaceCommand::AddShape { handle, geojson } => RenderCommandItem {
            op: "add_shape".to_string(),
            handle: Some(handle),
            geojson: Some(geojson),
            ..empty
        },
        SurfaceCommand::SetView { lat, lng, zoom } => RenderCommandItem {
            op: "set_view".to_string(),
            lat: Some(lat),
            lng: Some(lng),
            zoom: Some(zoom),
            ..empty
        },
        SurfaceCommand::ArmDrawTool { tool } => RenderCommandItem {
            op: "arm_draw_tool".to_string(),
            tool: Some(tool.as_str().to_string()),
            ..empty
        },
    }
}
