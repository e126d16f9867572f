use flowbit_core::db::{open_db, open_db_in_memory};
use flowbit_core::{
    AoiKind, BufferedSurface, ConfirmPrompt, DrawTool, InteractionMode, Panel, PlaceSuggestion,
    SqliteAoiArchive, SurfaceCommand, SEARCH_DEBOUNCE,
};
use geojson::{Geometry, Value};
use std::time::Instant;

struct Answer(bool);

impl ConfirmPrompt for Answer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

fn memory_panel(surface: &mut BufferedSurface) -> Panel<SqliteAoiArchive> {
    let archive = SqliteAoiArchive::try_new(open_db_in_memory().unwrap()).unwrap();
    Panel::open(archive, surface)
}

fn rectangle_geometry() -> Geometry {
    Geometry::new(Value::Polygon(vec![vec![
        vec![0.0, 0.0],
        vec![0.0, 2.0],
        vec![2.0, 2.0],
        vec![2.0, 0.0],
        vec![0.0, 0.0],
    ]]))
}

fn polyline_geometry() -> Geometry {
    Geometry::new(Value::LineString(vec![vec![0.0, 0.0], vec![2.0, 2.0]]))
}

fn layer_adds(commands: &[SurfaceCommand]) -> usize {
    commands
        .iter()
        .filter(|command| {
            matches!(
                command,
                SurfaceCommand::AddMarker { .. } | SurfaceCommand::AddShape { .. }
            )
        })
        .count()
}

#[test]
fn opening_centers_the_default_view() {
    let mut surface = BufferedSurface::new();
    let _panel = memory_panel(&mut surface);

    assert!(surface
        .commands()
        .iter()
        .any(|command| matches!(
            command,
            SurfaceCommand::SetView {
                lat,
                lng,
                zoom: 6
            } if *lat == 51.5 && *lng == 7.5
        )));
}

#[test]
fn place_pin_scenario_is_one_shot() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);

    let rows = panel.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, "point");
    assert_eq!(rows[0].summary, "51.5000, 7.5000");
    assert_eq!(panel.mode(), InteractionMode::Idle);

    // A second plain click does not create another pin.
    panel.map_click(&mut surface, 51.5, 7.5);
    assert_eq!(panel.rows().len(), 1);
}

#[test]
fn each_gesture_yields_one_entry_and_one_layer() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);
    panel.arm_tool(&mut surface, DrawTool::Rectangle);
    panel.complete_shape(&mut surface, rectangle_geometry());
    panel.arm_tool(&mut surface, DrawTool::Polyline);
    surface.drain();
    panel.complete_shape(&mut surface, polyline_geometry());

    assert_eq!(panel.aois().len(), 3);
    let ids: std::collections::HashSet<_> = panel.aois().iter().map(|aoi| aoi.id).collect();
    assert_eq!(ids.len(), 3);

    // The final re-sync rendered exactly one layer per stored AOI.
    assert_eq!(layer_adds(surface.commands()), 3);
}

#[test]
fn sidebar_delete_removes_entry_and_layer() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);
    let id = panel.aois()[0].id;

    surface.drain();
    assert!(panel.delete(&mut surface, id));
    assert!(panel.aois().is_empty());
    assert_eq!(layer_adds(surface.commands()), 0);

    // Absent ids are a no-op.
    assert!(!panel.delete(&mut surface, id));
}

#[test]
fn on_map_delete_flows_back_into_the_store() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Rectangle);
    surface.drain();
    panel.complete_shape(&mut surface, rectangle_geometry());

    let handles: Vec<u64> = surface
        .drain()
        .into_iter()
        .filter_map(|command| match command {
            SurfaceCommand::AddShape { handle, .. } => Some(handle),
            _ => None,
        })
        .collect();
    assert_eq!(handles.len(), 1);

    panel.layers_removed(&mut surface, &handles);
    assert!(panel.aois().is_empty());
}

#[test]
fn toolbar_clear_deletes_everything() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);
    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 52.0, 8.0);
    assert_eq!(panel.aois().len(), 2);

    panel.clear_map(&mut surface);
    assert!(panel.aois().is_empty());
}

#[test]
fn rename_mutates_the_name_only_and_clears_editing() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);
    let before = panel.aois()[0].clone();

    assert!(panel.begin_rename(before.id));
    assert_eq!(panel.editing(), Some(before.id));
    assert!(panel.save_rename(&mut surface, before.id, "Harbor"));
    assert_eq!(panel.editing(), None);

    let after = &panel.aois()[0];
    assert_eq!(after.name, "Harbor");
    assert_eq!(after.id, before.id);
    assert_eq!(after.kind, before.kind);
    assert_eq!(after.lat, before.lat);
    assert_eq!(after.lng, before.lng);
    assert_eq!(after.geojson, before.geojson);
}

#[test]
fn begin_rename_requires_an_existing_row() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);
    assert!(!panel.begin_rename(uuid::Uuid::from_u128(7)));
    assert_eq!(panel.editing(), None);
}

#[test]
fn clear_all_requires_confirmation() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);

    panel.arm_tool(&mut surface, DrawTool::Marker);
    panel.map_click(&mut surface, 51.5, 7.5);

    assert!(!panel.clear_all(&mut surface, &Answer(false)));
    assert_eq!(panel.aois().len(), 1);

    surface.drain();
    assert!(panel.clear_all(&mut surface, &Answer(true)));
    assert!(panel.aois().is_empty());
    assert_eq!(layer_adds(surface.commands()), 0);
}

#[test]
fn persisted_panel_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("panel.sqlite3");
    let mut surface = BufferedSurface::new();

    let saved = {
        let archive = SqliteAoiArchive::try_new(open_db(&db_path).unwrap()).unwrap();
        let mut panel = Panel::open(archive, &mut surface);
        panel.arm_tool(&mut surface, DrawTool::Marker);
        panel.map_click(&mut surface, 51.5, 7.5);
        panel.arm_tool(&mut surface, DrawTool::Rectangle);
        panel.complete_shape(&mut surface, rectangle_geometry());
        panel.aois().to_vec()
    };

    let archive = SqliteAoiArchive::try_new(open_db(&db_path).unwrap()).unwrap();
    let panel = Panel::open(archive, &mut surface);
    assert_eq!(panel.aois(), saved.as_slice());
    assert_eq!(panel.aois()[1].kind, AoiKind::Rectangle);
}

#[test]
fn empty_list_survives_the_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("panel.sqlite3");
    let mut surface = BufferedSurface::new();

    {
        let archive = SqliteAoiArchive::try_new(open_db(&db_path).unwrap()).unwrap();
        let mut panel = Panel::open(archive, &mut surface);
        panel.arm_tool(&mut surface, DrawTool::Marker);
        panel.map_click(&mut surface, 51.5, 7.5);
        panel.clear_all(&mut surface, &Answer(true));
    }

    let archive = SqliteAoiArchive::try_new(open_db(&db_path).unwrap()).unwrap();
    let panel = Panel::open(archive, &mut surface);
    assert!(panel.aois().is_empty());
}

#[test]
fn selecting_a_suggestion_recenters_the_view() {
    let mut surface = BufferedSurface::new();
    let mut panel = memory_panel(&mut surface);
    let t0 = Instant::now();

    panel.search_input("Berlin", t0);
    let pending = panel.search_poll(t0 + SEARCH_DEBOUNCE).unwrap();
    panel.search_apply(
        pending.generation,
        Ok(vec![PlaceSuggestion {
            display_name: "Berlin, Deutschland".to_string(),
            lat: 52.517,
            lng: 13.389,
        }]),
    );

    surface.drain();
    assert!(panel.search_select(&mut surface, 0));
    assert!(surface.commands().iter().any(|command| matches!(
        command,
        SurfaceCommand::SetView { lat, lng, zoom: 13 }
            if (*lat - 52.517).abs() < 1e-9 && (*lng - 13.389).abs() < 1e-9
    )));
    assert_eq!(panel.search().query(), "Berlin, Deutschland");

    // Go with no suggestions left is a no-op.
    assert!(!panel.search_go(&mut surface));
}
