use flowbit_core::{Aoi, AoiArchive, AoiKind, AoiStore, ArchiveError, ArchiveResult};
use geojson::{Geometry, Value};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// In-memory archive sharing its blob across clones, with switchable
/// failure injection for the soft-durability paths.
#[derive(Clone, Default)]
struct MemoryArchive {
    blob: Rc<RefCell<Option<String>>>,
    fail_saves: bool,
    fail_loads: bool,
}

fn malformed() -> ArchiveError {
    ArchiveError::MalformedBlob {
        key: "flowbit_aois_v1",
        source: serde_json::from_str::<Vec<Aoi>>("not json").unwrap_err(),
    }
}

impl AoiArchive for MemoryArchive {
    fn load(&self) -> ArchiveResult<Option<Vec<Aoi>>> {
        if self.fail_loads {
            return Err(malformed());
        }
        match self.blob.borrow().as_deref() {
            None => Ok(None),
            Some(blob) => serde_json::from_str(blob)
                .map(Some)
                .map_err(|source| ArchiveError::MalformedBlob {
                    key: "flowbit_aois_v1",
                    source,
                }),
        }
    }

    fn save(&self, aois: &[Aoi]) -> ArchiveResult<()> {
        if self.fail_saves {
            return Err(malformed());
        }
        *self.blob.borrow_mut() = Some(serde_json::to_string(aois).unwrap());
        Ok(())
    }
}

fn fixed_aoi(id: &str, name: &str) -> Aoi {
    let mut aoi = Aoi::with_id(
        Uuid::parse_str(id).unwrap(),
        AoiKind::Point,
        Geometry::new(Value::Point(vec![7.5, 51.5])),
    )
    .unwrap();
    aoi.name = name.to_string();
    aoi
}

const ID_A: &str = "00000000-0000-4000-8000-000000000001";
const ID_B: &str = "00000000-0000-4000-8000-000000000002";
const ID_C: &str = "00000000-0000-4000-8000-000000000003";

#[test]
fn create_appends_in_display_order() {
    let mut store = AoiStore::open(MemoryArchive::default());
    store.create(fixed_aoi(ID_B, "second"));
    store.create(fixed_aoi(ID_A, "first"));

    let names: Vec<&str> = store.aois().iter().map(|aoi| aoi.name.as_str()).collect();
    assert_eq!(names, ["second", "first"]);
}

#[test]
fn delete_one_is_idempotent() {
    let mut store = AoiStore::open(MemoryArchive::default());
    store.create(fixed_aoi(ID_A, "a"));

    let id = Uuid::parse_str(ID_A).unwrap();
    assert!(store.delete_one(id));
    assert!(!store.delete_one(id));
    assert!(store.is_empty());
}

#[test]
fn delete_many_ignores_absent_ids() {
    let mut store = AoiStore::open(MemoryArchive::default());
    store.create(fixed_aoi(ID_A, "a"));
    store.create(fixed_aoi(ID_B, "b"));
    store.create(fixed_aoi(ID_C, "c"));

    let removed = store.delete_many(&[
        Uuid::parse_str(ID_A).unwrap(),
        Uuid::parse_str(ID_C).unwrap(),
        Uuid::parse_str("00000000-0000-4000-8000-00000000ffff").unwrap(),
    ]);
    assert_eq!(removed, 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.aois()[0].name, "b");
}

#[test]
fn rename_touches_name_only() {
    let mut store = AoiStore::open(MemoryArchive::default());
    store.create(fixed_aoi(ID_A, "before"));
    let original = store.aois()[0].clone();

    let id = Uuid::parse_str(ID_A).unwrap();
    assert!(store.rename(id, "after"));

    let renamed = &store.aois()[0];
    assert_eq!(renamed.name, "after");
    assert_eq!(renamed.id, original.id);
    assert_eq!(renamed.kind, original.kind);
    assert_eq!(renamed.lat, original.lat);
    assert_eq!(renamed.lng, original.lng);
    assert_eq!(renamed.geojson, original.geojson);

    let absent = Uuid::parse_str(ID_B).unwrap();
    assert!(!store.rename(absent, "nobody"));
}

#[test]
fn clear_all_empties_and_persists() {
    let archive = MemoryArchive::default();
    let mut store = AoiStore::open(archive.clone());
    store.create(fixed_aoi(ID_A, "a"));
    store.create(fixed_aoi(ID_B, "b"));

    store.clear_all();
    assert!(store.is_empty());
    assert_eq!(archive.blob.borrow().as_deref(), Some("[]"));
}

#[test]
fn every_mutation_writes_the_full_list() {
    let archive = MemoryArchive::default();
    let mut store = AoiStore::open(archive.clone());

    store.create(fixed_aoi(ID_A, "a"));
    assert!(archive.blob.borrow().as_deref().unwrap().contains(ID_A));

    store.rename(Uuid::parse_str(ID_A).unwrap(), "renamed");
    assert!(archive.blob.borrow().as_deref().unwrap().contains("renamed"));

    store.delete_one(Uuid::parse_str(ID_A).unwrap());
    assert_eq!(archive.blob.borrow().as_deref(), Some("[]"));
}

#[test]
fn noop_mutations_do_not_rewrite_the_blob() {
    let archive = MemoryArchive::default();
    let mut store = AoiStore::open(archive.clone());

    store.delete_one(Uuid::parse_str(ID_A).unwrap());
    store.rename(Uuid::parse_str(ID_A).unwrap(), "ghost");
    assert!(archive.blob.borrow().is_none());
}

#[test]
fn save_failure_keeps_memory_authoritative() {
    let archive = MemoryArchive {
        fail_saves: true,
        ..MemoryArchive::default()
    };
    let mut store = AoiStore::open(archive);

    store.create(fixed_aoi(ID_A, "a"));
    store.create(fixed_aoi(ID_B, "b"));
    assert_eq!(store.len(), 2);
}

#[test]
fn load_failure_starts_empty() {
    let archive = MemoryArchive {
        fail_loads: true,
        ..MemoryArchive::default()
    };
    let store = AoiStore::open(archive);
    assert!(store.is_empty());
}

#[test]
fn missing_blob_starts_empty() {
    let store = AoiStore::open(MemoryArchive::default());
    assert!(store.is_empty());
}

#[test]
fn reload_round_trips_the_list() {
    let archive = MemoryArchive::default();
    let mut store = AoiStore::open(archive.clone());
    store.create(fixed_aoi(ID_A, "a"));
    store.create(fixed_aoi(ID_B, "b"));
    let saved = store.aois().to_vec();
    drop(store);

    let reloaded = AoiStore::open(archive);
    assert_eq!(reloaded.aois(), saved.as_slice());
}
