//! Authoritative AOI list.
//!
//! # Responsibility
//! - Hold the single logical source of truth for AOIs in display order.
//! - Persist the full list after every successful mutation.
//!
//! # Invariants
//! - Insertion order equals display order.
//! - Archive failures never surface to the user: loads degrade to an empty
//!   list, saves are logged and swallowed (in-memory state stays
//!   authoritative for the session).

use crate::model::aoi::{Aoi, AoiId};
use crate::store::archive::AoiArchive;
use log::warn;

/// Ordered AOI list with soft-durability persistence.
pub struct AoiStore<A: AoiArchive> {
    aois: Vec<Aoi>,
    archive: A,
}

impl<A: AoiArchive> AoiStore<A> {
    /// Opens the store from the archive.
    ///
    /// A missing blob and a failed load both start an empty session; load
    /// failures are logged, never surfaced.
    pub fn open(archive: A) -> Self {
        let aois = match archive.load() {
            Ok(Some(aois)) => aois,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("event=store_load module=store status=error error={err}");
                Vec::new()
            }
        };
        Self { aois, archive }
    }

    /// The authoritative list, in display order.
    pub fn aois(&self) -> &[Aoi] {
        &self.aois
    }

    pub fn len(&self) -> usize {
        self.aois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aois.is_empty()
    }

    pub fn get(&self, id: AoiId) -> Option<&Aoi> {
        self.aois.iter().find(|aoi| aoi.id == id)
    }

    /// Appends a fully-formed AOI.
    ///
    /// # Contract
    /// - The caller guarantees `aoi.id` is unique across the live list;
    ///   uniqueness is a documented precondition, not runtime-enforced.
    pub fn create(&mut self, aoi: Aoi) {
        self.aois.push(aoi);
        self.persist();
    }

    /// Removes one AOI by id. Absent ids are a no-op; returns whether
    /// anything changed.
    pub fn delete_one(&mut self, id: AoiId) -> bool {
        self.delete_many(&[id]) > 0
    }

    /// Removes every AOI whose id is in `ids`; ids not present are ignored.
    /// Returns the number of removed records.
    pub fn delete_many(&mut self, ids: &[AoiId]) -> usize {
        let before = self.aois.len();
        self.aois.retain(|aoi| !ids.contains(&aoi.id));
        let removed = before - self.aois.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Replaces the `name` field of one AOI; every other field is left
    /// untouched. Absent ids are a no-op; returns whether anything changed.
    pub fn rename(&mut self, id: AoiId, name: impl Into<String>) -> bool {
        let Some(aoi) = self.aois.iter_mut().find(|aoi| aoi.id == id) else {
            return false;
        };
        aoi.name = name.into();
        self.persist();
        true
    }

    /// Empties the list unconditionally.
    ///
    /// User confirmation is the panel controller's responsibility; by the
    /// time this runs the decision has been made.
    pub fn clear_all(&mut self) {
        self.aois.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.archive.save(&self.aois) {
            warn!(
                "event=store_save module=store status=error count={} error={err}",
                self.aois.len()
            );
        }
    }
}
