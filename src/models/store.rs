// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region store.
//!
//! The ordered list of boxes on the canvas (order is drawing order) plus
//! the current selection. The list is held as a shared, immutable
//! [`Snapshot`]: taking a snapshot is a reference-count bump, and the
//! first mutation afterwards copies the list (copy-on-write). Callers can
//! therefore keep snapshots without ever observing later edits.

use super::region::{Region, RegionId, RegionPatch};
use std::sync::Arc;
use thiserror::Error;

/// An immutable copy of the store's region list at one instant.
pub type Snapshot = Arc<Vec<Region>>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("no region with id '{0}'")]
    UnknownRegion(RegionId),
}

#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    regions: Snapshot,
    selected: Option<RegionId>,
}

impl RegionStore {
    /// Current regions in drawing order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Cheap shared copy of the current region list.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.regions)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// Replace the whole list. The selection is kept only if it still exists.
    pub fn replace_all(&mut self, regions: impl Into<Snapshot>) {
        self.regions = regions.into();
        if let Some(id) = &self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Append a region and return its id.
    pub fn add(&mut self, region: Region) -> RegionId {
        let id = region.id.clone();
        Arc::make_mut(&mut self.regions).push(region);
        id
    }

    pub fn update(&mut self, id: &RegionId, patch: &RegionPatch) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        Arc::make_mut(&mut self.regions)[index].apply(patch);
        Ok(())
    }

    /// Replace the region with the same id by `region`.
    pub fn put(&mut self, region: Region) -> Result<(), StoreError> {
        let index = self.index_of(&region.id)?;
        Arc::make_mut(&mut self.regions)[index] = region;
        Ok(())
    }

    pub fn remove(&mut self, id: &RegionId) -> Result<Region, StoreError> {
        let index = self.index_of(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Ok(Arc::make_mut(&mut self.regions).remove(index))
    }

    /// Set or clear the selection. Selecting an unknown id clears it.
    pub fn select(&mut self, id: Option<RegionId>) {
        self.selected = id.filter(|id| self.get(id).is_some());
    }

    pub fn selected(&self) -> Option<&RegionId> {
        self.selected.as_ref()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Topmost region accepted by `filter` that contains the image-space point.
    pub fn hit_test(&self, x: f64, y: f64, filter: impl Fn(&Region) -> bool) -> Option<&Region> {
        self.regions
            .iter()
            .rev()
            .find(|r| filter(r) && r.contains(x, y))
    }

    fn index_of(&self, id: &RegionId) -> Result<usize, StoreError> {
        self.regions
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| StoreError::UnknownRegion(id.clone()))
    }
}
