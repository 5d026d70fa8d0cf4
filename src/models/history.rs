// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! History system for undo/redo functionality.
//!
//! Whole-list snapshots are kept rather than diffs. Snapshots share
//! storage with the store until it is next mutated, so a capture costs a
//! reference-count bump and each edit copies the list once.
//!
//! Undo pops the most recent past state. Redo, by default, takes the
//! *oldest* entry queued on the future side ([`RedoOrder::Fifo`]); with
//! more than one undo outstanding this replays the state that was undone
//! first, not the one undone last.

use super::store::{RegionStore, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which future state a redo restores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedoOrder {
    /// Earliest-queued future state first.
    #[default]
    Fifo,
    /// Most recently undone state first.
    Lifo,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    /// Past states, most recent at the back
    past: Vec<Snapshot>,
    /// States undone, in the order they were undone
    future: VecDeque<Snapshot>,
    /// Optional cap on `past`; the oldest entries are dropped first
    max_size: Option<usize>,
    redo_order: RedoOrder,
}

impl History {
    pub fn with_limits(max_size: Option<usize>, redo_order: RedoOrder) -> Self {
        Self {
            max_size,
            redo_order,
            ..Default::default()
        }
    }

    /// Save the store's current state before making a change.
    pub fn capture(&mut self, store: &RegionStore) {
        self.push_past(store.snapshot());
        self.future.clear();
        log::debug!("History: captured {} regions ({} undo steps)", store.len(), self.past.len());
    }

    /// Restore the previous state. Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut RegionStore) -> bool {
        let Some(previous) = self.past.pop() else {
            return false;
        };
        self.future.push_back(store.snapshot());
        store.replace_all(previous);
        true
    }

    /// Restore a future state. Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut RegionStore) -> bool {
        let next = match self.redo_order {
            RedoOrder::Fifo => self.future.pop_front(),
            RedoOrder::Lifo => self.future.pop_back(),
        };
        let Some(next) = next else {
            return false;
        };
        self.push_past(store.snapshot());
        store.replace_all(next);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past.push(snapshot);
        if let Some(max) = self.max_size {
            if self.past.len() > max {
                let excess = self.past.len() - max;
                self.past.drain(..excess);
            }
        }
    }
}
