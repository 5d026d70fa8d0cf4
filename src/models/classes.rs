// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class visibility selection.
//!
//! Candidates are the classes used by at least one box, plus the reserved
//! `ignore` class. The visible set is user-controlled and survives boxes
//! being added or removed; it is seeded with every candidate the first
//! time any box carries a class, unless the user has already toggled.

use super::region::{Region, IGNORE_CLASS};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct ClassSelection {
    candidates: BTreeSet<String>,
    visible: BTreeSet<String>,
    /// One-way flag; set on the first manual toggle
    user_selected: bool,
}

impl ClassSelection {
    /// Re-derive candidates from the current boxes and apply auto-seeding.
    pub fn recompute(&mut self, regions: &[Region]) {
        let used: BTreeSet<String> = regions.iter().map(|r| r.class.clone()).collect();
        let has_labels = !used.is_empty();

        self.candidates = used;
        self.candidates.insert(IGNORE_CLASS.to_string());

        if !self.user_selected && self.visible.is_empty() && has_labels {
            self.visible = self.candidates.clone();
            log::debug!("Classes: seeded visibility with {:?}", self.visible);
        }
    }

    /// Show everything, or hide everything when all candidates are already visible.
    pub fn toggle_all(&mut self) {
        self.user_selected = true;
        if self.all_visible() {
            self.visible.clear();
        } else {
            self.visible = self.candidates.clone();
        }
    }

    pub fn toggle(&mut self, class: &str) {
        self.user_selected = true;
        if !self.visible.remove(class) {
            self.visible.insert(class.to_string());
        }
    }

    pub fn all_visible(&self) -> bool {
        self.candidates.is_subset(&self.visible)
    }

    pub fn is_visible(&self, class: &str) -> bool {
        self.visible.contains(class)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    #[cfg(test)]
    pub fn visible(&self) -> &BTreeSet<String> {
        &self.visible
    }

    #[cfg(test)]
    pub fn user_selected(&self) -> bool {
        self.user_selected
    }
}
