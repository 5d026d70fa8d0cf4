// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounding box data structures.
//!
//! This module defines the labeled rectangles drawn on an image and the
//! wire shapes exchanged with the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class assigned to boxes drawn without an explicit choice.
pub const DEFAULT_CLASS: &str = "default";

/// Reserved class that is always offered, even when no box uses it.
pub const IGNORE_CLASS: &str = "ignore";

/// Opaque, unique identity of a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Generate a fresh identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labeled axis-aligned rectangle in original image pixels.
///
/// Width and height may be negative while a resize gesture is in
/// progress; [`Region::normalized`] folds them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub class: String,
}

impl Region {
    /// Create a region with a freshly generated id.
    pub fn new(x: f64, y: f64, width: f64, height: f64, class: impl Into<String>) -> Self {
        Self {
            id: RegionId::generate(),
            x,
            y,
            width,
            height,
            class: class.into(),
        }
    }

    /// Same rectangle with non-negative width and height.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if out.width < 0.0 {
            out.x += out.width;
            out.width = -out.width;
        }
        if out.height < 0.0 {
            out.y += out.height;
            out.height = -out.height;
        }
        out
    }

    /// Normalized geometry rounded to the nearest whole pixel.
    ///
    /// Halves round away from zero (`f64::round`): 2.5 becomes 3 and
    /// -0.5 becomes -1.
    pub fn rounded(&self) -> PersistedRegion {
        let n = self.normalized();
        PersistedRegion {
            id: n.id,
            x: n.x.round() as i64,
            y: n.y.round() as i64,
            width: n.width.round() as i64,
            height: n.height.round() as i64,
            class: n.class,
        }
    }

    /// Check whether an image-space point lies inside the rectangle.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let n = self.normalized();
        px >= n.x && px <= n.x + n.width && py >= n.y && py <= n.y + n.height
    }

    /// Apply every field set in `patch`.
    pub fn apply(&mut self, patch: &RegionPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(class) = &patch.class {
            self.class = class.clone();
        }
    }
}

/// Partial update of a region's geometry and/or class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub class: Option<String>,
}

impl RegionPatch {
    /// Patch setting all four geometry fields from `region`.
    pub fn geometry(region: &Region) -> Self {
        Self {
            x: Some(region.x),
            y: Some(region.y),
            width: Some(region.width),
            height: Some(region.height),
            class: None,
        }
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            ..Default::default()
        }
    }
}

/// A region as sent to the save endpoint, with whole-pixel geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRegion {
    pub id: RegionId,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub class: String,
}
