// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Regions are stored in original image pixels. The canvas shows them
//! divided by the zoom factor, and gestures on the canvas are multiplied
//! back before they are committed to the store.

use crate::models::region::{Region, DEFAULT_CLASS};

/// Drawn boxes smaller than this (in image pixels) are discarded.
pub const MIN_BOX_SIZE: f64 = 2.0;

/// A zoom factor relating displayed pixels to original image pixels.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Zoom(f64);

impl Zoom {
    /// Smallest and largest factors offered by the View menu.
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 10.0;

    /// Create a zoom factor, rejecting zero, negative and non-finite values.
    pub fn new(factor: f64) -> Option<Self> {
        (factor.is_finite() && factor > 0.0).then_some(Self(factor))
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    /// Multiply the factor by `ratio`, clamped to [`Zoom::MIN`, `Zoom::MAX`].
    pub fn scaled(self, ratio: f64) -> Self {
        Self::new(self.0 * ratio)
            .map(|z| Self(z.0.clamp(Self::MIN, Self::MAX)))
            .unwrap_or(self)
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Convert a stored region to displayed geometry.
pub fn to_display(region: &Region, zoom: Zoom) -> Region {
    let z = zoom.factor();
    Region {
        x: region.x / z,
        y: region.y / z,
        width: region.width / z,
        height: region.height / z,
        ..region.clone()
    }
}

/// Convert displayed geometry back to stored (original image) geometry.
pub fn to_stored(region: &Region, zoom: Zoom) -> Region {
    let z = zoom.factor();
    Region {
        x: region.x * z,
        y: region.y * z,
        width: region.width * z,
        height: region.height * z,
        ..region.clone()
    }
}

/// Stored geometry of a box shown as `origin` after the pointer travels
/// from `anchor` to `point`. All three are in displayed coordinates.
pub fn moved(origin: &Region, anchor: (f64, f64), point: (f64, f64), zoom: Zoom) -> Region {
    let mut shown = origin.clone();
    shown.x += point.0 - anchor.0;
    shown.y += point.1 - anchor.1;
    to_stored(&shown, zoom)
}

/// Like [`moved`], but the travel grows the bottom-right corner. The
/// result may have a negative size until the gesture is finished.
pub fn resized(origin: &Region, anchor: (f64, f64), point: (f64, f64), zoom: Zoom) -> Region {
    let mut shown = origin.clone();
    shown.width += point.0 - anchor.0;
    shown.height += point.1 - anchor.1;
    to_stored(&shown, zoom)
}

/// Box drawn by dragging from `start` to `current` (displayed points), in
/// stored geometry with non-negative size. A blank class becomes
/// [`DEFAULT_CLASS`]. Returns `None` below [`MIN_BOX_SIZE`].
pub fn drawn_region(start: (f64, f64), current: (f64, f64), zoom: Zoom, class: &str) -> Option<Region> {
    let class = match class.trim() {
        "" => DEFAULT_CLASS,
        class => class,
    };
    let shown = Region::new(start.0, start.1, current.0 - start.0, current.1 - start.1, class);
    let drawn = to_stored(&shown, zoom).normalized();
    (drawn.width >= MIN_BOX_SIZE && drawn.height >= MIN_BOX_SIZE).then_some(drawn)
}

/// Map a displayed length (e.g. a pointer delta) into image pixels.
pub fn display_to_stored_len(len: f64, zoom: Zoom) -> f64 {
    len * zoom.factor()
}

/// Screen rectangle of a stored region drawn with its image origin at `origin`.
pub fn screen_rect(region: &Region, zoom: Zoom, origin: egui::Pos2) -> egui::Rect {
    let shown = to_display(region, zoom).normalized();
    egui::Rect::from_min_size(
        origin + egui::vec2(shown.x as f32, shown.y as f32),
        egui::vec2(shown.width as f32, shown.height as f32),
    )
}

/// Convert a screen position to original image pixel coordinates.
pub fn screen_to_image(pos: egui::Pos2, zoom: Zoom, origin: egui::Pos2) -> (f64, f64) {
    let rel = pos - origin;
    (
        display_to_stored_len(rel.x as f64, zoom),
        display_to_stored_len(rel.y as f64, zoom),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::region::RegionId;

    fn sample() -> Region {
        Region {
            id: RegionId::from("a"),
            x: 10.0,
            y: 12.5,
            width: 50.0,
            height: -7.25,
            class: "car".to_string(),
        }
    }

    #[test]
    fn test_zoom_rejects_invalid_factors() {
        assert!(Zoom::new(0.0).is_none());
        assert!(Zoom::new(-1.0).is_none());
        assert!(Zoom::new(f64::NAN).is_none());
        assert!(Zoom::new(f64::INFINITY).is_none());
        assert_eq!(Zoom::new(2.0).map(Zoom::factor), Some(2.0));
    }

    #[test]
    fn test_display_divides_by_zoom() {
        let zoom = Zoom::new(2.0).unwrap();
        let shown = to_display(&sample(), zoom);
        assert_eq!(shown.x, 5.0);
        assert_eq!(shown.y, 6.25);
        assert_eq!(shown.width, 25.0);
        assert_eq!(shown.height, -3.625);
        assert_eq!(shown.id, sample().id);
        assert_eq!(shown.class, "car");
    }

    #[test]
    fn test_display_stored_roundtrip() {
        let original = sample();
        for factor in [0.1, 0.33, 1.0, 1.7, 3.0, 9.99] {
            let zoom = Zoom::new(factor).unwrap();
            let back = to_stored(&to_display(&original, zoom), zoom);
            assert!((back.x - original.x).abs() < 1e-9);
            assert!((back.y - original.y).abs() < 1e-9);
            assert!((back.width - original.width).abs() < 1e-9);
            assert!((back.height - original.height).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_scaled_is_clamped() {
        let zoom = Zoom::default();
        assert_eq!(zoom.scaled(1000.0).factor(), Zoom::MAX);
        assert_eq!(zoom.scaled(0.0001).factor(), Zoom::MIN);
        assert_eq!(zoom.scaled(-1.0), zoom);
    }

    fn zoom2() -> Zoom {
        Zoom::new(2.0).unwrap()
    }

    #[test]
    fn test_drawn_region_reverse_direction() {
        let drawn = drawn_region((30.0, 40.0), (10.0, 20.0), zoom2(), "  ").unwrap();
        assert_eq!((drawn.x, drawn.y, drawn.width, drawn.height), (20.0, 40.0, 40.0, 40.0));
        assert_eq!(drawn.class, DEFAULT_CLASS);
    }

    #[test]
    fn test_drawn_region_minimum_size_is_in_image_pixels() {
        // 3 displayed pixels are 1.5 image pixels at 0.5 but 6 at 2.0
        let small = Zoom::new(0.5).unwrap();
        assert!(drawn_region((0.0, 0.0), (3.0, 3.0), small, "car").is_none());
        assert!(drawn_region((0.0, 0.0), (3.0, 30.0), small, "car").is_none());

        let drawn = drawn_region((0.0, 0.0), (3.0, 3.0), zoom2(), " car ").unwrap();
        assert_eq!((drawn.width, drawn.height), (6.0, 6.0));
        assert_eq!(drawn.class, "car");
    }

    #[test]
    fn test_move_commits_stored_geometry() {
        let region = Region { height: 40.0, ..sample() };
        let origin = to_display(&region, zoom2());

        let moved_box = moved(&origin, (6.0, 11.0), (16.0, 31.0), zoom2());
        assert_eq!((moved_box.x, moved_box.y), (30.0, 52.5));
        assert_eq!((moved_box.width, moved_box.height), (50.0, 40.0));
        assert_eq!(moved_box.id, region.id);

        let back = moved(&origin, (6.0, 11.0), (6.0, 11.0), zoom2());
        assert_eq!(back, region);
    }

    #[test]
    fn test_resize_grows_corner_in_stored_pixels() {
        let region = Region { height: 40.0, ..sample() };
        let origin = to_display(&region, zoom2());

        let grown = resized(&origin, (35.0, 26.25), (45.0, 16.25), zoom2());
        assert_eq!((grown.x, grown.y), (10.0, 12.5));
        assert_eq!((grown.width, grown.height), (70.0, 20.0));

        let flipped = resized(&origin, (35.0, 26.25), (0.0, 26.25), zoom2());
        assert_eq!(flipped.width, -20.0);
        assert_eq!(flipped.normalized().x, -10.0);
    }

    #[test]
    fn test_screen_to_image_uses_origin() {
        let zoom = Zoom::new(2.0).unwrap();
        let (x, y) = screen_to_image(egui::pos2(110.0, 60.0), zoom, egui::pos2(100.0, 50.0));
        assert_eq!((x, y), (20.0, 20.0));
    }
}
