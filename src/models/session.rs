// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor session state.
//!
//! One session owns the region store, its edit history, the class
//! visibility selection and the reference to the backend image. It is
//! constructed by the application and handed to the UI; nothing here is
//! global. Every undoable operation captures history before mutating and
//! refreshes the class candidates afterwards.

use super::classes::ClassSelection;
use super::history::{History, RedoOrder};
use super::region::{Region, RegionId, RegionPatch};
use super::store::{RegionStore, StoreError};
use crate::io::backend::{ImageData, SavePayload, SyncError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("no image is loaded; load an image before importing boxes")]
    NoImageLoaded,

    #[error("document belongs to '{document}', but the loaded image is '{loaded}'")]
    ImageMismatch { loaded: String, document: String },
}

#[derive(Debug, Default)]
pub struct EditorSession {
    store: RegionStore,
    history: History,
    classes: ClassSelection,
    image_url: Option<String>,
    /// Set between `begin_gesture` and `end_gesture`
    gesture_active: bool,
}

impl EditorSession {
    pub fn new(max_history: Option<usize>, redo_order: RedoOrder) -> Self {
        Self {
            history: History::with_limits(max_history, redo_order),
            ..Default::default()
        }
    }

    pub fn store(&self) -> &RegionStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn classes(&self) -> &ClassSelection {
        &self.classes
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Start editing a freshly fetched image. History does not carry over.
    pub fn load(&mut self, data: ImageData) {
        log::info!(
            "Loaded {} boxes for {}",
            data.bounding_boxes.len(),
            data.image_url
        );
        self.store.replace_all(data.bounding_boxes);
        self.store.select(None);
        self.history.clear();
        self.image_url = Some(data.image_url);
        self.gesture_active = false;
        self.refresh_classes();
    }

    /// Replace every box with a document's boxes as one undoable edit.
    ///
    /// The document must belong to the loaded image. An empty image
    /// reference is accepted as "this image".
    pub fn import(&mut self, data: ImageData) -> Result<(), ImportError> {
        let loaded = self.image_url.as_deref().ok_or(ImportError::NoImageLoaded)?;
        if !data.image_url.is_empty() && data.image_url != loaded {
            return Err(ImportError::ImageMismatch {
                loaded: loaded.to_string(),
                document: data.image_url,
            });
        }
        self.history.capture(&self.store);
        self.store.replace_all(data.bounding_boxes);
        self.refresh_classes();
        Ok(())
    }

    /// Append `region` with its size normalized.
    pub fn add_region(&mut self, region: Region) -> RegionId {
        self.history.capture(&self.store);
        let class = region.class.clone();
        let id = self.store.add(region.normalized());
        log::info!("Added box {} ({}), total: {}", id, class, self.store.len());
        self.refresh_classes();
        id
    }

    pub fn update_region(&mut self, id: &RegionId, patch: &RegionPatch) -> Result<(), StoreError> {
        self.ensure_exists(id)?;
        self.history.capture(&self.store);
        self.store.update(id, patch)?;
        self.refresh_classes();
        Ok(())
    }

    pub fn set_region_class(&mut self, id: &RegionId, class: &str) -> Result<(), StoreError> {
        if self.store.get(id).is_some_and(|r| r.class == class) {
            return Ok(());
        }
        self.update_region(id, &RegionPatch::class(class))
    }

    pub fn remove_region(&mut self, id: &RegionId) -> Result<Region, StoreError> {
        self.ensure_exists(id)?;
        self.history.capture(&self.store);
        let removed = self.store.remove(id)?;
        log::info!("Deleted box {}, total: {}", id, self.store.len());
        self.refresh_classes();
        Ok(removed)
    }

    /// Remove the selected box, if any.
    pub fn remove_selected(&mut self) -> Option<Region> {
        let id = self.store.selected()?.clone();
        self.remove_region(&id).ok()
    }

    pub fn select(&mut self, id: Option<RegionId>) {
        self.store.select(id);
    }

    /// Capture history once for an interactive drag or resize.
    pub fn begin_gesture(&mut self) {
        if !self.gesture_active {
            self.history.capture(&self.store);
            self.gesture_active = true;
        }
    }

    /// Apply an intermediate gesture step without recording history.
    pub fn gesture_update(&mut self, id: &RegionId, patch: &RegionPatch) -> Result<(), StoreError> {
        self.store.update(id, patch)
    }

    /// Finish a gesture, folding any negative size produced by the drag.
    pub fn end_gesture(&mut self, id: &RegionId) -> Result<(), StoreError> {
        self.gesture_active = false;
        let region = self
            .store
            .get(id)
            .ok_or_else(|| StoreError::UnknownRegion(id.clone()))?
            .normalized();
        self.store.put(region)
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.store);
        if done {
            self.gesture_active = false;
            self.refresh_classes();
            log::info!("Undo");
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.store);
        if done {
            self.gesture_active = false;
            self.refresh_classes();
            log::info!("Redo");
        }
        done
    }

    pub fn toggle_all_classes(&mut self) {
        self.classes.toggle_all();
    }

    pub fn toggle_class(&mut self, class: &str) {
        self.classes.toggle(class);
    }

    /// Whether a box should be drawn: its class is visible or it is selected.
    pub fn is_visible(&self, region: &Region) -> bool {
        self.classes.is_visible(&region.class) || self.store.selected() == Some(&region.id)
    }

    /// Normalized, whole-pixel payload for the save endpoint.
    pub fn save_payload(&self) -> Result<SavePayload, SyncError> {
        let image_url = self.image_url.clone().ok_or(SyncError::NoImageLoaded)?;
        Ok(SavePayload {
            image_url,
            bounding_boxes: self.store.regions().iter().map(Region::rounded).collect(),
        })
    }

    fn ensure_exists(&self, id: &RegionId) -> Result<(), StoreError> {
        match self.store.get(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::UnknownRegion(id.clone())),
        }
    }

    fn refresh_classes(&mut self) {
        self.classes.recompute(self.store.regions());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> EditorSession {
        let mut session = EditorSession::default();
        session.load(ImageData {
            image_url: "/images/1.jpg".to_string(),
            bounding_boxes: vec![Region {
                id: RegionId::from("a"),
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 50.0,
                class: "car".to_string(),
            }],
        });
        session
    }

    fn a() -> RegionId {
        RegionId::from("a")
    }

    #[test]
    fn test_update_undo_redo_scenario() {
        let mut session = loaded();
        session
            .update_region(&a(), &RegionPatch { x: Some(20.0), ..Default::default() })
            .unwrap();

        assert!(session.undo());
        assert_eq!(session.store().get(&a()).unwrap().x, 10.0);
        assert!(session.redo());
        assert_eq!(session.store().get(&a()).unwrap().x, 20.0);
    }

    #[test]
    fn test_load_clears_history_and_selection() {
        let mut session = loaded();
        session.select(Some(a()));
        session.update_region(&a(), &RegionPatch::class("truck")).unwrap();

        session.load(ImageData {
            image_url: "/images/2.jpg".to_string(),
            bounding_boxes: vec![],
        });
        assert!(!session.history().can_undo());
        assert_eq!(session.store().selected(), None);
        assert_eq!(session.image_url(), Some("/images/2.jpg"));
    }

    #[test]
    fn test_add_from_empty_seeds_classes() {
        let mut session = EditorSession::default();
        session.add_region(Region::new(0.0, 0.0, 5.0, 5.0, "car"));
        let visible: Vec<&str> = session.classes().visible().iter().map(String::as_str).collect();
        assert_eq!(visible, vec!["car", "ignore"]);
    }

    #[test]
    fn test_add_is_undoable() {
        let mut session = loaded();
        let id = session.add_region(Region::new(1.0, 1.0, 2.0, 2.0, "person"));
        assert_eq!(session.store().len(), 2);
        session.undo();
        assert_eq!(session.store().len(), 1);
        assert!(session.store().get(&id).is_none());
    }

    #[test]
    fn test_failed_update_does_not_touch_history() {
        let mut session = loaded();
        let err = session.update_region(&RegionId::from("nope"), &RegionPatch::class("x"));
        assert!(err.is_err());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_gesture_is_one_undo_step() {
        let mut session = loaded();
        session.begin_gesture();
        for step in 1..=5 {
            session
                .gesture_update(
                    &a(),
                    &RegionPatch { width: Some(50.0 - 20.0 * step as f64), ..Default::default() },
                )
                .unwrap();
            session.begin_gesture();
        }
        session.end_gesture(&a()).unwrap();

        let r = session.store().get(&a()).unwrap();
        assert_eq!((r.x, r.width), (-40.0, 50.0));
        assert_eq!(session.history().undo_len(), 1);

        session.undo();
        let r = session.store().get(&a()).unwrap();
        assert_eq!((r.x, r.width), (10.0, 50.0));
    }

    #[test]
    fn test_save_payload_requires_image() {
        let session = EditorSession::default();
        assert!(matches!(session.save_payload(), Err(SyncError::NoImageLoaded)));
    }

    #[test]
    fn test_save_payload_rounds_geometry() {
        let mut session = loaded();
        session
            .update_region(&a(), &RegionPatch { x: Some(20.6), width: Some(-10.2), ..Default::default() })
            .unwrap();
        let payload = session.save_payload().unwrap();
        assert_eq!(payload.image_url, "/images/1.jpg");
        let b = &payload.bounding_boxes[0];
        assert_eq!((b.x, b.y, b.width, b.height), (10, 10, 10, 50));
        // local state keeps full precision
        assert_eq!(session.store().get(&a()).unwrap().x, 20.6);
    }

    #[test]
    fn test_selected_box_stays_visible_when_class_hidden() {
        let mut session = loaded();
        session.toggle_class("car");
        let region = session.store().get(&a()).unwrap().clone();
        assert!(!session.is_visible(&region));

        session.select(Some(a()));
        assert!(session.is_visible(&region));
    }

    fn document(image_url: &str, class: &str) -> ImageData {
        ImageData {
            image_url: image_url.to_string(),
            bounding_boxes: vec![Region {
                id: RegionId::from("z"),
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
                class: class.to_string(),
            }],
        }
    }

    #[test]
    fn test_import_then_undo_keeps_image_reference() {
        let mut session = loaded();
        session.import(document("/images/1.jpg", "dog")).unwrap();
        assert_eq!(session.store().regions()[0].id.as_str(), "z");

        assert!(session.undo());
        let payload = session.save_payload().unwrap();
        assert_eq!(payload.image_url, "/images/1.jpg");
        assert_eq!(payload.bounding_boxes.len(), 1);
        assert_eq!(payload.bounding_boxes[0].id, a());
    }

    #[test]
    fn test_import_for_other_image_is_rejected() {
        let mut session = loaded();
        let err = session.import(document("/images/2.jpg", "dog")).unwrap_err();
        assert_eq!(
            err,
            ImportError::ImageMismatch {
                loaded: "/images/1.jpg".to_string(),
                document: "/images/2.jpg".to_string(),
            }
        );
        assert_eq!(session.image_url(), Some("/images/1.jpg"));
        assert_eq!(session.store().regions()[0].id, a());
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_import_without_reference_uses_loaded_image() {
        let mut session = loaded();
        session.import(document("", "dog")).unwrap();
        assert_eq!(session.image_url(), Some("/images/1.jpg"));
        assert_eq!(session.classes().candidates().collect::<Vec<_>>(), vec!["dog", "ignore"]);
    }

    #[test]
    fn test_import_requires_loaded_image() {
        let mut session = EditorSession::default();
        assert_eq!(
            session.import(document("/images/1.jpg", "dog")),
            Err(ImportError::NoImageLoaded)
        );
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_remove_selected() {
        let mut session = loaded();
        assert!(session.remove_selected().is_none());
        session.select(Some(a()));
        assert_eq!(session.remove_selected().map(|r| r.id), Some(a()));
        assert!(session.store().is_empty());
        session.undo();
        assert_eq!(session.store().len(), 1);
    }
}
