// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the editor session and the background
//! sync worker, and translates UI actions into session operations.

use crate::config::Settings;
use crate::io::backend::{ErrorKind, HttpBackend, ImageData, SyncError};
use crate::io::serialization;
use crate::io::worker::{SyncOp, SyncOutcome, SyncWorker};
use crate::models::region::{RegionId, RegionPatch, DEFAULT_CLASS};
use crate::models::session::EditorSession;
use crate::ui::canvas::{self, CanvasAction, Drag};
use crate::ui::{properties, toolbar};
use crate::util::geometry::{self, to_display, Zoom};

/// Current tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw,
}

/// A message shown to the user in a modal window.
struct Alert {
    title: String,
    message: String,
}

/// Main application state.
pub struct EditorApp {
    settings: Settings,

    /// Boxes, history and class selection for the current image
    session: EditorSession,

    /// Background load/save against the backend
    worker: SyncWorker<HttpBackend>,

    /// Currently selected tool
    current_tool: Tool,

    /// Class assigned to newly drawn boxes
    new_box_class: String,

    /// Edit buffer for the selected box's class, and which box it belongs to
    class_edit: (Option<RegionId>, String),

    zoom: Zoom,

    /// Pointer gesture in progress
    drag: Option<Drag>,

    /// Loaded image texture for display
    image_texture: Option<egui::TextureHandle>,

    /// Image dimensions (width, height)
    image_size: Option<(u32, u32)>,

    alert: Option<Alert>,

    /// Status bar text
    status: String,
}

impl EditorApp {
    /// Create the application and start fetching the first image.
    pub fn new(settings: Settings, backend: HttpBackend) -> Self {
        let mut app = Self {
            session: EditorSession::new(settings.max_history, settings.redo_order),
            worker: SyncWorker::new(backend),
            current_tool: Tool::Select,
            new_box_class: DEFAULT_CLASS.to_string(),
            class_edit: (None, String::new()),
            zoom: settings.initial_zoom(),
            drag: None,
            image_texture: None,
            image_size: None,
            alert: None,
            status: String::new(),
            settings,
        };
        app.reload();
        app
    }

    fn reload(&mut self) {
        if self.worker.start_load() {
            self.status = format!("Loading from {}...", self.settings.backend_url);
        }
    }

    fn save(&mut self) {
        match self.worker.start_save(&self.session) {
            Ok(true) => self.status = "Saving...".to_string(),
            Ok(false) => log::warn!("Save requested while another request is running"),
            Err(e) => self.report_error(SyncOp::Save, &e),
        }
    }

    fn report_error(&mut self, op: SyncOp, error: &SyncError) {
        let title = match (op, error.kind()) {
            (SyncOp::Load, _) => "Load failed",
            (SyncOp::Save, ErrorKind::UserInput) => "Cannot save",
            (SyncOp::Save, ErrorKind::Network) => "Save failed",
        };
        log::error!("{}: {}", title, error);
        self.status = title.to_string();
        self.alert = Some(Alert {
            title: title.to_string(),
            message: error.to_string(),
        });
    }

    fn show_alert(&mut self, title: &str, message: String) {
        self.alert = Some(Alert {
            title: title.to_string(),
            message,
        });
    }

    /// Apply a finished background request.
    fn handle_outcome(&mut self, ctx: &egui::Context, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Loaded { data, image } => {
                let size = [image.width as usize, image.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                self.image_texture =
                    Some(ctx.load_texture("session_image", color_image, egui::TextureOptions::LINEAR));
                self.image_size = Some((image.width, image.height));
                self.cancel_drag();
                self.status = format!("Loaded {} ({} boxes)", data.image_url, data.bounding_boxes.len());
                self.session.load(data);
            }
            SyncOutcome::Saved { boxes } => {
                log::info!("Saved {} boxes", boxes);
                self.status = format!("Saved {} boxes", boxes);
                self.show_alert("Saved", format!("Saved {} boxes to the backend.", boxes));
            }
            SyncOutcome::Failed { op, error } => self.report_error(op, &error),
        }
    }

    fn export_document(&mut self, path: std::path::PathBuf) {
        let data = ImageData {
            image_url: self.session.image_url().unwrap_or_default().to_string(),
            bounding_boxes: self.session.store().regions().to_vec(),
        };
        match serialization::export_document(&data, &path) {
            Ok(()) => log::info!("Exported boxes to {}", path.display()),
            Err(e) => {
                log::error!("Failed to export boxes: {:#}", e);
                self.show_alert("Export failed", format!("{:#}", e));
            }
        }
    }

    fn import_document(&mut self, path: std::path::PathBuf) {
        match serialization::import_document(&path) {
            Ok(data) => {
                let count = data.bounding_boxes.len();
                self.cancel_drag();
                match self.session.import(data) {
                    Ok(()) => log::info!("Imported {} boxes from {}", count, path.display()),
                    Err(e) => {
                        log::warn!("Rejected import of {}: {}", path.display(), e);
                        self.show_alert("Import failed", e.to_string());
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to import boxes: {:#}", e);
                self.show_alert("Import failed", format!("{:#}", e));
            }
        }
    }

    fn undo(&mut self) {
        self.cancel_drag();
        self.session.undo();
    }

    fn redo(&mut self) {
        self.cancel_drag();
        self.session.redo();
    }

    fn delete_selected(&mut self) {
        self.cancel_drag();
        self.session.remove_selected();
    }

    fn handle_canvas_action(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Select(id) => {
                self.session.select(id);
            }
            CanvasAction::StartMove(id, anchor) => self.start_gesture(id, anchor, false),
            CanvasAction::StartResize(id, anchor) => self.start_gesture(id, anchor, true),
            CanvasAction::StartDraw(start) => {
                self.drag = Some(Drag::Draw { start, current: start });
            }
            CanvasAction::DragTo(point) => self.drag_to(point),
            CanvasAction::StopDragging => self.stop_dragging(),
            CanvasAction::None => {}
        }
    }

    fn start_gesture(&mut self, id: RegionId, anchor: (f64, f64), resize: bool) {
        let zoom = self.zoom;
        let Some(origin) = self.session.store().get(&id).map(|r| to_display(&r.normalized(), zoom)) else {
            return;
        };
        self.session.select(Some(id.clone()));
        self.session.begin_gesture();
        self.drag = Some(if resize {
            Drag::Resize { id, anchor, origin }
        } else {
            Drag::Move { id, anchor, origin }
        });
    }

    /// Abandon the current drag. A move or resize keeps what was applied so far.
    fn cancel_drag(&mut self) {
        if let Some(Drag::Move { id, .. } | Drag::Resize { id, .. }) = self.drag.take() {
            // the box may already be gone; the gesture is closed either way
            let _ = self.session.end_gesture(&id);
        }
    }

    fn drag_to(&mut self, point: (f64, f64)) {
        let zoom = self.zoom;
        let Some(drag) = &mut self.drag else {
            return;
        };
        let result = match drag {
            Drag::Move { id, anchor, origin } => {
                let region = geometry::moved(origin, *anchor, point, zoom);
                self.session.gesture_update(id, &RegionPatch::geometry(&region))
            }
            Drag::Resize { id, anchor, origin } => {
                let region = geometry::resized(origin, *anchor, point, zoom);
                self.session.gesture_update(id, &RegionPatch::geometry(&region))
            }
            Drag::Draw { current, .. } => {
                *current = point;
                Ok(())
            }
        };
        if let Err(e) = result {
            log::warn!("Dropping drag: {}", e);
            self.cancel_drag();
        }
    }

    fn stop_dragging(&mut self) {
        match self.drag.take() {
            Some(Drag::Move { id, .. }) | Some(Drag::Resize { id, .. }) => {
                if let Err(e) = self.session.end_gesture(&id) {
                    log::warn!("Gesture ended on a missing box: {}", e);
                }
            }
            Some(Drag::Draw { start, current }) => {
                if let Some(drawn) = geometry::drawn_region(start, current, self.zoom, &self.new_box_class) {
                    let id = self.session.add_region(drawn);
                    self.session.select(Some(id));
                }
            }
            None => {}
        }
    }

    fn handle_properties_action(&mut self, action: properties::PropertiesAction) {
        match action {
            properties::PropertiesAction::ToggleAll => self.session.toggle_all_classes(),
            properties::PropertiesAction::ToggleClass(class) => self.session.toggle_class(&class),
            properties::PropertiesAction::SetClass(id, class) => {
                if let Err(e) = self.session.set_region_class(&id, &class) {
                    log::warn!("Cannot change class: {}", e);
                }
            }
            properties::PropertiesAction::Delete(id) => {
                self.cancel_drag();
                if let Err(e) = self.session.remove_region(&id) {
                    log::warn!("Cannot delete box: {}", e);
                }
            }
            properties::PropertiesAction::None => {}
        }
    }

    /// Keep the class edit buffer in step with the selection.
    fn sync_class_edit(&mut self) {
        let selected = self.session.store().selected_region();
        let selected_id = selected.map(|r| r.id.clone());
        if self.class_edit.0 != selected_id {
            self.class_edit = (selected_id, selected.map(|r| r.class.clone()).unwrap_or_default());
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.cancel_drag();
            self.session.select(None);
        }

        // Only process if no text field is focused (to avoid deleting while editing names)
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.delete_selected();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }

        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                let busy = self.worker.pending().is_some();
                if ui.add_enabled(!busy, egui::Button::new("Reload from Backend")).clicked() {
                    self.reload();
                    ui.close_menu();
                }
                if ui.add_enabled(!busy, egui::Button::new("Save to Backend (Ctrl+S)")).clicked() {
                    self.save();
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Import Boxes...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Boxes", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.import_document(path);
                    }
                    ui.close_menu();
                }
                ui.menu_button("Export Boxes", |ui| {
                    if ui.button("Export as YAML...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .set_file_name("boxes.yaml")
                            .save_file()
                        {
                            self.export_document(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export as JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name("boxes.json")
                            .save_file()
                        {
                            self.export_document(path);
                        }
                        ui.close_menu();
                    }
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                let history = self.session.history();
                let (can_undo, can_redo) = (history.can_undo(), history.can_redo());
                if ui.add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                    self.undo();
                    ui.close_menu();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Shift+Z)")).clicked() {
                    self.redo();
                    ui.close_menu();
                }

                ui.separator();

                let has_selection = self.session.store().selected().is_some();
                if ui.add_enabled(has_selection, egui::Button::new("Delete Selected")).clicked() {
                    self.delete_selected();
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom In").clicked() {
                    self.zoom = self.zoom.scaled(0.8);
                    ui.close_menu();
                }
                if ui.button("Zoom Out").clicked() {
                    self.zoom = self.zoom.scaled(1.25);
                    ui.close_menu();
                }
                if ui.button("Reset Zoom").clicked() {
                    self.zoom = self.settings.initial_zoom();
                    ui.close_menu();
                }
            });
        });
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background requests
        if let Some(outcome) = self.worker.poll() {
            self.handle_outcome(ctx, outcome);
        }

        // Request repaint while a request is running so the result is picked up
        if self.worker.pending().is_some() {
            ctx.request_repaint();
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S))
            && self.worker.pending().is_none()
        {
            self.save();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ctx, ui));

        let known_classes: Vec<String> = self
            .session
            .classes()
            .candidates()
            .map(str::to_string)
            .collect();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(
                ui,
                &mut self.current_tool,
                &mut self.new_box_class,
                &known_classes,
                &mut self.zoom,
            );
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.worker.pending().is_some() {
                    ui.spinner();
                }
                ui.label(&self.status);
                ui.separator();
                ui.label(format!("{} boxes", self.session.store().len()));
                let history = self.session.history();
                ui.label(
                    egui::RichText::new(format!(
                        "{} undo / {} redo",
                        history.undo_len(),
                        history.redo_len()
                    ))
                    .weak(),
                );
                if let Some(url) = self.session.image_url() {
                    ui.separator();
                    ui.label(egui::RichText::new(url).weak());
                }
            });
        });

        self.sync_class_edit();
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| properties::show(ui, &self.session, &mut self.class_edit.1))
            .inner;
        self.handle_properties_action(properties_action);

        self.handle_shortcuts(ctx);

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &self.session,
                    self.current_tool,
                    &self.image_texture,
                    self.image_size,
                    self.zoom,
                    self.drag.as_ref(),
                )
            })
            .inner;
        self.handle_canvas_action(canvas_action);

        if let Some(alert) = &self.alert {
            let mut open = true;
            let mut dismissed = false;
            egui::Window::new(alert.title.as_str())
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label(&alert.message);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            if !open || dismissed {
                self.alert = None;
            }
        }
    }
}
