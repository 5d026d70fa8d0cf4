// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box editing.
//!
//! The canvas draws the session image at the current zoom with the visible
//! boxes on top, and turns pointer input into [`CanvasAction`]s. It never
//! mutates the session itself.

use crate::app::Tool;
use crate::models::region::{Region, RegionId};
use crate::models::session::EditorSession;
use crate::util::geometry::{screen_rect, screen_to_image, Zoom};

/// Side length of the resize handle, in screen pixels.
const HANDLE_SIZE: f32 = 10.0;

/// Pointer gesture in progress, in displayed (zoomed) coordinates
/// relative to the image's top-left corner.
#[derive(Debug, Clone)]
pub enum Drag {
    Move { id: RegionId, anchor: (f64, f64), origin: Region },
    Resize { id: RegionId, anchor: (f64, f64), origin: Region },
    Draw { start: (f64, f64), current: (f64, f64) },
}

/// Result of canvas interaction. Points are in displayed coordinates
/// relative to the image's top-left corner.
pub enum CanvasAction {
    None,
    Select(Option<RegionId>),
    StartMove(RegionId, (f64, f64)),
    StartResize(RegionId, (f64, f64)),
    StartDraw((f64, f64)),
    DragTo((f64, f64)),
    StopDragging,
}

/// Display the canvas area and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    session: &EditorSession,
    current_tool: Tool,
    image_texture: &Option<egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    zoom: Zoom,
    drag: Option<&Drag>,
) -> CanvasAction {
    let (Some(texture), Some((img_width, img_height))) = (image_texture, image_size) else {
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new("No image loaded. Use File → Reload from Backend.")
                    .color(egui::Color32::from_gray(180)),
            );
        });
        return CanvasAction::None;
    };

    let display_size = egui::vec2(
        (img_width as f64 / zoom.factor()) as f32,
        (img_height as f64 / zoom.factor()) as f32,
    );

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(display_size, egui::Sense::click_and_drag());
            let origin = response.rect.min;

            painter.image(
                texture.id(),
                response.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let selected = session.store().selected();
            for region in session.store().regions() {
                if session.is_visible(region) {
                    let is_selected = selected == Some(&region.id);
                    draw_region(&painter, region, zoom, origin, is_selected);
                }
            }

            if let Some(Drag::Draw { start, current }) = drag {
                let preview = egui::Rect::from_two_pos(
                    origin + egui::vec2(start.0 as f32, start.1 as f32),
                    origin + egui::vec2(current.0 as f32, current.1 as f32),
                );
                painter.rect_stroke(
                    preview,
                    0.0,
                    egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE),
                );
            }

            interact(&response, session, current_tool, zoom, origin)
        })
        .inner
}

fn interact(
    response: &egui::Response,
    session: &EditorSession,
    current_tool: Tool,
    zoom: Zoom,
    origin: egui::Pos2,
) -> CanvasAction {
    if response.drag_stopped() {
        return CanvasAction::StopDragging;
    }
    let Some(pos) = response.interact_pointer_pos() else {
        return CanvasAction::None;
    };
    let point = ((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
    let hit = || {
        let (x, y) = screen_to_image(pos, zoom, origin);
        session
            .store()
            .hit_test(x, y, |r| session.is_visible(r))
            .map(|r| r.id.clone())
    };

    if response.drag_started() {
        match current_tool {
            Tool::Draw => CanvasAction::StartDraw(point),
            Tool::Select => {
                let on_handle = session
                    .store()
                    .selected_region()
                    .filter(|r| handle_rect(screen_rect(r, zoom, origin)).contains(pos));
                if let Some(region) = on_handle {
                    CanvasAction::StartResize(region.id.clone(), point)
                } else if let Some(id) = hit() {
                    CanvasAction::StartMove(id, point)
                } else {
                    CanvasAction::Select(None)
                }
            }
        }
    } else if response.dragged() {
        CanvasAction::DragTo(point)
    } else if response.clicked() {
        CanvasAction::Select(hit())
    } else {
        CanvasAction::None
    }
}

fn handle_rect(rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_center_size(rect.right_bottom(), egui::vec2(HANDLE_SIZE, HANDLE_SIZE))
}

/// Draw one box with its class label.
fn draw_region(
    painter: &egui::Painter,
    region: &Region,
    zoom: Zoom,
    origin: egui::Pos2,
    is_selected: bool,
) {
    let rect = screen_rect(region, zoom, origin);
    let color = class_color(&region.class);
    let width = if is_selected { 3.0 } else { 1.5 };

    painter.rect_stroke(rect, 0.0, egui::Stroke::new(width, color));
    painter.text(
        rect.left_top(),
        egui::Align2::LEFT_BOTTOM,
        &region.class,
        egui::FontId::proportional(12.0),
        color,
    );

    if is_selected {
        let handle = handle_rect(rect);
        painter.rect_filled(handle, 0.0, egui::Color32::WHITE);
        painter.rect_stroke(handle, 0.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }
}

/// Stable color for a class name.
pub fn class_color(class: &str) -> egui::Color32 {
    const PALETTE: [egui::Color32; 8] = [
        egui::Color32::YELLOW,
        egui::Color32::LIGHT_GREEN,
        egui::Color32::LIGHT_RED,
        egui::Color32::LIGHT_BLUE,
        egui::Color32::GOLD,
        egui::Color32::from_rgb(255, 128, 255),
        egui::Color32::from_rgb(128, 255, 255),
        egui::Color32::from_rgb(255, 160, 64),
    ];
    let hash = class
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[hash % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_color_is_stable() {
        assert_eq!(class_color("car"), class_color("car"));
        assert_eq!(class_color(""), egui::Color32::YELLOW);
    }

    #[test]
    fn test_handle_centered_on_corner() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(20.0, 30.0));
        let handle = handle_rect(rect);
        assert_eq!(handle.center(), egui::pos2(30.0, 40.0));
        assert!(handle.contains(egui::pos2(34.0, 44.0)));
    }
}
