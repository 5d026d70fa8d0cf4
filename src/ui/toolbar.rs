// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for choosing between selecting and
//! drawing boxes, the class given to new boxes, and the zoom controls.

use crate::app::Tool;
use crate::util::geometry::Zoom;

/// Display the toolbar with tool selection buttons.
pub fn show(
    ui: &mut egui::Ui,
    current_tool: &mut Tool,
    new_box_class: &mut String,
    known_classes: &[String],
    zoom: &mut Zoom,
) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        if ui.selectable_label(*current_tool == Tool::Select, "⬆ Select").clicked() {
            *current_tool = Tool::Select;
        }

        if ui.selectable_label(*current_tool == Tool::Draw, "▭ Draw Box").clicked() {
            *current_tool = Tool::Draw;
        }

        ui.separator();

        ui.label("New box class:");
        ui.add(egui::TextEdit::singleline(new_box_class).desired_width(100.0));
        egui::ComboBox::from_id_source("known_classes")
            .selected_text("▾")
            .width(24.0)
            .show_ui(ui, |ui| {
                for class in known_classes {
                    ui.selectable_value(new_box_class, class.clone(), class);
                }
            });

        ui.separator();

        if ui.button("−").on_hover_text("Zoom out").clicked() {
            *zoom = zoom.scaled(1.25);
        }
        ui.label(format!("{:.0}%", 100.0 / zoom.factor()));
        if ui.button("+").on_hover_text("Zoom in").clicked() {
            *zoom = zoom.scaled(0.8);
        }

        ui.separator();

        let tool_text = match current_tool {
            Tool::Select => "Click to select, drag to move, drag the corner handle to resize",
            Tool::Draw => "Drag on the image to draw a new box",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });
}
