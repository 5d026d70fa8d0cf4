// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class visibility and box properties panel.
//!
//! Lists the candidate classes with visibility checkboxes, and shows the
//! selected box's class and geometry for editing.

use crate::models::region::RegionId;
use crate::models::session::EditorSession;
use crate::ui::canvas::class_color;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    ToggleAll,
    ToggleClass(String),
    SetClass(RegionId, String),
    Delete(RegionId),
}

/// Display the properties panel.
///
/// `class_edit` is the text buffer for the selected box's class; the app
/// resets it whenever the selection changes.
pub fn show(ui: &mut egui::Ui, session: &EditorSession, class_edit: &mut String) -> PropertiesAction {
    let mut action = PropertiesAction::None;
    let classes = session.classes();

    ui.heading("Classes");
    ui.separator();

    let mut all = classes.all_visible();
    if ui.checkbox(&mut all, "Show all").clicked() {
        action = PropertiesAction::ToggleAll;
    }

    if session.store().is_empty() {
        ui.label(egui::RichText::new("No boxes on this image").weak());
    }

    for class in classes.candidates() {
        let mut visible = classes.is_visible(class);
        let label = egui::RichText::new(class).color(class_color(class));
        if ui.checkbox(&mut visible, label).clicked() {
            action = PropertiesAction::ToggleClass(class.to_string());
        }
    }

    ui.add_space(12.0);
    ui.heading("Selected Box");
    ui.separator();

    let Some(region) = session.store().selected_region() else {
        ui.label(egui::RichText::new("Nothing selected").weak());
        return action;
    };

    egui::Grid::new("selected_box").num_columns(2).show(ui, |ui| {
        ui.label("Id");
        ui.label(egui::RichText::new(region.id.as_str()).monospace());
        ui.end_row();
        ui.label("Position");
        ui.label(format!("{:.1}, {:.1}", region.x, region.y));
        ui.end_row();
        ui.label("Size");
        ui.label(format!("{:.1} × {:.1}", region.width, region.height));
        ui.end_row();
    });

    ui.horizontal(|ui| {
        ui.label("Class:");
        let response = ui.text_edit_singleline(class_edit);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Apply").clicked() || submitted) && !class_edit.trim().is_empty() {
            action = PropertiesAction::SetClass(region.id.clone(), class_edit.trim().to_string());
        }
    });

    ui.add_space(8.0);
    if ui.button("🗑 Delete Box").clicked() {
        action = PropertiesAction::Delete(region.id.clone());
    }

    action
}
