// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! bbox-editor - bounding box annotation editor
//!
//! A desktop application for drawing, editing and saving labeled bounding
//! boxes on images served by an annotation backend.

mod app;
mod config;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::EditorApp;
use config::Settings;
use io::backend::HttpBackend;

fn main() -> Result<()> {
    // Initialize logging, defaulting to info when RUST_LOG is unset
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    let backend = HttpBackend::new(settings.clone()).context("Failed to build HTTP client")?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Bounding Box Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "bbox-editor",
        options,
        Box::new(|_cc| Ok(Box::new(EditorApp::new(settings, backend)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
