// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional TOML file; every field has a default so
//! partial files are accepted. The backend URL can also be overridden from
//! the environment.

use crate::models::history::RedoOrder;
use crate::util::geometry::Zoom;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "BBOX_EDITOR_CONFIG";
/// Environment variable overriding [`Settings::backend_url`].
pub const BACKEND_URL_ENV: &str = "BBOX_EDITOR_BACKEND_URL";
/// Settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bbox-editor.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub image_data_endpoint: String,
    pub save_endpoint: String,
    pub request_timeout_secs: u64,
    pub initial_zoom: f64,
    /// Cap on undo steps; unlimited when absent
    pub max_history: Option<usize>,
    pub redo_order: RedoOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            backend_url: "http://localhost:5000".to_string(),
            image_data_endpoint: "/api/image-data".to_string(),
            save_endpoint: "/api/save-bboxes".to_string(),
            request_timeout_secs: 10,
            initial_zoom: 1.0,
            max_history: None,
            redo_order: RedoOrder::Fifo,
        }
    }
}

impl Settings {
    /// Load settings from the configured file (if any) and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            settings.backend_url = url;
        }

        settings.validate()?;
        log::info!("Using backend {}", settings.backend_url);
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn initial_zoom(&self) -> Zoom {
        Zoom::new(self.initial_zoom).unwrap_or_default()
    }

    /// Join an endpoint path onto the backend base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn validate(&self) -> Result<()> {
        if Zoom::new(self.initial_zoom).is_none() {
            bail!("initial_zoom must be a positive number, got {}", self.initial_zoom);
        }
        if self.backend_url.trim().is_empty() {
            bail!("backend_url must not be empty");
        }
        Ok(())
    }
}
