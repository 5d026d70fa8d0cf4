// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Local document serialization and deserialization.
//!
//! The current image reference and its boxes can be exported to, and
//! imported from, YAML or JSON files. The document uses the same shape
//! as the backend's image-data response.

use crate::io::backend::ImageData;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// File formats supported for local export/import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Write a document, choosing the format from the extension.
pub fn export_document(data: &ImageData, path: &Path) -> Result<()> {
    let text = match DocumentFormat::from_path(path)? {
        DocumentFormat::Yaml => serde_yaml::to_string(data)?,
        DocumentFormat::Json => serde_json::to_string_pretty(data)?,
    };
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a document, choosing the format from the extension.
pub fn import_document(path: &Path) -> Result<ImageData> {
    let format = DocumentFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(&text)?,
        DocumentFormat::Json => serde_json::from_str(&text)?,
    };
    Ok(data)
}
