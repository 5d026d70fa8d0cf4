// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Blocking load and save against a [`Backend`].
//!
//! These run on the worker thread; see [`super::worker`].

use super::backend::{Backend, ImageData, ImagePixels, SavePayload, SyncError};

/// Fetch the image reference with its boxes, then the image itself.
/// A failed image download fails the whole load.
pub fn load(backend: &dyn Backend) -> Result<(ImageData, ImagePixels), SyncError> {
    let data = backend.fetch_image_data()?;
    let image = backend.fetch_image(&data.image_url)?;
    log::debug!("Fetched {} ({}x{})", data.image_url, image.width, image.height);
    Ok((data, image))
}

/// Post `payload` and return how many boxes were saved.
pub fn save(backend: &dyn Backend, payload: &SavePayload) -> Result<usize, SyncError> {
    backend.save_boxes(payload)?;
    Ok(payload.bounding_boxes.len())
}
