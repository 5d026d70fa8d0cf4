// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Backend HTTP access.
//!
//! The editor reads the image reference and its boxes from one endpoint
//! and posts the edited boxes to another. [`Backend`] is the seam between
//! the session and the network so sync logic can be exercised without it.

use crate::config::Settings;
use crate::models::region::{PersistedRegion, Region};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Broad category of a sync failure, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The backend could not be reached or did not answer with success.
    Network,
    /// The user asked for something that cannot be done yet.
    UserInput,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {status}")]
    Status { status: StatusCode },

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("no image is loaded; load an image before saving")]
    NoImageLoaded,

    #[error("background request ended without a result")]
    Interrupted,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NoImageLoaded => ErrorKind::UserInput,
            SyncError::Transport(_)
            | SyncError::Status { .. }
            | SyncError::Decode(_)
            | SyncError::Interrupted => ErrorKind::Network,
        }
    }
}

/// Response of the image-data endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub image_url: String,
    #[serde(default)]
    pub bounding_boxes: Vec<Region>,
}

/// Body posted to the save endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub image_url: String,
    pub bounding_boxes: Vec<PersistedRegion>,
}

/// Decoded RGBA pixels of the session image.
pub struct ImagePixels {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait Backend {
    fn fetch_image_data(&self) -> Result<ImageData, SyncError>;
    fn fetch_image(&self, image_url: &str) -> Result<ImagePixels, SyncError>;
    fn save_boxes(&self, payload: &SavePayload) -> Result<(), SyncError>;
}

/// Blocking HTTP implementation. Calls are made from a worker thread.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    settings: Settings,
}

impl HttpBackend {
    pub fn new(settings: Settings) -> Result<Self, SyncError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }
}

impl Backend for HttpBackend {
    fn fetch_image_data(&self) -> Result<ImageData, SyncError> {
        let url = self.settings.endpoint_url(&self.settings.image_data_endpoint);
        log::debug!("GET {}", url);
        let res = check_status(self.client.get(&url).send()?)?;
        Ok(res.json::<ImageData>()?)
    }

    /// Download and decode the image a session refers to. Relative URLs
    /// are resolved against the backend.
    fn fetch_image(&self, image_url: &str) -> Result<ImagePixels, SyncError> {
        let url = self.settings.endpoint_url(image_url);
        log::debug!("GET {}", url);
        let res = check_status(self.client.get(&url).send()?)?;
        let bytes = res.bytes()?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();
        Ok(ImagePixels {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    fn save_boxes(&self, payload: &SavePayload) -> Result<(), SyncError> {
        let url = self.settings.endpoint_url(&self.settings.save_endpoint);
        log::debug!("POST {} ({} boxes)", url, payload.bounding_boxes.len());
        check_status(self.client.post(&url).json(payload).send()?)?;
        Ok(())
    }
}

fn check_status(res: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, SyncError> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        Err(SyncError::Status { status })
    }
}
