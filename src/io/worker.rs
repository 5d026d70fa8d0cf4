// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background load/save against the backend.
//!
//! Requests run on a spawned thread and report back over a channel that
//! the UI polls once per frame, so the canvas stays interactive while a
//! request is in flight. Only one request runs at a time.

use super::backend::{Backend, ImageData, ImagePixels, SyncError};
use super::sync;
use crate::models::session::EditorSession;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    Load,
    Save,
}

/// Result of a finished background request.
pub enum SyncOutcome {
    Loaded { data: ImageData, image: ImagePixels },
    Saved { boxes: usize },
    Failed { op: SyncOp, error: SyncError },
}

pub struct SyncWorker<B> {
    backend: Arc<B>,
    receiver: Option<Receiver<SyncOutcome>>,
    pending: Option<SyncOp>,
}

impl<B: Backend + Send + Sync + 'static> SyncWorker<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            receiver: None,
            pending: None,
        }
    }

    /// Operation currently in flight, if any.
    pub fn pending(&self) -> Option<SyncOp> {
        self.pending
    }

    /// Fetch the image reference, its boxes and the image itself.
    /// Returns false if another request is still running.
    pub fn start_load(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let backend = Arc::clone(&self.backend);
        self.spawn(SyncOp::Load, move || match sync::load(&*backend) {
            Ok((data, image)) => SyncOutcome::Loaded { data, image },
            Err(error) => SyncOutcome::Failed { op: SyncOp::Load, error },
        });
        true
    }

    /// Post the session's boxes. Fails without touching the network when
    /// no image is loaded; returns `Ok(false)` if a request is still running.
    pub fn start_save(&mut self, session: &EditorSession) -> Result<bool, SyncError> {
        let payload = session.save_payload()?;
        if self.pending.is_some() {
            return Ok(false);
        }
        let backend = Arc::clone(&self.backend);
        self.spawn(SyncOp::Save, move || match sync::save(&*backend, &payload) {
            Ok(boxes) => SyncOutcome::Saved { boxes },
            Err(error) => SyncOutcome::Failed { op: SyncOp::Save, error },
        });
        Ok(true)
    }

    /// Non-blocking check for a finished request.
    pub fn poll(&mut self) -> Option<SyncOutcome> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(outcome) => {
                self.finish();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.interrupted(),
        }
    }

    /// Block until the running request finishes.
    #[cfg(test)]
    pub fn wait(&mut self) -> Option<SyncOutcome> {
        match self.receiver.as_ref()?.recv() {
            Ok(outcome) => {
                self.finish();
                Some(outcome)
            }
            Err(_) => self.interrupted(),
        }
    }

    /// The worker thread went away without sending a result.
    fn interrupted(&mut self) -> Option<SyncOutcome> {
        let op = self.pending;
        self.finish();
        log::error!("Sync worker exited without reporting ({:?})", op);
        op.map(|op| SyncOutcome::Failed {
            op,
            error: SyncError::Interrupted,
        })
    }

    fn spawn(&mut self, op: SyncOp, job: impl FnOnce() -> SyncOutcome + Send + 'static) {
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        self.pending = Some(op);
        std::thread::spawn(move || {
            let _ = sender.send(job());
        });
    }

    fn finish(&mut self) {
        self.receiver = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::backend::{ErrorKind, SavePayload};
    use crate::models::region::{Region, RegionId};
    use reqwest::StatusCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        fail_with: Option<StatusCode>,
        crash_on_save: bool,
        saved: Arc<Mutex<Vec<SavePayload>>>,
    }

    impl Backend for FakeBackend {
        fn fetch_image_data(&self) -> Result<ImageData, SyncError> {
            if let Some(status) = self.fail_with {
                return Err(SyncError::Status { status });
            }
            Ok(ImageData {
                image_url: "/images/7.png".to_string(),
                bounding_boxes: vec![Region {
                    id: RegionId::from("a"),
                    x: 1.0,
                    y: 2.0,
                    width: 3.0,
                    height: 4.0,
                    class: "car".to_string(),
                }],
            })
        }

        fn fetch_image(&self, _image_url: &str) -> Result<ImagePixels, SyncError> {
            Ok(ImagePixels {
                width: 1,
                height: 1,
                pixels: vec![0, 0, 0, 255],
            })
        }

        fn save_boxes(&self, payload: &SavePayload) -> Result<(), SyncError> {
            if self.crash_on_save {
                panic!("backend crashed");
            }
            self.saved.lock().unwrap().push(payload.clone());
            match self.fail_with {
                Some(status) => Err(SyncError::Status { status }),
                None => Ok(()),
            }
        }
    }

    fn loaded_session(worker: &mut SyncWorker<FakeBackend>) -> EditorSession {
        assert!(worker.start_load());
        let mut session = EditorSession::default();
        match worker.wait() {
            Some(SyncOutcome::Loaded { data, .. }) => session.load(data),
            _ => panic!("expected a successful load"),
        }
        session
    }

    #[test]
    fn test_save_without_image_never_calls_backend() {
        let backend = FakeBackend::default();
        let saved = Arc::clone(&backend.saved);
        let mut worker = SyncWorker::new(backend);

        let session = EditorSession::default();
        let err = worker.start_save(&session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert!(worker.pending().is_none());
        assert!(saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_load_then_save_posts_rounded_boxes() {
        let backend = FakeBackend::default();
        let saved = Arc::clone(&backend.saved);
        let mut worker = SyncWorker::new(backend);
        let mut session = loaded_session(&mut worker);
        assert_eq!(session.image_url(), Some("/images/7.png"));

        session.add_region(Region::new(10.4, 10.6, 20.5, -5.0, "person"));
        assert!(worker.start_save(&session).unwrap());
        assert!(matches!(worker.wait(), Some(SyncOutcome::Saved { boxes: 2 })));

        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].image_url, "/images/7.png");
        let added = &saved[0].bounding_boxes[1];
        assert_eq!((added.x, added.y, added.width, added.height), (10, 6, 21, 5));
    }

    #[test]
    fn test_second_save_is_refused_while_pending() {
        let mut worker = SyncWorker::new(FakeBackend::default());
        let session = loaded_session(&mut worker);

        assert!(worker.start_save(&session).unwrap());
        assert!(!worker.start_save(&session).unwrap());
        assert!(!worker.start_load());
        assert_eq!(worker.pending(), Some(SyncOp::Save));

        worker.wait();
        assert!(worker.pending().is_none());
    }

    #[test]
    fn test_failed_save_leaves_session_untouched() {
        let mut worker = SyncWorker::new(FakeBackend::default());
        let session = loaded_session(&mut worker);
        let before = session.store().snapshot();

        let mut failing = SyncWorker::new(FakeBackend {
            fail_with: Some(StatusCode::INTERNAL_SERVER_ERROR),
            ..Default::default()
        });
        failing.start_save(&session).unwrap();
        match failing.wait() {
            Some(SyncOutcome::Failed { op, error }) => {
                assert_eq!(op, SyncOp::Save);
                assert_eq!(error.kind(), ErrorKind::Network);
            }
            _ => panic!("expected a failed save"),
        }
        assert_eq!(session.store().snapshot(), before);
    }

    #[test]
    fn test_failed_load_reports_network_error() {
        let mut worker = SyncWorker::new(FakeBackend {
            fail_with: Some(StatusCode::NOT_FOUND),
            ..Default::default()
        });
        assert!(worker.start_load());
        match worker.wait() {
            Some(SyncOutcome::Failed { op: SyncOp::Load, error }) => {
                assert!(matches!(error, SyncError::Status { status } if status == StatusCode::NOT_FOUND));
            }
            _ => panic!("expected a failed load"),
        }
    }

    #[test]
    fn test_crashed_worker_reports_failure() {
        let mut worker = SyncWorker::new(FakeBackend {
            crash_on_save: true,
            ..Default::default()
        });
        let session = loaded_session(&mut worker);

        assert!(worker.start_save(&session).unwrap());
        let outcome = loop {
            if let Some(outcome) = worker.poll() {
                break outcome;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        match outcome {
            SyncOutcome::Failed { op, error } => {
                assert_eq!(op, SyncOp::Save);
                assert!(matches!(error, SyncError::Interrupted));
                assert_eq!(error.kind(), ErrorKind::Network);
            }
            _ => panic!("expected a failed save"),
        }
        assert!(worker.pending().is_none());
    }
}
