//! Async capture orchestration.
//!
//! Bridges the synchronous CLI/UI world with the async portal pipeline. Each
//! queued request is handled in an independently spawned task, so overlapping
//! captures from a short interval run concurrently; every one produces its
//! own [`CaptureResult`] and gallery record.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};

use crate::gallery::{GalleryStore, Screenshot, generate_name};
use crate::notification;

use super::pipeline::CapturePipeline;
use super::types::{CaptureError, CaptureOutcome, CaptureRequest, CaptureStatus};

/// Dependencies shared by every capture the manager performs.
pub struct CaptureDeps {
    pub pipeline: CapturePipeline,
    pub store: Arc<dyn GalleryStore>,
    /// chrono format template for generated record names.
    pub name_template: String,
    /// Whether to emit a desktop notification per outcome.
    pub notify: bool,
}

/// Shared handle for queueing capture work.
#[derive(Clone)]
pub struct CaptureManager {
    request_tx: mpsc::UnboundedSender<CaptureRequest>,
    status: Arc<Mutex<CaptureStatus>>,
    last_result: Arc<Mutex<Option<CaptureOutcome>>>,
    in_flight_tx: Arc<watch::Sender<usize>>,
    in_flight_rx: watch::Receiver<usize>,
}

impl CaptureManager {
    /// Spawns the background worker on the given runtime handle.
    pub fn new(runtime_handle: &tokio::runtime::Handle, deps: CaptureDeps) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<CaptureRequest>();
        let status = Arc::new(Mutex::new(CaptureStatus::Idle));
        let last_result = Arc::new(Mutex::new(None));
        let (in_flight_tx, in_flight_rx) = watch::channel(0usize);
        let in_flight_tx = Arc::new(in_flight_tx);

        let status_clone = status.clone();
        let result_clone = last_result.clone();
        let counter = in_flight_tx.clone();
        let deps = Arc::new(deps);

        runtime_handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                log::debug!("processing capture request: {:?}", request.mode);

                let status = status_clone.clone();
                let result = result_clone.clone();
                let counter = counter.clone();
                let deps = deps.clone();

                // One independent task per request; a slow capture must not
                // hold up the queue or the interval timer feeding it.
                tokio::spawn(async move {
                    *status.lock().await = CaptureStatus::AwaitingPermission;

                    match perform_capture(&request, &deps).await {
                        Ok(shot) => {
                            log::info!("capture stored as '{}' ({})", shot.name, shot.id);
                            *status.lock().await = CaptureStatus::Success;
                            *result.lock().await = Some(CaptureOutcome::Success(shot));
                        }
                        Err(e) => {
                            let message = e.to_string();
                            log::error!("capture failed: {message}");
                            *status.lock().await = CaptureStatus::Failed(message.clone());
                            *result.lock().await = Some(CaptureOutcome::Failed(message));
                        }
                    }

                    counter.send_modify(|n| *n -= 1);
                });
            }
        });

        Self {
            request_tx,
            status,
            last_result,
            in_flight_tx,
            in_flight_rx,
        }
    }

    /// Queue one capture. Non-blocking; the capture happens in the
    /// background.
    pub fn request_capture(&self, request: CaptureRequest) -> Result<(), CaptureError> {
        self.in_flight_tx.send_modify(|n| *n += 1);
        self.request_tx.send(request).map_err(|_| {
            self.in_flight_tx.send_modify(|n| *n -= 1);
            CaptureError::HostCapture("capture manager not running".to_string())
        })
    }

    /// Waits until every queued capture has finished.
    pub async fn wait_idle(&self) {
        let mut rx = self.in_flight_rx.clone();
        // wait_for returns Err only when the manager itself is gone.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    pub async fn status(&self) -> CaptureStatus {
        self.status.lock().await.clone()
    }

    /// Takes the outcome of the most recently finished capture.
    pub async fn take_result(&self) -> Option<CaptureOutcome> {
        self.last_result.lock().await.take()
    }
}

/// One capture attempt: pipeline, then persistence, then notification.
///
/// Persistence failures are logged but do not fail the capture; from the
/// pipeline's point of view the store is a collaborator that may fail
/// silently.
pub async fn perform_capture(
    request: &CaptureRequest,
    deps: &CaptureDeps,
) -> Result<Screenshot, CaptureError> {
    let outcome = deps.pipeline.capture(request).await;

    match outcome {
        Ok(result) => {
            let name = generate_name(&deps.name_template);
            let shot = Screenshot::from_capture(result, name);

            if let Err(e) = deps.store.insert(shot.clone()) {
                log::error!("failed to persist screenshot '{}': {e}", shot.name);
            }

            if deps.notify {
                notification::send_in_background(
                    "Screenshot captured".to_string(),
                    format!("{} added to the gallery", shot.name),
                );
            }

            Ok(shot)
        }
        Err(e) => {
            if deps.notify {
                notification::send_in_background("Capture failed".to_string(), e.to_string());
            }
            Err(e)
        }
    }
}
