//! Host capture service abstraction.

use async_trait::async_trait;
use tokio::task;

use super::types::CaptureError;
use super::{portal, reader};

/// Platform capability for obtaining screen image data.
///
/// Both primitives return an encoded full-frame image; they are separate
/// because hosts may route them through different APIs (a one-shot tab
/// capture versus a display stream). The default implementation backs both
/// with the desktop portal.
#[async_trait]
pub trait HostCaptureService: Send + Sync {
    /// Captures the whole visible view.
    async fn capture_visible_view(&self) -> Result<Vec<u8>, CaptureError>;

    /// Captures a full source frame intended for region crops.
    async fn capture_display_frame(&self) -> Result<Vec<u8>, CaptureError>;
}

/// Host service backed by the xdg-desktop-portal Screenshot interface.
#[derive(Debug, Default)]
pub struct PortalCaptureService;

#[async_trait]
impl HostCaptureService for PortalCaptureService {
    async fn capture_visible_view(&self) -> Result<Vec<u8>, CaptureError> {
        capture_portal_bytes().await
    }

    async fn capture_display_frame(&self) -> Result<Vec<u8>, CaptureError> {
        capture_portal_bytes().await
    }
}

/// Capture via the portal and return image bytes without blocking the
/// runtime on file IO.
async fn capture_portal_bytes() -> Result<Vec<u8>, CaptureError> {
    let uri = portal::take_screenshot().await?;

    task::spawn_blocking(move || reader::read_image_from_uri(&uri))
        .await
        .map_err(|e| CaptureError::HostCapture(format!("portal reader task failed: {e}")))?
}
