//! Data types for the capture pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::selection::SelectionRect;

/// Output encoding for captured images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// File extension used for saved screenshots.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "webp" => Ok(ImageFormat::Webp),
            other => Err(format!(
                "unknown image format '{other}' (expected png, jpeg or webp)"
            )),
        }
    }
}

/// What to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// The whole visible frame.
    FullFrame,
    /// A rectangular sub-area of the frame, in source pixel space.
    Region(SelectionRect),
}

/// A single capture action as issued by the UI layer. Not persisted.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    pub mode: CaptureMode,
    pub format: ImageFormat,
    /// Normalized quality fraction in `[0, 1]`. UI-facing percentages are
    /// divided by 100 before they reach this layer.
    pub quality: f32,
    /// Exact output dimensions; aspect ratio is not preserved.
    pub target_size: Option<(u32, u32)>,
}

/// Encoded image produced by the pipeline. Ownership transfers to the caller.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Errors that can occur while producing a capture.
///
/// Every failure is terminal for that single attempt; the pipeline never
/// retries internally.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The user or host refused capture access. Not retryable without new
    /// consent.
    #[error("screenshot permission denied by the host")]
    PermissionDenied,

    /// The host primitive returned no usable data.
    #[error("host capture returned no usable data: {0}")]
    HostCapture(String),

    /// The requested region has no overlap with the source frame.
    #[error("region {rect} lies outside the {frame_width}x{frame_height} source frame")]
    InvalidRegion {
        rect: SelectionRect,
        frame_width: u32,
        frame_height: u32,
    },

    /// Non-positive output dimensions. Range clamping is the caller's job;
    /// the pipeline only refuses dimensions it cannot scale to at all.
    #[error("invalid output dimensions {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// The source image could not be decoded.
    #[error("failed to decode source image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("D-Bus communication error: {0}")]
    DBus(#[from] zbus::Error),

    /// The portal answered, but with something we cannot use.
    #[error("portal returned invalid response: {0}")]
    InvalidResponse(String),
}

/// Status of an ongoing capture operation, shared by the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStatus {
    Idle,
    /// Waiting for user permission from the host.
    AwaitingPermission,
    Success,
    Failed(String),
}

/// Outcome of one finished capture request.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// The capture was produced and stored; carries the gallery record.
    Success(crate::gallery::Screenshot),
    Failed(String),
}
