//! Screenshot capture: host integration and the crop/resize/encode pipeline.
//!
//! - [`HostCaptureService`] abstracts the platform capture primitives; the
//!   default implementation goes through xdg-desktop-portal.
//! - [`CapturePipeline`] turns a capture intent (full frame or region, with
//!   format/quality/custom size) into a final encoded image.
//! - [`CaptureManager`] and [`IntervalCapture`] run captures asynchronously,
//!   including repeated interval capture.

pub mod host;
pub mod interval;
pub mod manager;
pub mod pipeline;
pub mod portal;
pub mod reader;
pub mod types;


pub use host::{HostCaptureService, PortalCaptureService};
pub use interval::IntervalCapture;
pub use manager::{CaptureDeps, CaptureManager, perform_capture};
pub use pipeline::CapturePipeline;
pub use types::{
    CaptureError, CaptureMode, CaptureOutcome, CaptureRequest, CaptureResult, CaptureStatus,
    ImageFormat,
};
