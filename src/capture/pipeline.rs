//! Crop, resize and re-encode pipeline for captured frames.

use std::sync::Arc;

use image::{DynamicImage, ExtendedColorType, ImageEncoder, imageops::FilterType};

use crate::selection::SelectionRect;

use super::host::{HostCaptureService, PortalCaptureService};
use super::types::{CaptureError, CaptureMode, CaptureRequest, CaptureResult, ImageFormat};

/// Produces a final encoded image for a capture intent.
///
/// The pipeline owns no UI state; it talks to the [`HostCaptureService`] for
/// pixels and performs the single-frame crop/scale/encode steps itself.
pub struct CapturePipeline {
    host: Arc<dyn HostCaptureService>,
}

impl CapturePipeline {
    pub fn new(host: Arc<dyn HostCaptureService>) -> Self {
        Self { host }
    }

    /// Pipeline wired to the desktop portal host service.
    pub fn portal() -> Self {
        Self::new(Arc::new(PortalCaptureService))
    }

    /// Runs one capture request end to end.
    pub async fn capture(&self, request: &CaptureRequest) -> Result<CaptureResult, CaptureError> {
        let image = match request.mode {
            CaptureMode::FullFrame => self.obtain_full_frame().await?,
            CaptureMode::Region(rect) => {
                let frame = self.obtain_display_frame().await?;
                crop_to_region(&frame, rect)?
            }
        };

        let image = match request.target_size {
            Some((width, height)) => scale_exact(image, width, height)?,
            None => image,
        };

        encode_image(&image, request.format, request.quality)
    }

    /// Captures the whole visible frame.
    pub async fn capture_full_frame(
        &self,
        format: ImageFormat,
        quality: f32,
    ) -> Result<CaptureResult, CaptureError> {
        let image = self.obtain_full_frame().await?;
        encode_image(&image, format, quality)
    }

    /// Captures a full source frame and crops it to `rect`.
    ///
    /// A rectangle partially outside the frame is cropped to the
    /// intersection; one with no overlap at all fails with
    /// [`CaptureError::InvalidRegion`].
    pub async fn capture_region(
        &self,
        rect: SelectionRect,
        format: ImageFormat,
        quality: f32,
    ) -> Result<CaptureResult, CaptureError> {
        let frame = self.obtain_display_frame().await?;
        let cropped = crop_to_region(&frame, rect)?;
        encode_image(&cropped, format, quality)
    }

    /// Scales an encoded image to exactly `width`×`height` and re-encodes it.
    ///
    /// The scale is non-uniform; aspect ratio is not preserved. Identical
    /// inputs produce byte-identical output.
    pub fn resize_and_reencode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        format: ImageFormat,
        quality: f32,
    ) -> Result<CaptureResult, CaptureError> {
        let image = decode_image(data)?;
        let scaled = scale_exact(image, width, height)?;
        encode_image(&scaled, format, quality)
    }

    async fn obtain_full_frame(&self) -> Result<DynamicImage, CaptureError> {
        let data = self.host.capture_visible_view().await?;
        decode_host_frame(&data)
    }

    async fn obtain_display_frame(&self) -> Result<DynamicImage, CaptureError> {
        let data = self.host.capture_display_frame().await?;
        decode_host_frame(&data)
    }
}

fn decode_host_frame(data: &[u8]) -> Result<DynamicImage, CaptureError> {
    if data.is_empty() {
        return Err(CaptureError::HostCapture(
            "host returned an empty image".into(),
        ));
    }
    decode_image(data)
}

/// Decode an encoded image, mapping failures to [`CaptureError::Decode`].
pub(crate) fn decode_image(data: &[u8]) -> Result<DynamicImage, CaptureError> {
    image::load_from_memory(data).map_err(|e| CaptureError::Decode(e.to_string()))
}

fn crop_to_region(
    frame: &DynamicImage,
    rect: SelectionRect,
) -> Result<DynamicImage, CaptureError> {
    let (frame_width, frame_height) = (frame.width(), frame.height());

    let x0 = i64::from(rect.left).max(0);
    let y0 = i64::from(rect.top).max(0);
    let x1 = (i64::from(rect.left) + i64::from(rect.width)).min(i64::from(frame_width));
    let y1 = (i64::from(rect.top) + i64::from(rect.height)).min(i64::from(frame_height));

    if x1 <= x0 || y1 <= y0 {
        return Err(CaptureError::InvalidRegion {
            rect,
            frame_width,
            frame_height,
        });
    }

    Ok(frame.crop_imm(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

fn scale_exact(image: DynamicImage, width: u32, height: u32) -> Result<DynamicImage, CaptureError> {
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidDimension { width, height });
    }
    Ok(image.resize_exact(width, height, FilterType::Triangle))
}

/// Encode an image into the requested format at the given quality.
///
/// `quality` is clamped to `[0, 1]`; it applies to JPEG. PNG is lossless by
/// definition and WebP is encoded lossless here.
pub(crate) fn encode_image(
    image: &DynamicImage,
    format: ImageFormat,
    quality: f32,
) -> Result<CaptureResult, CaptureError> {
    let (width, height) = (image.width(), image.height());
    let mut data = Vec::new();

    match format {
        ImageFormat::Png => {
            let rgba = image.to_rgba8();
            image::codecs::png::PngEncoder::new(&mut data)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, q)
                .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
        ImageFormat::Webp => {
            let rgba = image.to_rgba8();
            image::codecs::webp::WebPEncoder::new_lossless(&mut data)
                .encode(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
    }

    Ok(CaptureResult {
        data,
        format,
        width,
        height,
    })
}
