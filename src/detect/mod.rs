//! Item detection boundary
//!
//! A detector maps an uploaded photo to candidate bounding boxes. The
//! production implementation shells out to a vision model; tests use
//! stubs. Cropping of detected regions happens here so the workflow
//! controller only deals in bytes.

mod vision;

pub use vision::VisionDetector;

use crate::error::{IntakeError, Result};
use consign_common::types::BoundingBox;
use image::DynamicImage;
use std::io::Cursor;

pub trait Detector {
    /// Detect candidate items in the image. Boxes are in pixel coordinates;
    /// candidates below `confidence` are dropped by the implementation.
    fn detect(&self, image_bytes: &[u8], confidence: f32) -> Result<Vec<BoundingBox>>;
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| IntakeError::ImageDecode(e.to_string()))
}

/// Crop one detected region and re-encode it as JPEG.
///
/// Returns `None` when the box lies entirely outside the image.
pub fn crop_to_jpeg(img: &DynamicImage, bbox: &BoundingBox) -> Result<Option<Vec<u8>>> {
    let Some((x, y, w, h)) = bbox.clamped(img.width(), img.height()) else {
        return Ok(None);
    };

    let crop = img.crop_imm(x, y, w, h);
    let mut buf = Vec::new();
    crop.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .map_err(|e| IntakeError::ImageDecode(format!("crop encode error: {}", e)))?;
    Ok(Some(buf))
}
