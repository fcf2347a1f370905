//! Vision-model detector
//!
//! Writes the uploaded photo to a temp file, asks the model for the
//! bounding boxes of distinct sellable items, and parses the JSON-only
//! answer with the shared lenient parser.

use super::Detector;
use crate::error::{IntakeError, Result};
use crate::form::image_hash;
use crate::llm::run_model;
use consign_common::parser::parse_boxes_response;
use consign_common::types::BoundingBox;
use std::path::PathBuf;

pub struct VisionDetector {
    pub verbose: bool,
}

impl VisionDetector {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn write_temp_image(&self, image_bytes: &[u8]) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join("consign-intake");
        std::fs::create_dir_all(&dir)?;

        let hash = image_hash(image_bytes);
        let path = dir.join(format!("{}.jpg", &hash[..16]));
        std::fs::write(&path, image_bytes)?;
        Ok(path)
    }
}

fn build_detect_prompt(image_path: &str, confidence: f32) -> String {
    format!(
        "Read the image file {path} and locate every distinct physical item \
         a consignment store could sell (furniture, decor, lamps, frames, \
         dishes and the like). Ignore the background, walls, floor and \
         people. Only include items you are at least {conf:.0}% sure about. \
         Output a JSON array only, one [x1, y1, x2, y2] integer pixel \
         bounding box per item, e.g. [[40, 10, 380, 290]]. Output [] if no \
         items are visible. No prose.",
        path = image_path,
        conf = confidence * 100.0,
    )
}

impl Detector for VisionDetector {
    fn detect(&self, image_bytes: &[u8], confidence: f32) -> Result<Vec<BoundingBox>> {
        let path = self.write_temp_image(image_bytes)?;
        let prompt = build_detect_prompt(&path.display().to_string().replace('\\', "/"), confidence);

        let response = run_model(&prompt, self.verbose)?;
        std::fs::remove_file(&path).ok();

        parse_boxes_response(&response)
            .map_err(|e| IntakeError::ApiParse(format!("detection response: {}", e)))
    }
}
