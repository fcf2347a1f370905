//! Model response parsing
//!
//! Vision detection and email extraction both go through a language model
//! that is asked for JSON-only output but occasionally wraps it in prose or
//! a code fence. These helpers pull the JSON payload out of a response and
//! parse it into the shared types.

use crate::error::{Error, Result};
use crate::types::{BoundingBox, ExtractedIntake};

/// Extract the JSON portion of a model response.
///
/// Priority:
/// 1. a ```json ... ``` fenced block
/// 2. the outermost raw `[...]` array or `{...}` object
/// 3. error
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // length of "```json"
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    let array_start = response.find('[');
    let object_start = response.find('{');

    let (open, close) = match (array_start, object_start) {
        (Some(a), Some(o)) if a < o => (a, response.rfind(']')),
        (Some(_), Some(o)) => (o, response.rfind('}')),
        (Some(a), None) => (a, response.rfind(']')),
        (None, Some(o)) => (o, response.rfind('}')),
        (None, None) => return Err(Error::Parse("no JSON found in response".into())),
    };

    match close {
        Some(end) if end >= open => Ok(&response[open..=end]),
        _ => Err(Error::Parse("no JSON found in response".into())),
    }
}

/// Parse a detection response into bounding boxes.
///
/// Expected payload: a JSON array of `[x1, y1, x2, y2]` arrays. An empty
/// array is a valid result (no items detected).
pub fn parse_boxes_response(response: &str) -> Result<Vec<BoundingBox>> {
    let json_str = extract_json(response)?;
    let boxes: Vec<BoundingBox> = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("detection JSON parse error: {}", e)))?;
    Ok(boxes)
}

/// Parse an email extraction response into a structured intake.
pub fn parse_intake_response(response: &str) -> Result<ExtractedIntake> {
    let json_str = extract_json(response)?;
    let intake: ExtractedIntake = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("extraction JSON parse error: {}", e)))?;
    Ok(intake)
}
