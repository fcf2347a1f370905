//! Item list extraction from an email conversation.

use crate::error::{IntakeError, Result};
use crate::llm::run_model;
use consign_common::parser::parse_intake_response;
use consign_common::types::ExtractedIntake;

/// Keep the prompt bounded; anything this deep into a thread is noise.
const MAX_THREAD_CHARS: usize = 12_000;

pub fn build_extract_prompt(thread_text: &str) -> String {
    let text: String = thread_text.chars().take(MAX_THREAD_CHARS).collect();

    format!(
        "The following is an email conversation between a consignment store \
         and a customer about items the customer wants to consign. Extract \
         the customer details and the item list that was discussed. For each \
         item record its status as written (approved, rejected or pending). \
         Output a single JSON object only, no prose, with exactly these \
         keys: customerName, customerEmail, customerPhone, customerAddress, \
         items (array of {{name, status, notes, quantity}}), pickupRequired \
         (boolean), pickupAddress, pickupDate, summary. Use \"\" for unknown \
         strings and 1 for unknown quantities.\n\nConversation:\n{}",
        text
    )
}

/// Submit a thread's concatenated text to the extraction model and parse
/// the structured result.
pub fn extract_intake(thread_text: &str, verbose: bool) -> Result<ExtractedIntake> {
    let prompt = build_extract_prompt(thread_text);
    let response = run_model(&prompt, verbose)?;

    parse_intake_response(&response)
        .map_err(|e| IntakeError::ApiParse(format!("extraction response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_thread_and_schema() {
        let prompt = build_extract_prompt("Hi, I have a dresser and two lamps.");
        assert!(prompt.contains("dresser and two lamps"));
        assert!(prompt.contains("customerName"));
        assert!(prompt.contains("pickupRequired"));
    }

    #[test]
    fn test_prompt_truncates_long_threads() {
        let long_text = "x".repeat(MAX_THREAD_CHARS * 2);
        let prompt = build_extract_prompt(&long_text);
        assert!(prompt.len() < MAX_THREAD_CHARS + 1_000);
    }
}
