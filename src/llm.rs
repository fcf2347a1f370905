//! Language model CLI invocation
//!
//! Item detection and email extraction both ride on the `claude` CLI in
//! text mode. The prompt is flattened to one line so it survives shell
//! quoting on every platform.

use crate::error::{IntakeError, Result};
use std::process::Command;

pub fn run_model(prompt: &str, verbose: bool) -> Result<String> {
    let flat_prompt = prompt.replace('\n', " ").replace('"', "\\\"");

    if verbose {
        println!("  [model] prompt length: {} chars", flat_prompt.len());
    }

    #[cfg(windows)]
    let output = Command::new("cmd")
        .args(["/c", "claude", "-p", &flat_prompt, "--output-format", "text"])
        .output()
        .map_err(|e| IntakeError::ApiCall(format!("claude CLI launch error: {}", e)))?;

    #[cfg(not(windows))]
    let output = Command::new("claude")
        .args(["-p", &flat_prompt, "--output-format", "text"])
        .output()
        .map_err(|e| IntakeError::ApiCall(format!("claude CLI launch error: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IntakeError::ApiCall(format!(
            "claude CLI failed (code {:?}): {}",
            output.status.code(),
            stderr
        )));
    }

    let response = String::from_utf8_lossy(&output.stdout).to_string();

    if verbose {
        let preview: String = response.chars().take(500).collect();
        println!("  [model] response: {}", preview);
    }

    Ok(response)
}
