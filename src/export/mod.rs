pub mod photo_sheet;
pub mod receipt;

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::error::Result;
use crate::form::FormState;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Letter page, in mm.
pub const PAGE_WIDTH_MM: f32 = 215.9;
pub const PAGE_HEIGHT_MM: f32 = 279.4;
pub const MARGIN_MM: f32 = 12.7;

fn base_name(state: &FormState) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    match state.consigner.display_name() {
        Some(name) => {
            let slug: String = name
                .chars()
                .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                .collect();
            format!("intake_{}_{}", slug, stamp)
        }
        None => format!("intake_{}", stamp),
    }
}

/// Generate the requested documents into `output_dir`, returning the paths
/// written.
pub fn export_documents(
    config: &Config,
    state: &FormState,
    format: &ExportFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let base = base_name(state);
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Receipt | ExportFormat::Both) {
        let path = output_dir.join(format!("{}_receipt.pdf", base));
        println!("- Generating receipt PDF...");
        receipt::generate_receipt(config, state, &path)?;
        println!("✔ Receipt: {}", path.display());
        written.push(path);
    }

    if matches!(format, ExportFormat::Photos | ExportFormat::Both) {
        let path = output_dir.join(format!("{}_photos.pdf", base));
        println!("- Generating photo sheet PDF...");
        photo_sheet::generate_photo_sheet(state, &path)?;
        println!("✔ Photo sheet: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
