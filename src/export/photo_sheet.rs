//! Photo sheet PDF
//!
//! Letter pages with a 2x3 grid of item photos, each captioned with its
//! item number and name. Items without a photo are skipped; a form with
//! no photos at all still produces a valid single-page document.

use super::{MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::error::{IntakeError, Result};
use crate::form::FormState;
use printpdf::image_crate::GenericImageView;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const COLS: usize = 2;
const ROWS: usize = 3;
const CELL_GAP_MM: f32 = 6.0;
const CAPTION_MM: f32 = 7.0;
const TITLE_BLOCK_MM: f32 = 14.0;

pub fn generate_photo_sheet(state: &FormState, output_path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Intake Photos",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| IntakeError::PdfGeneration(format!("font error: {:?}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| IntakeError::PdfGeneration(format!("font error: {:?}", e)))?;

    let cell_w = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM - (COLS as f32 - 1.0) * CELL_GAP_MM) / COLS as f32;
    let cell_h = (PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - TITLE_BLOCK_MM
        - (ROWS as f32 - 1.0) * CELL_GAP_MM)
        / ROWS as f32;
    let photo_h = cell_h - CAPTION_MM;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    draw_title(&layer, state, &bold);

    let photos: Vec<(u32, String, &[u8])> = state
        .included_items()
        .enumerate()
        .filter_map(|(offset, item)| {
            item.photo.as_deref().map(|bytes| {
                (
                    state.starting_item_number + offset as u32,
                    item.values.name.clone(),
                    bytes,
                )
            })
        })
        .collect();

    let per_page = COLS * ROWS;
    for (slot, (number, name, bytes)) in photos.iter().enumerate() {
        let cell = slot % per_page;
        if slot > 0 && cell == 0 {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page_idx).get_layer(layer_idx);
            draw_title(&layer, state, &bold);
        }

        let col = cell % COLS;
        let row = cell / COLS;
        let x0 = MARGIN_MM + col as f32 * (cell_w + CELL_GAP_MM);
        let y_top = PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BLOCK_MM - row as f32 * (cell_h + CELL_GAP_MM);
        let photo_bottom = y_top - photo_h;

        place_photo(&layer, bytes, x0, photo_bottom, cell_w, photo_h)?;

        let caption = if name.trim().is_empty() {
            format!("#{}", number)
        } else {
            format!("#{} {}", number, name.trim())
        };
        layer.use_text(caption, 9.0, Mm(x0), Mm(photo_bottom - 5.0), &font);
    }

    if photos.is_empty() {
        layer.use_text(
            "No item photos on file.",
            10.0,
            Mm(MARGIN_MM),
            Mm(PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BLOCK_MM - 6.0),
            &font,
        );
    }

    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| IntakeError::PdfGeneration(format!("save error: {:?}", e)))?;
    Ok(())
}

fn draw_title(layer: &PdfLayerReference, state: &FormState, bold: &IndirectFontRef) {
    let title = match state.consigner.display_name() {
        Some(name) => format!("Item Photos - {}", name),
        None => "Item Photos".to_string(),
    };
    layer.use_text(
        title,
        13.0,
        Mm(MARGIN_MM),
        Mm(PAGE_HEIGHT_MM - MARGIN_MM - 5.0),
        bold,
    );
}

/// Scale the photo to fit the cell while keeping its aspect ratio, then
/// center it. Undecodable photos leave the cell blank rather than failing
/// the whole sheet.
fn place_photo(
    layer: &PdfLayerReference,
    bytes: &[u8],
    x_mm: f32,
    y_mm: f32,
    max_w_mm: f32,
    max_h_mm: f32,
) -> Result<()> {
    let decoded = match image_crate::load_from_memory(bytes) {
        Ok(img) => img,
        Err(_) => return Ok(()),
    };

    let (px_w, px_h) = decoded.dimensions();
    if px_w == 0 || px_h == 0 {
        return Ok(());
    }

    // printpdf renders images at 300 dpi for scale 1.0
    let dpi = 300.0;
    let natural_w_mm = px_w as f32 * 25.4 / dpi;
    let natural_h_mm = px_h as f32 * 25.4 / dpi;
    let scale = (max_w_mm / natural_w_mm)
        .min(max_h_mm / natural_h_mm)
        .min(4.0);

    let draw_w = natural_w_mm * scale;
    let draw_h = natural_h_mm * scale;
    let off_x = x_mm + (max_w_mm - draw_w) / 2.0;
    let off_y = y_mm + (max_h_mm - draw_h) / 2.0;

    let image = Image::from_dynamic_image(&decoded);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(off_x)),
            translate_y: Some(Mm(off_y)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            ..Default::default()
        },
    );
    Ok(())
}
