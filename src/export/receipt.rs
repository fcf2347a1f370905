//! Intake receipt PDF
//!
//! A letter-sized table of the included items: company header, customer
//! block for new consigners, one row per item with the enabled print
//! columns, and a summary row with counts and total value.

use super::{MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::config::Config;
use crate::error::{IntakeError, Result};
use crate::form::{Consigner, FormState, Item};
use chrono::Local;
use consign_common::fields::{catalog, FieldId};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const ROW_HEIGHT_MM: f32 = 8.0;
const NOTES_ROW_HEIGHT_MM: f32 = 12.0;
const HEADER_ROW_HEIGHT_MM: f32 = 7.0;
const BOTTOM_RESERVE_MM: f32 = 26.0;

struct Column {
    header: &'static str,
    width_mm: f32,
}

fn columns(state: &FormState) -> Vec<Column> {
    let mut cols = vec![
        Column { header: "Date", width_mm: 22.0 },
        Column { header: "Item #", width_mm: 14.0 },
    ];

    for def in catalog() {
        if def.print_width_mm <= 0.0 {
            continue; // notes print under the title, not as a column
        }
        if state.enabled_fields.is_enabled(def.id) {
            cols.push(Column {
                header: def.print_header,
                width_mm: def.print_width_mm,
            });
        }
    }
    cols
}

fn column_value(item: &Item, item_number: u32, date: &str, header: &str) -> String {
    match header {
        "Date" => date.to_string(),
        "Item #" => item_number.to_string(),
        "Title" => item.values.name.clone(),
        "Status" => "A".to_string(), // only accepted items are printed
        "Price" => format!("${:.2}", item.values.price),
        "QTY" => item.values.quantity.to_string(),
        "Cond" => item.values.condition.clone(),
        "Dims" => item.values.dimensions.clone(),
        _ => String::new(),
    }
}

/// Rough character capacity of a column at 8pt Helvetica.
fn truncate(text: &str, width_mm: f32) -> String {
    let max_chars = (width_mm / 1.7).max(3.0) as usize;
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars.saturating_sub(2)).collect();
        format!("{}..", cut.trim_end())
    }
}

struct Page {
    layer: PdfLayerReference,
    y: f32,
    number: u32,
}

pub fn generate_receipt(config: &Config, state: &FormState, output_path: &Path) -> Result<()> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Intake Receipt",
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

    let mut page = Page {
        layer: doc.get_page(page1).get_layer(layer1),
        y: PAGE_HEIGHT_MM - MARGIN_MM,
        number: 1,
    };
    stamp_page_number(&page, &font);

    let today = Local::now().format("%m/%d/%Y").to_string();
    let cols = columns(state);
    let notes_enabled = state.enabled_fields.is_enabled(FieldId::Notes);

    // company header
    page.y -= 6.0;
    page.layer.use_text(&config.company_name, 16.0, Mm(MARGIN_MM), Mm(page.y), &bold);
    page.y -= 5.0;
    set_gray(&page.layer, 0.4);
    for line in &config.company_address {
        page.layer.use_text(line, 9.0, Mm(MARGIN_MM), Mm(page.y), &font);
        page.y -= 4.0;
    }
    set_gray(&page.layer, 0.0);

    page.y -= 6.0;
    page.layer.use_text("Item List", 12.0, Mm(MARGIN_MM), Mm(page.y), &bold);
    page.y -= 7.0;

    // customer block, new consigners only
    if let Consigner::New { name, address, phone, .. } = &state.consigner {
        if !name.trim().is_empty() {
            page.layer.use_text(name.trim(), 10.0, Mm(MARGIN_MM), Mm(page.y), &bold);
            page.y -= 5.0;
        }
        for line in address.lines().filter(|l| !l.trim().is_empty()) {
            page.layer.use_text(line.trim(), 10.0, Mm(MARGIN_MM), Mm(page.y), &font);
            page.y -= 5.0;
        }
        let _ = phone;
        page.y -= 3.0;
    }

    // date / account / phone / page row
    let account = match &state.consigner {
        Consigner::Existing { account_number, .. } if !account_number.is_empty() => {
            account_number.clone()
        }
        _ => "N/A".to_string(),
    };
    let phone = match &state.consigner {
        Consigner::New { phone, .. } if !phone.trim().is_empty() => phone.trim().to_string(),
        _ => "N/A".to_string(),
    };
    let info = format!(
        "Today's Date: {}    Account #: {}    Phone: {}",
        today, account, phone
    );
    page.layer.use_text(&info, 9.0, Mm(MARGIN_MM), Mm(page.y), &font);
    page.y -= 8.0;

    draw_header_row(&mut page, &cols, &bold);

    // item rows: included items only, numbered from the starting number
    let mut item_number = state.starting_item_number;
    for item in state.included_items() {
        let has_notes = notes_enabled && !item.values.notes.trim().is_empty();
        let row_h = if has_notes { NOTES_ROW_HEIGHT_MM } else { ROW_HEIGHT_MM };

        if page.y - row_h < MARGIN_MM + BOTTOM_RESERVE_MM {
            new_page(&doc, &mut page, &font)?;
            draw_header_row(&mut page, &cols, &bold);
        }

        let mut x = MARGIN_MM;
        for col in &cols {
            let value = column_value(item, item_number, &today, col.header);
            page.layer.use_text(
                truncate(&value, col.width_mm),
                8.0,
                Mm(x + 1.0),
                Mm(page.y - 5.0),
                &font,
            );
            x += col.width_mm;
        }
        if has_notes {
            set_gray(&page.layer, 0.4);
            page.layer.use_text(
                truncate(item.values.notes.trim(), 120.0),
                7.0,
                Mm(MARGIN_MM + 37.0),
                Mm(page.y - 9.5),
                &font,
            );
            set_gray(&page.layer, 0.0);
        }

        page.y -= row_h;
        hline(&page.layer, MARGIN_MM, table_right(&cols), page.y, 0.2);
        item_number += 1;
    }

    // summary row
    page.y -= 7.0;
    let summary = format!(
        "{} Unique Items    Quantity on Hand: {}    Total: ${:.2}",
        state.accepted_count(),
        state.total_quantity(),
        state.total_value()
    );
    page.layer.use_text(&summary, 9.0, Mm(MARGIN_MM), Mm(page.y), &bold);
    page.y -= 2.0;
    hline(&page.layer, MARGIN_MM, table_right(&cols), page.y, 0.6);

    let file = File::create(output_path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| IntakeError::PdfGeneration(format!("save error: {:?}", e)))?;
    Ok(())
}

fn table_right(cols: &[Column]) -> f32 {
    MARGIN_MM + cols.iter().map(|c| c.width_mm).sum::<f32>()
}

fn draw_header_row(page: &mut Page, cols: &[Column], bold: &IndirectFontRef) {
    hline(&page.layer, MARGIN_MM, table_right(cols), page.y, 0.6);
    let mut x = MARGIN_MM;
    for col in cols {
        page.layer.use_text(col.header, 8.0, Mm(x + 1.0), Mm(page.y - 4.5), bold);
        x += col.width_mm;
    }
    page.y -= HEADER_ROW_HEIGHT_MM;
    hline(&page.layer, MARGIN_MM, table_right(cols), page.y, 0.6);
}

fn new_page(doc: &PdfDocumentReference, page: &mut Page, font: &IndirectFontRef) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    page.layer = doc.get_page(page_idx).get_layer(layer_idx);
    page.y = PAGE_HEIGHT_MM - MARGIN_MM - 4.0;
    page.number += 1;
    stamp_page_number(page, font);
    Ok(())
}

/// Top-right corner of every page.
fn stamp_page_number(page: &Page, font: &IndirectFontRef) {
    page.layer.use_text(
        format!("Page {}", page.number),
        8.0,
        Mm(PAGE_WIDTH_MM - MARGIN_MM - 12.0),
        Mm(PAGE_HEIGHT_MM - MARGIN_MM),
        font,
    );
}

fn hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, thickness: f32) {
    layer.set_outline_thickness(thickness);
    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Text is painted with the fill color.
fn set_gray(layer: &PdfLayerReference, level: f32) {
    layer.set_fill_color(Color::Rgb(Rgb::new(level, level, level, None)));
}
