//! Document generation tests
//!
//! Render receipts and photo sheets into a temp directory and check the
//! resulting PDFs exist and look like PDFs.

use consign_common::fields::FieldId;
use consign_intake::cli::ExportFormat;
use consign_intake::config::Config;
use consign_intake::export::{export_documents, photo_sheet, receipt};
use consign_intake::form::{Consigner, FieldValue, FormState, Mode};
use tempfile::tempdir;

fn sample_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_fn(160, 120, |x, y| {
        image::Rgb([(x * 2 % 256) as u8, (y * 2 % 256) as u8, 64])
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf.into_inner()
}

fn sample_form() -> FormState {
    let mut form = FormState::new();
    form.mode = Mode::Manual;
    form.consigner = Consigner::New {
        name: "Jane Doe".into(),
        address: "12 Elm St\nCarmel, IN 46032".into(),
        phone: "317-555-0101".into(),
        notes: String::new(),
    };

    let a = form.add_item(false);
    form.set_item_field(a, FieldId::Name, FieldValue::Text("Oak dresser".into()))
        .expect("set name");
    form.set_item_field(a, FieldId::Price, FieldValue::Currency(85.0))
        .expect("set price");
    form.set_item_field(a, FieldId::Notes, FieldValue::Text("minor scratch".into()))
        .expect("set notes");
    form.items[a].photo = Some(sample_jpeg());

    let b = form.add_item(false);
    form.set_item_field(b, FieldId::Name, FieldValue::Text("Brass lamp".into()))
        .expect("set name");
    form.set_item_field(b, FieldId::Price, FieldValue::Currency(22.5))
        .expect("set price");
    form
}

fn assert_is_pdf(path: &std::path::Path) {
    let bytes = std::fs::read(path).expect("read pdf");
    assert!(bytes.len() > 500, "suspiciously small pdf: {}", bytes.len());
    assert_eq!(&bytes[..4], b"%PDF");
}

/// Receipt for a two-item intake.
#[test]
fn test_generate_receipt() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("receipt.pdf");

    let config = Config::default();
    let form = sample_form();
    receipt::generate_receipt(&config, &form, &path).expect("generate");

    assert_is_pdf(&path);
}

/// A receipt with no items still renders its header and summary row.
#[test]
fn test_generate_receipt_empty_form() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("empty.pdf");

    let config = Config::default();
    let form = FormState::new();
    receipt::generate_receipt(&config, &form, &path).expect("generate");

    assert_is_pdf(&path);
}

/// Receipts paginate rather than overflow when the item list is long.
#[test]
fn test_generate_receipt_many_items() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("long.pdf");

    let config = Config::default();
    let mut form = FormState::new();
    for n in 0..60 {
        let i = form.add_item(false);
        form.set_item_field(i, FieldId::Name, FieldValue::Text(format!("Item {}", n)))
            .expect("set name");
        form.set_item_field(i, FieldId::Price, FieldValue::Currency(5.0))
            .expect("set price");
    }

    receipt::generate_receipt(&config, &form, &path).expect("generate");
    assert_is_pdf(&path);
}

/// Photo sheet with one real JPEG and one photo-less item.
#[test]
fn test_generate_photo_sheet() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("photos.pdf");

    let form = sample_form();
    photo_sheet::generate_photo_sheet(&form, &path).expect("generate");

    assert_is_pdf(&path);
}

/// A form without any photos still yields a valid sheet.
#[test]
fn test_generate_photo_sheet_no_photos() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("no_photos.pdf");

    let mut form = FormState::new();
    form.add_item(false);
    photo_sheet::generate_photo_sheet(&form, &path).expect("generate");

    assert_is_pdf(&path);
}

/// The dispatcher writes both documents and returns their paths.
#[test]
fn test_export_documents_both() {
    let dir = tempdir().expect("temp dir");

    let config = Config::default();
    let form = sample_form();
    let written =
        export_documents(&config, &form, &ExportFormat::Both, dir.path()).expect("export");

    assert_eq!(written.len(), 2);
    for path in &written {
        assert_is_pdf(path);
    }
    assert!(written[0].file_name().is_some());
    let name = written[0].file_name().map(|n| n.to_string_lossy().to_string());
    assert!(name.map(|n| n.starts_with("intake_jane_doe")).unwrap_or(false));
}
