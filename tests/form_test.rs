//! Form state tests
//!
//! End-to-end checks of item bookkeeping, field clamping and the
//! receipt totals.

use consign_common::fields::FieldId;
use consign_intake::form::{FieldValue, FormState, Mode};

/// A typical walk-in: two items, one priced, totals add up.
#[test]
fn test_two_item_intake_totals() {
    let mut form = FormState::new();
    form.mode = Mode::Manual;

    let a = form.add_item(false);
    form.set_item_field(a, FieldId::Name, FieldValue::Text("Oak dresser".into()))
        .expect("set name");
    form.set_item_field(a, FieldId::Price, FieldValue::Text("$25.50".into()))
        .expect("set price");

    let b = form.add_item(false);
    form.set_item_field(b, FieldId::Name, FieldValue::Text("Brass lamp".into()))
        .expect("set name");
    form.set_item_field(b, FieldId::Price, FieldValue::Currency(10.0))
        .expect("set price");

    assert_eq!(form.items.len(), 2);
    assert_eq!(form.accepted_count(), 2);
    assert_eq!(form.total_quantity(), 2);
    assert!((form.total_value() - 35.5).abs() < f64::EPSILON);
}

/// Rejected items disappear from every total while staying in the list.
#[test]
fn test_rejected_item_excluded_from_totals() {
    let mut form = FormState::new();
    for name in ["Mirror", "Chipped vase"] {
        let i = form.add_item(false);
        form.set_item_field(i, FieldId::Name, FieldValue::Text(name.into()))
            .expect("set name");
        form.set_item_field(i, FieldId::Price, FieldValue::Currency(20.0))
            .expect("set price");
    }
    form.set_item_field(1, FieldId::Status, FieldValue::Select("Reject".into()))
        .expect("set status");

    assert_eq!(form.items.len(), 2);
    assert_eq!(form.accepted_count(), 1);
    assert!((form.total_value() - 20.0).abs() < f64::EPSILON);
}

/// Quantity contributes to the on-hand count only while the field is
/// enabled; disabled it counts one per included item.
#[test]
fn test_quantity_field_toggle_changes_on_hand_count() {
    let mut form = FormState::new();
    for qty in [2u32, 3] {
        let i = form.add_item(false);
        form.set_item_field(i, FieldId::Quantity, FieldValue::Count(qty))
            .expect("set quantity");
    }

    assert_eq!(form.total_quantity(), 2);

    form.enabled_fields.enable(FieldId::Quantity);
    assert_eq!(form.total_quantity(), 5);
}

/// Numeric inputs are clamped, not rejected.
#[test]
fn test_clamping_on_entry() {
    let mut form = FormState::new();
    let i = form.add_item(false);

    form.set_item_field(i, FieldId::Price, FieldValue::Currency(-3.0))
        .expect("set price");
    form.set_item_field(i, FieldId::Quantity, FieldValue::Count(0))
        .expect("set quantity");

    assert_eq!(form.items[i].values.price, 0.0);
    assert_eq!(form.items[i].values.quantity, 1);
}

/// Re-supplying byte-identical photo bytes never clears detection results.
#[test]
fn test_image_debounce_preserves_detection() {
    let mut form = FormState::new();
    form.mode = Mode::Detection;

    assert!(form.process_new_image(vec![1, 2, 3, 4]));
    form.detection_complete = true;
    form.add_item(false);

    assert!(!form.process_new_image(vec![1, 2, 3, 4]));
    assert!(form.detection_complete);
    assert_eq!(form.items.len(), 1);
}

/// Clearing the photo resets the working set but keeps the consigner and
/// the field configuration.
#[test]
fn test_clear_input_keeps_consigner_and_fields() {
    let mut form = FormState::new();
    form.mode = Mode::Detection;
    form.enabled_fields.enable(FieldId::Dimensions);
    form.process_new_image(vec![9, 9, 9]);
    form.add_item(false);

    assert!(form.clear_input());
    assert!(form.items.is_empty());
    assert!(form.image.is_none());
    assert!(form.enabled_fields.is_enabled(FieldId::Dimensions));

    // a second clear with no active input is a no-op
    assert!(!form.clear_input());
}

/// Dimensions are normalized to a canonical "W x D x H unit" shape.
#[test]
fn test_dimension_normalization_on_entry() {
    let mut form = FormState::new();
    let i = form.add_item(false);

    form.set_item_field(
        i,
        FieldId::Dimensions,
        FieldValue::Text("30\" by 18\" by 60 inches".into()),
    )
    .expect("set dimensions");

    assert_eq!(form.items[i].values.dimensions, "30 x 18 x 60 in");
}
