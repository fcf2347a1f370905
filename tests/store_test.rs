//! Draft store tests
//!
//! Save/load round-trips, overwrite semantics, lazy expiry and deletion
//! against a temporary store directory.

use consign_common::fields::FieldId;
use consign_intake::error::IntakeError;
use consign_intake::form::{Consigner, FieldValue, FormState, Mode};
use consign_intake::store::{default_draft_name, DraftStore};
use tempfile::tempdir;

fn sample_form() -> FormState {
    let mut form = FormState::new();
    form.mode = Mode::Manual;
    form.consigner = Consigner::New {
        name: "Jane Doe".into(),
        address: "12 Elm St\nCarmel, IN".into(),
        phone: "317-555-0101".into(),
        notes: "Prefers pickup".into(),
    };
    form.enabled_fields.enable(FieldId::Quantity);

    let i = form.add_item(false);
    form.set_item_field(i, FieldId::Name, FieldValue::Text("Walnut desk".into()))
        .expect("set name");
    form.set_item_field(i, FieldId::Price, FieldValue::Currency(85.0))
        .expect("set price");
    form.items[i].photo = Some(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02]);
    form
}

/// Everything survives a save/load round-trip, photo bytes included.
#[test]
fn test_save_load_roundtrip() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());
    let form = sample_form();

    let id = store
        .save(None, &default_draft_name(&form), &form)
        .expect("save");
    let (loaded, mode) = store.load(&id).expect("load");

    assert_eq!(mode, Mode::Manual);
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].values.name, "Walnut desk");
    assert_eq!(loaded.items[0].values.price, 85.0);
    assert_eq!(
        loaded.items[0].photo,
        Some(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02])
    );
    assert!(loaded.enabled_fields.is_enabled(FieldId::Quantity));

    match loaded.consigner {
        Consigner::New { name, phone, .. } => {
            assert_eq!(name, "Jane Doe");
            assert_eq!(phone, "317-555-0101");
        }
        other => panic!("unexpected consigner: {:?}", other),
    }
}

/// An existing-account consigner round-trips with its lookup flags.
#[test]
fn test_existing_consigner_roundtrip() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());

    let mut form = FormState::new();
    form.mode = Mode::Detection;
    form.consigner = Consigner::Existing {
        account_number: "6732".into(),
        lookup: None,
        search_failed: true,
    };
    form.starting_item_number = 14;

    let id = store.save(None, "6732", &form).expect("save");
    let (loaded, _) = store.load(&id).expect("load");

    assert_eq!(loaded.starting_item_number, 14);
    match loaded.consigner {
        Consigner::Existing { account_number, search_failed, .. } => {
            assert_eq!(account_number, "6732");
            assert!(search_failed);
        }
        other => panic!("unexpected consigner: {:?}", other),
    }
}

/// Saving twice under the same id overwrites instead of duplicating.
#[test]
fn test_overwrite_keeps_single_record() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());
    let mut form = sample_form();

    let id = store.save(None, "Jane Doe", &form).expect("save");
    form.set_item_field(0, FieldId::Price, FieldValue::Currency(95.0))
        .expect("set price");
    let id2 = store.save(Some(&id), "Jane Doe", &form).expect("resave");

    assert_eq!(id, id2);
    let drafts = store.list().expect("list");
    assert_eq!(drafts.len(), 1);

    let (loaded, _) = store.load(&id).expect("load");
    assert_eq!(loaded.items[0].values.price, 95.0);
}

/// Expired drafts vanish from the list and can no longer be loaded.
#[test]
fn test_zero_retention_expires_on_list() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::with_retention(dir.path(), 0);
    let form = sample_form();

    let id = store.save(None, "Jane Doe", &form).expect("save");
    assert!(store.load(&id).is_ok());

    let drafts = store.list().expect("list");
    assert!(drafts.is_empty());

    let err = store.load(&id).expect_err("expired");
    assert!(matches!(err, IntakeError::DraftNotFound(_)));
}

/// The list is ordered most recently updated first.
#[test]
fn test_list_order() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());
    let form = sample_form();

    let first = store.save(None, "first", &form).expect("save");
    std::thread::sleep(std::time::Duration::from_millis(20));
    let second = store.save(None, "second", &form).expect("save");
    std::thread::sleep(std::time::Duration::from_millis(20));
    store.save(Some(&first), "first", &form).expect("resave");

    let drafts = store.list().expect("list");
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].id, first);
    assert_eq!(drafts[1].id, second);
}

/// Delete reports whether a record actually existed.
#[test]
fn test_delete() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());
    let form = sample_form();

    let id = store.save(None, "Jane Doe", &form).expect("save");
    assert!(store.delete(&id).expect("delete"));
    assert!(!store.delete(&id).expect("second delete"));
    assert!(store.list().expect("list").is_empty());
}

/// A corrupt file in the store directory is skipped, not fatal.
#[test]
fn test_corrupt_record_skipped() {
    let dir = tempdir().expect("temp dir");
    let store = DraftStore::new(dir.path());
    let form = sample_form();

    store.save(None, "Jane Doe", &form).expect("save");
    std::fs::write(dir.path().join("broken.json"), b"{ not json").expect("write");

    let drafts = store.list().expect("list");
    assert_eq!(drafts.len(), 1);
}

/// Draft names default to the consigner, falling back to a timestamp.
#[test]
fn test_default_draft_name() {
    let form = sample_form();
    assert_eq!(default_draft_name(&form), "Jane Doe");

    let blank = FormState::new();
    assert!(default_draft_name(&blank).starts_with("Intake "));
}
