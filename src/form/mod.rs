//! Session form state
//!
//! The single source of truth for one intake session. Every workflow
//! transition reads and writes this value; nothing is kept in transient
//! locals across interactions.

mod dimension;
mod item;

pub use dimension::normalize_dimensions;
pub use item::{FieldValue, Item, ItemStatus, ItemValues};

use crate::email::{ThreadBody, ThreadSummary};
use crate::error::{IntakeError, Result};
use consign_common::fields::{EnabledFields, FieldId};
use consign_common::types::{AccountSummary, BoundingBox, ExtractedIntake};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Top-level intake flow variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Unselected,
    Detection,
    Manual,
    EmailImport,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Unselected => "unselected",
            Mode::Detection => "detection",
            Mode::Manual => "manual",
            Mode::EmailImport => "email_import",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is dropping off the items. Exactly one variant is active; switching
/// discards the other variant's data entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Consigner {
    New {
        name: String,
        address: String,
        phone: String,
        notes: String,
    },
    Existing {
        /// As entered by staff. Stands as a manual fallback when lookup fails.
        account_number: String,
        lookup: Option<AccountSummary>,
        search_failed: bool,
    },
}

impl Default for Consigner {
    fn default() -> Self {
        Consigner::New {
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            notes: String::new(),
        }
    }
}

impl Consigner {
    pub fn new_existing() -> Self {
        Consigner::Existing {
            account_number: String::new(),
            lookup: None,
            search_failed: false,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Consigner::New { .. })
    }

    /// Preferred display name: consigner name, else account number.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Consigner::New { name, .. } if !name.trim().is_empty() => Some(name.trim()),
            Consigner::Existing { account_number, .. } if !account_number.trim().is_empty() => {
                Some(account_number.trim())
            }
            _ => None,
        }
    }

    pub fn account_number(&self) -> &str {
        match self {
            Consigner::Existing { account_number, .. } => account_number,
            Consigner::New { .. } => "",
        }
    }
}

/// Email-import scratch data. Not persisted with drafts; items materialized
/// from it are.
#[derive(Debug, Clone, Default)]
pub struct EmailScratch {
    pub threads: Vec<ThreadSummary>,
    pub selected: Option<ThreadBody>,
    pub extracted: Option<ExtractedIntake>,
}

/// In-memory representation of one intake session.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub mode: Mode,
    pub consigner: Consigner,
    pub items: Vec<Item>,
    pub enabled_fields: EnabledFields,
    /// Raw uploaded image bytes, if any.
    pub image: Option<Vec<u8>>,
    /// SHA-256 of `image`, used to debounce re-uploads of the same bytes.
    pub image_hash: Option<String>,
    pub boxes: Vec<BoundingBox>,
    pub detection_complete: bool,
    /// Whether this session ever had an active image input. Guards against
    /// a spurious reset on first render.
    pub had_active_input: bool,
    /// First item number on the receipt (from account lookup, else 0).
    pub starting_item_number: u32,
    /// Index of an item added with `with_photo` that has not received its
    /// photo yet. Blocks leaving item entry until resolved.
    pub pending_photo: Option<usize>,
    pub email: EmailScratch,
}

pub fn image_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear image, items, field values and workflow scratch data. Keeps
    /// the consigner, mode and enabled-field configuration.
    pub fn reset_all(&mut self) {
        self.items.clear();
        self.image = None;
        self.image_hash = None;
        self.boxes.clear();
        self.detection_complete = false;
        self.had_active_input = false;
        self.pending_photo = None;
        self.email = EmailScratch::default();
    }

    /// Append a new item at the next index. With `with_photo`, the item
    /// enters a pending-photo sub-step that blocks progression until a
    /// photo is supplied or the addition is cancelled.
    pub fn add_item(&mut self, with_photo: bool) -> usize {
        let index = self.items.len();
        self.items.push(Item::default());
        if with_photo {
            self.pending_photo = Some(index);
        }
        index
    }

    /// Remove the highest-index item along with its photo and field values.
    /// No-op when there are no items.
    pub fn remove_last_item(&mut self) {
        if self.items.pop().is_some() {
            if self.pending_photo == Some(self.items.len()) {
                self.pending_photo = None;
            }
        }
    }

    /// Attach a photo to the item awaiting one.
    pub fn attach_pending_photo(&mut self, photo: Vec<u8>) {
        if let Some(index) = self.pending_photo.take() {
            if let Some(item) = self.items.get_mut(index) {
                item.photo = Some(photo);
            }
        }
    }

    /// Cancel a pending photo addition. The just-added item is removed only
    /// if it was never given a name; an item with user-entered data is
    /// never silently discarded.
    pub fn cancel_pending_photo(&mut self) {
        if let Some(index) = self.pending_photo.take() {
            if index + 1 == self.items.len() && !self.items[index].has_name() {
                self.items.pop();
            }
        }
    }

    /// Store a field value on an item, typed and clamped per the catalog.
    pub fn set_item_field(&mut self, index: usize, field: FieldId, value: FieldValue) -> Result<()> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(IntakeError::ItemIndex(index))?;
        item.values.set(field, value);
        Ok(())
    }

    /// Register a newly uploaded image. An image hashing identically to the
    /// current one is treated as "no new input" so that re-fired uploads on
    /// unrelated interactions do not reset detection results.
    ///
    /// Returns true when the image actually changed.
    pub fn process_new_image(&mut self, bytes: Vec<u8>) -> bool {
        let new_hash = image_hash(&bytes);
        self.had_active_input = true;

        if self.image_hash.as_deref() == Some(new_hash.as_str()) {
            return false;
        }

        self.items.clear();
        self.boxes.clear();
        self.detection_complete = false;
        self.pending_photo = None;
        self.image_hash = Some(new_hash);
        self.image = Some(bytes);
        true
    }

    /// The user removed the uploaded file. Triggers a full reset only when
    /// the session previously had active input.
    ///
    /// Returns true when a reset happened.
    pub fn clear_input(&mut self) -> bool {
        if self.had_active_input && self.image.is_some() {
            self.reset_all();
            true
        } else {
            false
        }
    }

    /// Detection for the current image is still outstanding.
    pub fn needs_detection(&self) -> bool {
        self.mode == Mode::Detection && self.image.is_some() && !self.detection_complete
    }

    fn status_enabled(&self) -> bool {
        self.enabled_fields.is_enabled(FieldId::Status)
    }

    /// Items that appear on the final documents.
    pub fn included_items(&self) -> impl Iterator<Item = &Item> {
        let status_enabled = self.status_enabled();
        self.items
            .iter()
            .filter(move |item| !status_enabled || item.included())
    }

    /// Count of accepted items when the status field is enabled, else the
    /// count of all items.
    pub fn accepted_count(&self) -> usize {
        self.included_items().count()
    }

    /// Sum of quantities over included items; 1 per item when the quantity
    /// field is disabled.
    pub fn total_quantity(&self) -> u32 {
        let quantity_enabled = self.enabled_fields.is_enabled(FieldId::Quantity);
        self.included_items()
            .map(|item| if quantity_enabled { item.values.quantity } else { 1 })
            .sum()
    }

    /// Sum of prices over included items.
    pub fn total_value(&self) -> f64 {
        self.included_items().map(|item| item.values.price).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_keeps_indices_dense() {
        let mut form = FormState::new();
        let a = form.add_item(false);
        let b = form.add_item(false);
        assert_eq!((a, b), (0, 1));

        form.remove_last_item();
        assert_eq!(form.items.len(), 1);
        assert_eq!(form.add_item(false), 1);
    }

    #[test]
    fn test_remove_last_item_on_empty_is_noop() {
        let mut form = FormState::new();
        form.remove_last_item();
        assert!(form.items.is_empty());
    }

    #[test]
    fn test_set_item_field_out_of_range() {
        let mut form = FormState::new();
        form.add_item(false);
        let err = form
            .set_item_field(3, FieldId::Name, FieldValue::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, IntakeError::ItemIndex(3)));
    }

    #[test]
    fn test_same_image_hash_is_noop() {
        let mut form = FormState::new();
        form.mode = Mode::Detection;

        assert!(form.process_new_image(b"photo-bytes".to_vec()));
        form.boxes = vec![BoundingBox::from([0, 0, 10, 10])];
        form.detection_complete = true;
        form.add_item(false);

        // same bytes again: detection results untouched
        assert!(!form.process_new_image(b"photo-bytes".to_vec()));
        assert!(form.detection_complete);
        assert_eq!(form.items.len(), 1);

        // different bytes: full re-detection
        assert!(form.process_new_image(b"other-bytes".to_vec()));
        assert!(!form.detection_complete);
        assert!(form.items.is_empty());
    }

    #[test]
    fn test_clear_input_requires_prior_active_input() {
        let mut form = FormState::new();
        assert!(!form.clear_input());

        form.process_new_image(b"photo".to_vec());
        assert!(form.clear_input());
        assert!(form.image.is_none());
        assert!(!form.had_active_input);
    }

    #[test]
    fn test_cancel_pending_photo_discards_only_unnamed() {
        let mut form = FormState::new();
        form.add_item(true);
        form.cancel_pending_photo();
        assert!(form.items.is_empty());

        let index = form.add_item(true);
        form.set_item_field(index, FieldId::Name, FieldValue::Text("Named".into()))
            .unwrap();
        form.cancel_pending_photo();
        assert_eq!(form.items.len(), 1);
        assert!(form.pending_photo.is_none());
    }

    #[test]
    fn test_accepted_count_with_status_disabled() {
        let mut form = FormState::new();
        form.add_item(false);
        form.add_item(false);
        form.set_item_field(0, FieldId::Status, FieldValue::Select("Reject".into()))
            .unwrap();
        assert_eq!(form.accepted_count(), 1);

        form.enabled_fields.disable(FieldId::Status);
        assert_eq!(form.accepted_count(), 2);
    }

    #[test]
    fn test_total_quantity_disabled_equals_accepted_count() {
        let mut form = FormState::new();
        for qty in ["2", "1", "3"] {
            let i = form.add_item(false);
            form.set_item_field(i, FieldId::Quantity, FieldValue::Text(qty.into()))
                .unwrap();
        }
        let rejected = form.add_item(false);
        form.set_item_field(rejected, FieldId::Quantity, FieldValue::Count(5))
            .unwrap();
        form.set_item_field(rejected, FieldId::Status, FieldValue::Select("Reject".into()))
            .unwrap();

        // quantity disabled: one per included item
        assert_eq!(form.total_quantity(), 3);

        // quantity enabled: sum over included items only
        form.enabled_fields.enable(FieldId::Quantity);
        assert_eq!(form.total_quantity(), 6);
    }
}
