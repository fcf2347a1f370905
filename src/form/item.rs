//! Item records and typed field values.

use consign_common::fields::{field_def, FieldId, FieldKind};
use serde::{Deserialize, Serialize};

use super::dimension::normalize_dimensions;

/// Inclusion flag deciding whether an item appears on the final documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Accept,
    Reject,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Accept => "Accept",
            ItemStatus::Reject => "Reject",
        }
    }
}

/// A value being written into one item field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Currency(f64),
    Count(u32),
    Select(String),
}

/// One optional slot per catalog field. Empty string means "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemValues {
    pub name: String,
    pub status: ItemStatus,
    pub price: f64,
    pub notes: String,
    pub quantity: u32,
    pub condition: String,
    pub dimensions: String,
}

impl Default for ItemValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: ItemStatus::Accept,
            price: 0.0,
            notes: String::new(),
            quantity: 1,
            condition: String::new(),
            dimensions: String::new(),
        }
    }
}

impl ItemValues {
    /// Store a value, typed and clamped per the field's declared kind.
    ///
    /// Out-of-range numerics are clamped rather than rejected; a select
    /// value that matches no option leaves the field unchanged.
    pub fn set(&mut self, field: FieldId, value: FieldValue) {
        match field {
            FieldId::Name => {
                if let Some(text) = value.into_text() {
                    self.name = text.trim().to_string();
                }
            }
            FieldId::Notes => {
                if let Some(text) = value.into_text() {
                    self.notes = text;
                }
            }
            FieldId::Price => {
                if let Some(amount) = value.into_currency() {
                    self.price = amount.max(0.0);
                }
            }
            FieldId::Quantity => {
                if let Some(count) = value.into_count() {
                    self.quantity = count.max(1);
                }
            }
            FieldId::Status => {
                if let Some(option) = match_option(field, &value) {
                    self.status = if option == "Reject" {
                        ItemStatus::Reject
                    } else {
                        ItemStatus::Accept
                    };
                }
            }
            FieldId::Condition => {
                if let Some(option) = match_option(field, &value) {
                    self.condition = option.to_string();
                }
            }
            FieldId::Dimensions => {
                if let Some(text) = value.into_text() {
                    self.dimensions = normalize_dimensions(&text);
                }
            }
        }
    }
}

/// Case-insensitive match against the field's option list.
fn match_option(field: FieldId, value: &FieldValue) -> Option<&'static str> {
    let raw = match value {
        FieldValue::Select(s) | FieldValue::Text(s) => s.trim(),
        _ => return None,
    };
    let FieldKind::Select(options) = field_def(field).kind else {
        return None;
    };
    options
        .iter()
        .find(|opt| opt.eq_ignore_ascii_case(raw))
        .copied()
}

impl FieldValue {
    fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(s) | FieldValue::Select(s) => Some(s),
            _ => None,
        }
    }

    fn into_currency(self) -> Option<f64> {
        match self {
            FieldValue::Currency(v) => Some(v),
            FieldValue::Text(s) => s.trim().trim_start_matches('$').parse().ok(),
            _ => None,
        }
    }

    fn into_count(self) -> Option<u32> {
        match self {
            FieldValue::Count(n) => Some(n),
            FieldValue::Currency(v) if v >= 0.0 => Some(v as u32),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One candidate object being logged, optionally backed by a photo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub values: ItemValues,
    /// Raw image bytes (JPEG/PNG). Base64 only at the persistence boundary.
    pub photo: Option<Vec<u8>>,
}

impl Item {
    pub fn with_photo(photo: Vec<u8>) -> Self {
        Self {
            values: ItemValues::default(),
            photo: Some(photo),
        }
    }

    pub fn has_name(&self) -> bool {
        !self.values.name.trim().is_empty()
    }

    pub fn included(&self) -> bool {
        self.values.status == ItemStatus::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_clamped_to_zero() {
        let mut values = ItemValues::default();
        values.set(FieldId::Price, FieldValue::Currency(-5.0));
        assert_eq!(values.price, 0.0);
        values.set(FieldId::Price, FieldValue::Currency(12.5));
        assert_eq!(values.price, 12.5);
    }

    #[test]
    fn test_price_from_text() {
        let mut values = ItemValues::default();
        values.set(FieldId::Price, FieldValue::Text("$25.50".into()));
        assert_eq!(values.price, 25.5);
        // unparseable input leaves the value unchanged
        values.set(FieldId::Price, FieldValue::Text("abc".into()));
        assert_eq!(values.price, 25.5);
    }

    #[test]
    fn test_quantity_clamped_to_one() {
        let mut values = ItemValues::default();
        values.set(FieldId::Quantity, FieldValue::Count(0));
        assert_eq!(values.quantity, 1);
        values.set(FieldId::Quantity, FieldValue::Text("4".into()));
        assert_eq!(values.quantity, 4);
    }

    #[test]
    fn test_status_select_case_insensitive() {
        let mut values = ItemValues::default();
        values.set(FieldId::Status, FieldValue::Select("reject".into()));
        assert_eq!(values.status, ItemStatus::Reject);
        // unknown option is ignored
        values.set(FieldId::Status, FieldValue::Select("maybe".into()));
        assert_eq!(values.status, ItemStatus::Reject);
    }

    #[test]
    fn test_condition_matches_catalog_option() {
        let mut values = ItemValues::default();
        values.set(FieldId::Condition, FieldValue::Select("like new".into()));
        assert_eq!(values.condition, "Like New");
    }

    #[test]
    fn test_name_trimmed() {
        let mut values = ItemValues::default();
        values.set(FieldId::Name, FieldValue::Text("  Oak dresser ".into()));
        assert_eq!(values.name, "Oak dresser");
    }

    #[test]
    fn test_dimensions_normalized() {
        let mut values = ItemValues::default();
        values.set(FieldId::Dimensions, FieldValue::Text("12 by 8.5 by 3 inches".into()));
        assert_eq!(values.dimensions, "12 x 8.5 x 3 in");
    }
}
