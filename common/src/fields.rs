//! Field catalog
//!
//! The static registry of optional item attributes. The set of fields is
//! fixed at compile time and shared by every session; per-session
//! configuration only toggles which optional fields are in use.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of one catalog field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Name,
    Status,
    Price,
    Notes,
    Quantity,
    Condition,
    Dimensions,
}

impl FieldId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Name => "name",
            FieldId::Status => "status",
            FieldId::Price => "price",
            FieldId::Notes => "notes",
            FieldId::Quantity => "quantity",
            FieldId::Condition => "condition",
            FieldId::Dimensions => "dimensions",
        }
    }
}

/// Value kind of a field. Determines input typing and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Multiline,
    /// Dollar amount, clamped to >= 0.
    Currency,
    /// Whole count, clamped to >= 1.
    Count,
    /// One of a fixed option list.
    Select(&'static [&'static str]),
    /// Freeform dimension string, normalized on input.
    Dimension,
}

pub const STATUS_OPTIONS: &[&str] = &["Accept", "Reject"];
pub const CONDITION_OPTIONS: &[&str] = &["New", "Like New", "Good", "Fair", "As-Is"];

/// One row of the field catalog.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub id: FieldId,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default_enabled: bool,
    /// Column header on the printed receipt.
    pub print_header: &'static str,
    /// Column width on the printed receipt (mm).
    pub print_width_mm: f32,
}

/// The catalog, in display order. Name is first and always enabled.
pub const CATALOG: &[FieldDef] = &[
    FieldDef {
        id: FieldId::Name,
        label: "Item name",
        kind: FieldKind::Text,
        required: true,
        default_enabled: true,
        print_header: "Title",
        print_width_mm: 56.0,
    },
    FieldDef {
        id: FieldId::Status,
        label: "Status",
        kind: FieldKind::Select(STATUS_OPTIONS),
        required: false,
        default_enabled: true,
        print_header: "Status",
        print_width_mm: 13.0,
    },
    FieldDef {
        id: FieldId::Price,
        label: "Price ($)",
        kind: FieldKind::Currency,
        required: false,
        default_enabled: true,
        print_header: "Price",
        print_width_mm: 17.0,
    },
    FieldDef {
        id: FieldId::Notes,
        label: "Notes",
        kind: FieldKind::Multiline,
        required: false,
        default_enabled: true,
        print_header: "Notes",
        print_width_mm: 0.0, // printed under the title, not as a column
    },
    FieldDef {
        id: FieldId::Quantity,
        label: "Quantity",
        kind: FieldKind::Count,
        required: false,
        default_enabled: false,
        print_header: "QTY",
        print_width_mm: 11.0,
    },
    FieldDef {
        id: FieldId::Condition,
        label: "Condition",
        kind: FieldKind::Select(CONDITION_OPTIONS),
        required: false,
        default_enabled: false,
        print_header: "Cond",
        print_width_mm: 17.0,
    },
    FieldDef {
        id: FieldId::Dimensions,
        label: "Dimensions",
        kind: FieldKind::Dimension,
        required: false,
        default_enabled: false,
        print_header: "Dims",
        print_width_mm: 22.0,
    },
];

/// The full catalog in display order.
pub fn catalog() -> &'static [FieldDef] {
    CATALOG
}

/// Look up one field definition.
pub fn field_def(id: FieldId) -> &'static FieldDef {
    // CATALOG covers every FieldId variant
    CATALOG
        .iter()
        .find(|d| d.id == id)
        .expect("field catalog covers all FieldId variants")
}

/// Which optional fields a session has switched on.
///
/// Name is implicitly always enabled and cannot be disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnabledFields(BTreeSet<FieldId>);

impl Default for EnabledFields {
    fn default() -> Self {
        Self(
            CATALOG
                .iter()
                .filter(|d| d.default_enabled)
                .map(|d| d.id)
                .collect(),
        )
    }
}

impl EnabledFields {
    pub fn is_enabled(&self, id: FieldId) -> bool {
        id == FieldId::Name || self.0.contains(&id)
    }

    pub fn enable(&mut self, id: FieldId) {
        self.0.insert(id);
    }

    /// Disabling the name field is a no-op.
    pub fn disable(&mut self, id: FieldId) {
        if id != FieldId::Name {
            self.0.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: FieldId) {
        if self.is_enabled(id) {
            self.disable(id);
        } else {
            self.enable(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_name_first_and_required() {
        assert_eq!(CATALOG[0].id, FieldId::Name);
        assert!(CATALOG[0].required);
        assert!(CATALOG.iter().filter(|d| d.required).count() == 1);
    }

    #[test]
    fn test_default_enabled_set() {
        let enabled = EnabledFields::default();
        assert!(enabled.is_enabled(FieldId::Name));
        assert!(enabled.is_enabled(FieldId::Status));
        assert!(enabled.is_enabled(FieldId::Price));
        assert!(enabled.is_enabled(FieldId::Notes));
        assert!(!enabled.is_enabled(FieldId::Quantity));
        assert!(!enabled.is_enabled(FieldId::Condition));
    }

    #[test]
    fn test_name_cannot_be_disabled() {
        let mut enabled = EnabledFields::default();
        enabled.disable(FieldId::Name);
        assert!(enabled.is_enabled(FieldId::Name));
        enabled.toggle(FieldId::Name);
        assert!(enabled.is_enabled(FieldId::Name));
    }

    #[test]
    fn test_toggle_roundtrip() {
        let mut enabled = EnabledFields::default();
        enabled.toggle(FieldId::Quantity);
        assert!(enabled.is_enabled(FieldId::Quantity));
        enabled.toggle(FieldId::Quantity);
        assert!(!enabled.is_enabled(FieldId::Quantity));
    }

    #[test]
    fn test_enabled_fields_serde() {
        let mut enabled = EnabledFields::default();
        enabled.enable(FieldId::Quantity);
        let json = serde_json::to_string(&enabled).unwrap();
        assert!(json.contains("\"quantity\""));
        let back: EnabledFields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, enabled);
    }

    #[test]
    fn test_field_def_lookup() {
        let def = field_def(FieldId::Price);
        assert_eq!(def.print_header, "Price");
        assert!(matches!(def.kind, FieldKind::Currency));
    }
}
