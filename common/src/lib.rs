//! Consign Intake Common Library
//!
//! Types and utilities shared between the CLI binary and tests:
//! - adapter data types (bounding boxes, account lookup, email extraction)
//! - the static field catalog
//! - lenient JSON parsing for model responses

pub mod error;
pub mod fields;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use fields::{catalog, field_def, EnabledFields, FieldDef, FieldId, FieldKind};
pub use parser::{extract_json, parse_boxes_response, parse_intake_response};
pub use types::{
    AccountItem, AccountSummary, BoundingBox, ExtractedIntake, ExtractedItem,
};
