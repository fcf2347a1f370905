//! Adapter data types
//!
//! Shared by the workflow controller and the external adapters:
//! - BoundingBox: item detection output
//! - AccountSummary: commerce platform lookup output
//! - ExtractedIntake: email extraction output

use serde::{Deserialize, Serialize};

/// One detected item region, in image pixel coordinates.
///
/// Persisted and exchanged as a `[x1, y1, x2, y2]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl From<[u32; 4]> for BoundingBox {
    fn from(v: [u32; 4]) -> Self {
        Self { x1: v[0], y1: v[1], x2: v[2], y2: v[3] }
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl BoundingBox {
    /// Clamp to an image of the given dimensions.
    ///
    /// Returns `(x, y, width, height)` with width/height of at least one
    /// pixel, or `None` when the box lies entirely outside the image.
    pub fn clamped(&self, img_width: u32, img_height: u32) -> Option<(u32, u32, u32, u32)> {
        if img_width == 0 || img_height == 0 {
            return None;
        }
        let x1 = self.x1.min(self.x2);
        let y1 = self.y1.min(self.y2);
        if x1 >= img_width || y1 >= img_height {
            return None;
        }
        let x2 = self.x1.max(self.x2).min(img_width);
        let y2 = self.y1.max(self.y2).min(img_height);
        let w = (x2 - x1).max(1).min(img_width - x1);
        let h = (y2 - y1).max(1).min(img_height - y1);
        Some((x1, y1, w, h))
    }
}

/// One product variant found under a consigner account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountItem {
    pub sku: String,
    pub item_number: u32,
    pub price: String,
    pub title: String,
    pub qty: i64,
}

/// Result of looking up an existing consigner's account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSummary {
    pub account_number: String,
    pub highest_item_number: u32,
    pub next_item_number: u32,
    pub total_items: usize,
    /// Sorted ascending by item number.
    pub items: Vec<AccountItem>,
}

/// One pre-approved item extracted from an email conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedItem {
    pub name: String,
    /// Free-text status as written in the conversation ("approved",
    /// "rejected", "pending", ...). Anything but "rejected" is materialized.
    pub status: String,
    pub notes: String,
    pub quantity: u32,
}

impl ExtractedItem {
    pub fn is_rejected(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("rejected")
    }
}

/// Structured result of the email extraction step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedIntake {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub items: Vec<ExtractedItem>,
    pub pickup_required: bool,
    pub pickup_address: String,
    pub pickup_date: String,
    pub summary: String,
}
