//! Draft store
//!
//! One JSON file per draft under the store directory. Photo bytes are
//! base64-encoded on the way in and decoded on the way out; the encoded
//! form never leaks into in-memory state. Expiry is applied lazily when
//! the draft list is read.

use crate::error::{IntakeError, Result};
use crate::form::{Consigner, FormState, Item, ItemValues, Mode};
use chrono::{DateTime, Duration, Utc};
use consign_common::fields::EnabledFields;
use consign_common::types::{AccountSummary, BoundingBox};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Serialized snapshot of a FormState, matching the persisted draft schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftData {
    form_values: Vec<ItemValues>,
    item_count: usize,
    /// item index -> base64 photo bytes
    item_images: BTreeMap<usize, String>,
    image: Option<String>,
    image_hash: Option<String>,
    boxes: Vec<BoundingBox>,
    detection_complete: bool,
    consigner_type: String,
    customer_name: String,
    customer_address: String,
    customer_phone: String,
    customer_notes: String,
    account_number: String,
    account_lookup: Option<AccountSummary>,
    search_failed: bool,
    enabled_fields: EnabledFields,
    starting_item_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DraftRecord {
    id: String,
    name: String,
    mode: Mode,
    form_data: DraftData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// One row of the draft list.
#[derive(Debug, Clone)]
pub struct DraftSummary {
    pub id: String,
    pub name: String,
    pub mode: Mode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct DraftStore {
    root: PathBuf,
    retention: Duration,
}

impl DraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
        }
    }

    pub fn with_retention(root: impl Into<PathBuf>, hours: i64) -> Self {
        Self {
            root: root.into(),
            retention: Duration::hours(hours),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Save a draft. Creates an id when none is given; saving twice with
    /// the same id overwrites rather than duplicates.
    pub fn save(&self, id: Option<&str>, name: &str, state: &FormState) -> Result<String> {
        std::fs::create_dir_all(&self.root)?;

        let id = match id {
            Some(id) => id.to_string(),
            None => mint_id(name),
        };
        let path = self.path_for(&id);
        let now = Utc::now();

        // an overwrite keeps the original creation timestamp
        let created_at = read_record(&path)
            .ok()
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let record = DraftRecord {
            id: id.clone(),
            name: name.to_string(),
            mode: state.mode,
            form_data: DraftData::from_state(state),
            created_at,
            updated_at: now,
        };

        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &record)?;
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<(FormState, Mode)> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(IntakeError::DraftNotFound(id.to_string()));
        }

        let record = read_record(&path)?;
        let mode = record.mode;
        let state = record.form_data.into_state(mode)?;
        Ok((state, mode))
    }

    /// List drafts, most recently updated first. Records older than the
    /// retention window are purged before the list is built.
    pub fn list(&self) -> Result<Vec<DraftSummary>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let cutoff = Utc::now() - self.retention;
        let mut summaries = Vec::new();

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let record = match read_record(&path) {
                Ok(record) => record,
                // unreadable records are skipped, not fatal
                Err(_) => continue,
            };

            if record.updated_at < cutoff {
                std::fs::remove_file(&path).ok();
                continue;
            }

            summaries.push(DraftSummary {
                id: record.id,
                name: record.name,
                mode: record.mode,
                created_at: record.created_at,
                updated_at: record.updated_at,
            });
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    /// Returns true when a record was actually removed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn read_record(path: &Path) -> Result<DraftRecord> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let record = serde_json::from_reader(reader)?;
    Ok(record)
}

fn mint_id(name: &str) -> String {
    let now = Utc::now();
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), &digest[..8])
}

/// Display name for a draft: consigner name, else account number, else a
/// timestamp.
pub fn default_draft_name(state: &FormState) -> String {
    state
        .consigner
        .display_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Intake {}", Utc::now().format("%Y-%m-%d %H:%M")))
}

impl DraftData {
    fn from_state(state: &FormState) -> Self {
        let item_images = state
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                item.photo.as_deref().map(|bytes| (i, BASE64.encode(bytes)))
            })
            .collect();

        let (consigner_type, customer, account_number, account_lookup, search_failed) =
            match &state.consigner {
                Consigner::New {
                    name,
                    address,
                    phone,
                    notes,
                } => (
                    "new",
                    (name.clone(), address.clone(), phone.clone(), notes.clone()),
                    String::new(),
                    None,
                    false,
                ),
                Consigner::Existing {
                    account_number,
                    lookup,
                    search_failed,
                } => (
                    "existing",
                    Default::default(),
                    account_number.clone(),
                    lookup.clone(),
                    *search_failed,
                ),
            };

        Self {
            form_values: state.items.iter().map(|item| item.values.clone()).collect(),
            item_count: state.items.len(),
            item_images,
            image: state.image.as_deref().map(|bytes| BASE64.encode(bytes)),
            image_hash: state.image_hash.clone(),
            boxes: state.boxes.clone(),
            detection_complete: state.detection_complete,
            consigner_type: consigner_type.to_string(),
            customer_name: customer.0,
            customer_address: customer.1,
            customer_phone: customer.2,
            customer_notes: customer.3,
            account_number,
            account_lookup,
            search_failed,
            enabled_fields: state.enabled_fields.clone(),
            starting_item_number: state.starting_item_number,
        }
    }

    fn into_state(self, mode: Mode) -> Result<FormState> {
        let mut items: Vec<Item> = self
            .form_values
            .into_iter()
            .map(|values| Item {
                values,
                photo: None,
            })
            .collect();

        for (index, encoded) in self.item_images {
            let bytes = BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| IntakeError::DraftDecode(format!("item photo {}: {}", index, e)))?;
            if let Some(item) = items.get_mut(index) {
                item.photo = Some(bytes);
            }
        }

        let image = match self.image {
            Some(encoded) => Some(
                BASE64
                    .decode(encoded.as_bytes())
                    .map_err(|e| IntakeError::DraftDecode(format!("image: {}", e)))?,
            ),
            None => None,
        };

        let consigner = if self.consigner_type == "existing" {
            Consigner::Existing {
                account_number: self.account_number,
                lookup: self.account_lookup,
                search_failed: self.search_failed,
            }
        } else {
            Consigner::New {
                name: self.customer_name,
                address: self.customer_address,
                phone: self.customer_phone,
                notes: self.customer_notes,
            }
        };

        Ok(FormState {
            mode,
            consigner,
            items,
            enabled_fields: self.enabled_fields,
            had_active_input: image.is_some(),
            image,
            image_hash: self.image_hash,
            boxes: self.boxes,
            detection_complete: self.detection_complete,
            starting_item_number: self.starting_item_number,
            pending_photo: None,
            email: Default::default(),
        })
    }
}
