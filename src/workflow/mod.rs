//! Workflow controller
//!
//! An explicit state machine over the session's FormState. Transitions are
//! driven by discrete actions; adapter calls happen outside the controller
//! and their results come back in as actions (LookupSucceeded,
//! DetectionReady, ...), so every transition is a total, synchronous
//! function. Actions that are not meaningful on the current screen leave
//! the state unchanged — the front end simply never offers them.

use crate::detect::{crop_to_jpeg, decode_image};
use crate::email::{ThreadBody, ThreadSummary};
use crate::error::Result;
use crate::form::{Consigner, FieldValue, FormState, Item, ItemStatus, Mode};
use consign_common::fields::FieldId;
use consign_common::types::{AccountSummary, BoundingBox, ExtractedIntake};

/// What the user is currently looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ModeSelect,
    ConsignerEntry,
    ItemEntry,
    EmailQueue,
    EmailThreadSelected,
    EmailParsed,
    Review,
    Done,
}

/// A discrete user interaction or adapter result.
#[derive(Debug, Clone)]
pub enum Action {
    SelectMode(Mode),

    // consigner identification
    SwitchToNewConsigner,
    SwitchToExistingConsigner,
    SetNewConsigner {
        name: String,
        address: String,
        phone: String,
        notes: String,
    },
    SetAccountNumber(String),
    LookupSucceeded(AccountSummary),
    LookupFailed(String),
    ConfirmConsigner,

    // image capture and detection
    ImageSupplied(Vec<u8>),
    ImageCleared,
    DetectionReady(Vec<BoundingBox>),
    DetectionFailed(String),

    // item editing
    AddItem { with_photo: bool },
    PhotoSupplied(Vec<u8>),
    CancelPhoto,
    RemoveLastItem,
    SetField {
        index: usize,
        field: FieldId,
        value: FieldValue,
    },
    ToggleField(FieldId),

    // email import
    ThreadsListed(Vec<ThreadSummary>),
    ThreadSelected(ThreadBody),
    ParseSucceeded(ExtractedIntake),
    ParseFailed(String),
    AcceptExtracted,

    // navigation
    GoToReview,
    BackToItems,
    Finish,
    StartOver,
}

pub struct Controller {
    pub form: FormState,
    screen: Screen,
    notice: Option<String>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            form: FormState::new(),
            screen: Screen::ModeSelect,
            notice: None,
        }
    }

    /// Resume from a loaded draft. Lands on item entry (or mode selection
    /// when the draft never got that far).
    pub fn resume(form: FormState) -> Self {
        let screen = if form.mode == Mode::Unselected {
            Screen::ModeSelect
        } else {
            Screen::ItemEntry
        };
        Self {
            form,
            screen,
            notice: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Inline message from the last transition, if any. Reading clears it.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Item entry can only be left once every pending photo is resolved
    /// and at least one item exists.
    pub fn can_review(&self) -> bool {
        !self.form.items.is_empty() && self.form.pending_photo.is_none()
    }

    /// Apply one action. Total: any action not meaningful on the current
    /// screen is a no-op.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        match (self.screen, action) {
            (Screen::ModeSelect, Action::SelectMode(mode)) if mode != Mode::Unselected => {
                self.form.mode = mode;
                self.screen = match mode {
                    Mode::EmailImport => Screen::EmailQueue,
                    _ => Screen::ConsignerEntry,
                };
            }

            // --- consigner identification -----------------------------
            (Screen::ConsignerEntry, Action::SwitchToNewConsigner) => {
                // switching modes discards lookup results and entered fields
                if !self.form.consigner.is_new() {
                    self.form.consigner = Consigner::default();
                    self.form.starting_item_number = 0;
                }
            }
            (Screen::ConsignerEntry, Action::SwitchToExistingConsigner) => {
                if self.form.consigner.is_new() {
                    self.form.consigner = Consigner::new_existing();
                    self.form.starting_item_number = 0;
                }
            }
            (Screen::ConsignerEntry | Screen::Review, Action::SetNewConsigner { name, address, phone, notes }) => {
                if self.form.consigner.is_new() {
                    self.form.consigner = Consigner::New { name, address, phone, notes };
                }
            }
            (Screen::ConsignerEntry, Action::SetAccountNumber(number)) => {
                if let Consigner::Existing { account_number, lookup, search_failed } =
                    &mut self.form.consigner
                {
                    if *account_number != number {
                        *account_number = number;
                        *lookup = None;
                        *search_failed = false;
                        self.form.starting_item_number = 0;
                    }
                }
            }
            (Screen::ConsignerEntry, Action::LookupSucceeded(summary)) => {
                if let Consigner::Existing { lookup, search_failed, .. } =
                    &mut self.form.consigner
                {
                    self.form.starting_item_number = summary.next_item_number;
                    *lookup = Some(summary);
                    *search_failed = false;
                }
            }
            (Screen::ConsignerEntry, Action::LookupFailed(message)) => {
                if let Consigner::Existing { lookup, search_failed, .. } =
                    &mut self.form.consigner
                {
                    // account number as typed stands as a manual fallback
                    *lookup = None;
                    *search_failed = true;
                    self.notice = Some(message);
                }
            }
            (Screen::ConsignerEntry, Action::ConfirmConsigner) => {
                self.screen = Screen::ItemEntry;
            }

            // --- image capture and detection ---------------------------
            (Screen::ItemEntry, Action::ImageSupplied(bytes)) => {
                if self.form.mode == Mode::Detection {
                    self.form.process_new_image(bytes);
                }
            }
            (Screen::ItemEntry, Action::ImageCleared) => {
                if self.form.mode == Mode::Detection && self.form.clear_input() {
                    self.notice = Some("Photo removed; detection results cleared.".into());
                }
            }
            (Screen::ItemEntry, Action::DetectionReady(boxes)) => {
                self.apply_detection(boxes)?;
            }
            (Screen::ItemEntry, Action::DetectionFailed(message)) => {
                // form state is left at its pre-call value
                self.notice = Some(message);
            }

            // --- item editing -------------------------------------------
            (Screen::ItemEntry, Action::AddItem { with_photo }) => {
                self.form.add_item(with_photo);
            }
            (Screen::ItemEntry, Action::PhotoSupplied(bytes)) => {
                self.form.attach_pending_photo(bytes);
            }
            (Screen::ItemEntry, Action::CancelPhoto) => {
                self.form.cancel_pending_photo();
            }
            (Screen::ItemEntry, Action::RemoveLastItem) => {
                self.form.remove_last_item();
            }
            (Screen::ItemEntry | Screen::Review, Action::SetField { index, field, value }) => {
                self.form.set_item_field(index, field, value)?;
            }
            (Screen::ItemEntry, Action::ToggleField(field)) => {
                self.form.enabled_fields.toggle(field);
            }

            // --- email import -------------------------------------------
            (Screen::EmailQueue, Action::ThreadsListed(threads)) => {
                self.form.email.threads = threads;
            }
            (Screen::EmailQueue, Action::ThreadSelected(body)) => {
                self.form.email.selected = Some(body);
                self.screen = Screen::EmailThreadSelected;
            }
            (Screen::EmailThreadSelected, Action::ParseSucceeded(intake)) => {
                self.form.email.extracted = Some(intake);
                self.screen = Screen::EmailParsed;
            }
            (Screen::EmailThreadSelected, Action::ParseFailed(message)) => {
                // stay here; the front end offers an explicit retry
                self.notice = Some(message);
            }
            (Screen::EmailParsed, Action::AcceptExtracted) => {
                self.accept_extracted();
                self.screen = Screen::ItemEntry;
            }

            // --- navigation ---------------------------------------------
            (Screen::ItemEntry, Action::GoToReview) => {
                if self.can_review() {
                    self.screen = Screen::Review;
                }
            }
            (Screen::Review, Action::BackToItems) => {
                // leaving review preserves all form state
                self.screen = Screen::ItemEntry;
            }
            (Screen::Review, Action::Finish) => {
                self.screen = Screen::Done;
            }
            (_, Action::StartOver) => {
                self.form = FormState::new();
                self.screen = Screen::ModeSelect;
            }

            // anything else is not offered on this screen
            _ => {}
        }

        Ok(())
    }

    /// Detection results for the current image. Zero candidate boxes still
    /// produce exactly one item backed by the whole photo; the user is
    /// never left with an empty list after supplying one.
    fn apply_detection(&mut self, boxes: Vec<BoundingBox>) -> Result<()> {
        if self.form.detection_complete {
            // unchanged image hash: results are already cached
            return Ok(());
        }
        let Some(image_bytes) = self.form.image.clone() else {
            return Ok(());
        };

        let mut items = Vec::new();
        if !boxes.is_empty() {
            let img = decode_image(&image_bytes)?;
            for bbox in &boxes {
                if let Some(jpeg) = crop_to_jpeg(&img, bbox)? {
                    items.push(Item::with_photo(jpeg));
                }
            }
        }
        if items.is_empty() {
            items.push(Item::with_photo(image_bytes));
        }

        self.form.items = items;
        self.form.boxes = boxes;
        self.form.detection_complete = true;
        Ok(())
    }

    /// Materialize one item per extracted candidate whose status is not
    /// "rejected". Customer details fill the consigner block when it is
    /// still blank.
    fn accept_extracted(&mut self) {
        let Some(intake) = self.form.email.extracted.clone() else {
            return;
        };

        for extracted in intake.items.iter().filter(|item| !item.is_rejected()) {
            let index = self.form.add_item(false);
            if let Some(item) = self.form.items.get_mut(index) {
                item.values.name = extracted.name.trim().to_string();
                item.values.notes = extracted.notes.clone();
                item.values.quantity = extracted.quantity.max(1);
                item.values.status = ItemStatus::Accept;
                item.values.price = 0.0;
            }
        }

        if let Consigner::New { name, address, phone, .. } = &mut self.form.consigner {
            if name.trim().is_empty() {
                *name = intake.customer_name.clone();
            }
            if address.trim().is_empty() {
                *address = intake.customer_address.clone();
            }
            if phone.trim().is_empty() {
                *phone = intake.customer_phone.clone();
            }
        }
    }
}
