//! Interactive intake session
//!
//! Terminal front end over the workflow controller. Every prompt turns
//! into a controller action; adapter calls (lookup, detection, inbox,
//! extraction) run here and feed their results back as actions.

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::detect::{Detector, VisionDetector};
use crate::email::{extract_intake, GmailInbox, Inbox};
use crate::error::{IntakeError, Result};
use crate::export::export_documents;
use crate::form::{Consigner, FieldValue, ItemValues, Mode};
use crate::lookup::ShopifyLookup;
use crate::store::{default_draft_name, DraftStore};
use crate::workflow::{Action, Controller, Screen};
use consign_common::fields::{catalog, FieldDef, FieldId, FieldKind};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

pub struct Session {
    config: Config,
    controller: Controller,
    store: DraftStore,
    draft_id: Option<String>,
    output_dir: PathBuf,
    verbose: bool,
}

impl Session {
    pub fn new(config: Config, output_dir: PathBuf, verbose: bool) -> Result<Self> {
        let store = DraftStore::with_retention(Config::draft_dir()?, config.draft_retention_hours);
        Ok(Self {
            config,
            controller: Controller::new(),
            store,
            draft_id: None,
            output_dir,
            verbose,
        })
    }

    pub fn resume(config: Config, draft_id: &str, output_dir: PathBuf, verbose: bool) -> Result<Self> {
        let store = DraftStore::with_retention(Config::draft_dir()?, config.draft_retention_hours);
        let (form, _mode) = store.load(draft_id)?;
        println!("✔ Draft loaded: {}\n", draft_id);
        Ok(Self {
            config,
            controller: Controller::resume(form),
            store,
            draft_id: Some(draft_id.to_string()),
            output_dir,
            verbose,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            if let Some(notice) = self.controller.take_notice() {
                println!("⚠ {}", notice);
            }

            match self.controller.screen() {
                Screen::ModeSelect => self.mode_select()?,
                Screen::ConsignerEntry => self.consigner_entry().await?,
                Screen::ItemEntry => {
                    if self.item_entry()? {
                        return Ok(());
                    }
                }
                Screen::EmailQueue => self.email_queue().await?,
                Screen::EmailThreadSelected => self.email_thread()?,
                Screen::EmailParsed => self.email_parsed()?,
                Screen::Review => {
                    if self.review()? {
                        return Ok(());
                    }
                }
                Screen::Done => {
                    self.finish()?;
                    return Ok(());
                }
            }
        }
    }

    fn mode_select(&mut self) -> Result<()> {
        let modes = [
            "Photo detection (one photo of the drop-off)",
            "Manual entry",
            "Email import (pre-approved conversation)",
        ];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("How are the items coming in?")
            .items(&modes)
            .default(0)
            .interact()?;

        let mode = match choice {
            0 => Mode::Detection,
            1 => Mode::Manual,
            _ => Mode::EmailImport,
        };
        self.controller.apply(Action::SelectMode(mode))
    }

    async fn consigner_entry(&mut self) -> Result<()> {
        let kinds = ["New consigner", "Existing account"];
        let default = if self.controller.form.consigner.is_new() { 0 } else { 1 };
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Who is consigning?")
            .items(&kinds)
            .default(default)
            .interact()?;

        if choice == 0 {
            self.controller.apply(Action::SwitchToNewConsigner)?;
            let name = text_input("Name", "")?;
            let address = text_input("Address", "")?;
            let phone = text_input("Phone", "")?;
            let notes = text_input("Notes", "")?;
            self.controller.apply(Action::SetNewConsigner {
                name,
                address,
                phone,
                notes,
            })?;
        } else {
            self.controller.apply(Action::SwitchToExistingConsigner)?;
            let account = text_input("Account number", "")?;
            self.controller
                .apply(Action::SetAccountNumber(account.clone()))?;

            if !account.trim().is_empty() {
                self.lookup_account(account.trim()).await?;
            }

            // failed lookups fall back to a manually entered starting number
            if let Consigner::Existing { search_failed: true, .. } = &self.controller.form.consigner
            {
                let manual = text_input("Starting item number", "0")?;
                if let Ok(number) = manual.trim().parse::<u32>() {
                    self.controller.form.starting_item_number = number;
                }
            }
        }

        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Continue to item entry?")
            .default(true)
            .interact()?;
        if proceed {
            self.controller.apply(Action::ConfirmConsigner)?;
        }
        Ok(())
    }

    async fn lookup_account(&mut self, account: &str) -> Result<()> {
        let lookup = match ShopifyLookup::from_config(&self.config) {
            Ok(lookup) => lookup,
            Err(IntakeError::MissingShopifyCredentials) => {
                println!("⚠ Store credentials not configured; skipping account lookup.");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let pb = spinner("Looking up account...");
        let result = lookup.search_account(account).await;
        pb.finish_and_clear();

        match result {
            Ok(summary) => {
                println!(
                    "✔ Account {}: {} items on file, next item #{}",
                    summary.account_number, summary.total_items, summary.next_item_number
                );
                self.controller.apply(Action::LookupSucceeded(summary))
            }
            Err(e) => self
                .controller
                .apply(Action::LookupFailed(format!("Account lookup failed: {}", e))),
        }
    }

    /// Item entry menu. Returns true when the user chose to save and quit.
    fn item_entry(&mut self) -> Result<bool> {
        if self.controller.form.mode == Mode::Detection && self.controller.form.image.is_none() {
            if let Some(bytes) =
                prompt_photo("Photo of the drop-off (file or folder path, empty to skip)")?
            {
                self.controller.apply(Action::ImageSupplied(bytes))?;
            }
        }
        if self.controller.form.needs_detection() {
            self.run_detection()?;
        }

        print_items(&self.controller);

        let mut menu: Vec<&str> = vec!["Add an item", "Add an item with photo"];
        if !self.controller.form.items.is_empty() {
            menu.push("Edit an item");
            menu.push("Remove the last item");
        }
        menu.push("Toggle optional fields");
        if self.controller.form.mode == Mode::Detection {
            menu.push("Replace the drop-off photo");
            if self.controller.form.image.is_some() {
                menu.push("Remove the drop-off photo");
            }
        }
        menu.push("Save draft");
        if self.controller.can_review() {
            menu.push("Continue to review");
        }
        menu.push("Start over");
        menu.push("Save draft & quit");

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Item entry")
            .items(&menu)
            .default(0)
            .interact()?;

        match menu[choice] {
            "Add an item" => {
                self.controller.apply(Action::AddItem { with_photo: false })?;
                let index = self.controller.form.items.len() - 1;
                self.edit_fields(index)?;
            }
            "Add an item with photo" => {
                self.controller.apply(Action::AddItem { with_photo: true })?;
                match prompt_photo("Item photo (file or folder path, empty to cancel)")? {
                    Some(bytes) => {
                        self.controller.apply(Action::PhotoSupplied(bytes))?;
                        let index = self.controller.form.items.len() - 1;
                        self.edit_fields(index)?;
                    }
                    None => self.controller.apply(Action::CancelPhoto)?,
                }
            }
            "Edit an item" => {
                if let Some(index) = self.pick_item()? {
                    self.edit_fields(index)?;
                }
            }
            "Remove the last item" => {
                self.controller.apply(Action::RemoveLastItem)?;
            }
            "Toggle optional fields" => self.toggle_fields()?,
            "Replace the drop-off photo" => {
                if let Some(bytes) =
                    prompt_photo("New photo of the drop-off (file or folder path)")?
                {
                    self.controller.apply(Action::ImageSupplied(bytes))?;
                    if self.controller.form.needs_detection() {
                        self.run_detection()?;
                    }
                }
            }
            "Remove the drop-off photo" => {
                self.controller.apply(Action::ImageCleared)?;
            }
            "Save draft" => self.save_draft()?,
            "Continue to review" => self.controller.apply(Action::GoToReview)?,
            "Start over" => {
                let sure = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Discard everything and start over?")
                    .default(false)
                    .interact()?;
                if sure {
                    self.controller.apply(Action::StartOver)?;
                }
            }
            "Save draft & quit" => {
                self.save_draft()?;
                return Ok(true);
            }
            _ => {}
        }

        Ok(false)
    }

    fn run_detection(&mut self) -> Result<()> {
        let Some(bytes) = self.controller.form.image.clone() else {
            return Ok(());
        };

        let detector = VisionDetector::new(self.verbose);
        let pb = spinner("Detecting items in the photo...");
        let result = detector.detect(&bytes, self.config.detection_confidence);
        pb.finish_and_clear();

        match result {
            Ok(boxes) => {
                println!("✔ {} item(s) detected", boxes.len().max(1));
                self.controller.apply(Action::DetectionReady(boxes))
            }
            Err(e) => self
                .controller
                .apply(Action::DetectionFailed(format!("Detection failed: {}", e))),
        }
    }

    fn pick_item(&self) -> Result<Option<usize>> {
        let items = &self.controller.form.items;
        if items.is_empty() {
            return Ok(None);
        }

        let labels: Vec<String> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let name = if item.has_name() {
                    item.values.name.as_str()
                } else {
                    "(unnamed)"
                };
                let photo = if item.photo.is_some() { " 📷" } else { "" };
                format!("{}. {}{}", i + 1, name, photo)
            })
            .collect();

        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which item?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(Some(index))
    }

    /// Prompt for every enabled field of one item, prefilled with its
    /// current values.
    fn edit_fields(&mut self, index: usize) -> Result<()> {
        for def in catalog() {
            if !self.controller.form.enabled_fields.is_enabled(def.id) {
                continue;
            }

            let current = {
                let item = self
                    .controller
                    .form
                    .items
                    .get(index)
                    .ok_or(IntakeError::ItemIndex(index))?;
                current_text(&item.values, def.id)
            };

            let value = match def.kind {
                FieldKind::Select(options) => {
                    let default = options.iter().position(|o| *o == current).unwrap_or(0);
                    let choice = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt(def.label)
                        .items(options)
                        .default(default)
                        .interact()?;
                    FieldValue::Select(options[choice].to_string())
                }
                _ => FieldValue::Text(text_input(def.label, &current)?),
            };

            self.controller.apply(Action::SetField {
                index,
                field: def.id,
                value,
            })?;
        }
        Ok(())
    }

    fn toggle_fields(&mut self) -> Result<()> {
        let optional: Vec<&FieldDef> = catalog().iter().filter(|d| !d.required).collect();
        let labels: Vec<&str> = optional.iter().map(|d| d.label).collect();
        let defaults: Vec<bool> = optional
            .iter()
            .map(|d| self.controller.form.enabled_fields.is_enabled(d.id))
            .collect();

        let picked = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Fields to record per item")
            .items(&labels)
            .defaults(&defaults)
            .interact()?;

        for (i, def) in optional.iter().enumerate() {
            let want = picked.contains(&i);
            let have = self.controller.form.enabled_fields.is_enabled(def.id);
            if want != have {
                self.controller.apply(Action::ToggleField(def.id))?;
            }
        }
        Ok(())
    }

    async fn email_queue(&mut self) -> Result<()> {
        // adapter problems are never fatal; the session always gets control back
        let inbox = match GmailInbox::from_config(&self.config) {
            Ok(inbox) => inbox,
            Err(e) => {
                println!("⚠ Email import is unavailable: {}", e);
                return self.controller.apply(Action::StartOver);
            }
        };

        let query = text_input("Inbox search (empty for recent threads)", "")?;
        let query = query.trim().to_string();

        let pb = spinner("Fetching inbox threads...");
        let result = inbox
            .list_threads(
                if query.is_empty() { None } else { Some(&query) },
                self.config.inbox_page_size,
            )
            .await;
        pb.finish_and_clear();

        let threads = match result {
            Ok(threads) => threads,
            Err(e) => {
                println!("⚠ Inbox listing failed: {}", e);
                let retry = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !retry {
                    self.controller.apply(Action::StartOver)?;
                }
                return Ok(());
            }
        };

        if threads.is_empty() {
            println!("No threads found.");
            let retry = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Search again?")
                .default(true)
                .interact()?;
            if !retry {
                self.controller.apply(Action::StartOver)?;
            }
            return Ok(());
        }

        self.controller.apply(Action::ThreadsListed(threads.clone()))?;

        let labels: Vec<String> = threads
            .iter()
            .map(|t| format!("{} — {}", t.subject, t.snippet))
            .collect();
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which conversation?")
            .items(&labels)
            .default(0)
            .interact()?;

        let pb = spinner("Fetching thread...");
        let result = inbox.fetch_thread(&threads[choice].id).await;
        pb.finish_and_clear();

        match result {
            Ok(body) => self.controller.apply(Action::ThreadSelected(body)),
            Err(e) => {
                // stay on the queue; the loop offers the thread list again
                println!("⚠ Thread fetch failed: {}", e);
                Ok(())
            }
        }
    }

    fn email_thread(&mut self) -> Result<()> {
        let Some(body) = self.controller.form.email.selected.clone() else {
            return self.controller.apply(Action::StartOver);
        };

        println!("Subject: {}", body.subject);

        let pb = spinner("Extracting the item list...");
        let result = extract_intake(&body.text, self.verbose);
        pb.finish_and_clear();

        match result {
            Ok(intake) => self.controller.apply(Action::ParseSucceeded(intake)),
            Err(e) => {
                self.controller
                    .apply(Action::ParseFailed(format!("Extraction failed: {}", e)))?;
                let retry = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Retry extraction?")
                    .default(true)
                    .interact()?;
                if !retry {
                    self.controller.apply(Action::StartOver)?;
                }
                Ok(())
            }
        }
    }

    fn email_parsed(&mut self) -> Result<()> {
        let Some(intake) = self.controller.form.email.extracted.clone() else {
            return self.controller.apply(Action::StartOver);
        };

        println!("\nCustomer: {}", intake.customer_name);
        if !intake.summary.is_empty() {
            println!("Summary:  {}", intake.summary);
        }
        for item in &intake.items {
            let marker = if item.is_rejected() { "✗" } else { "✔" };
            println!("  {} {} ({})", marker, item.name, item.status);
        }

        let accept = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Add the non-rejected items to this intake?")
            .default(true)
            .interact()?;

        if accept {
            self.controller.apply(Action::AcceptExtracted)
        } else {
            self.controller.apply(Action::StartOver)
        }
    }

    /// Review menu. Returns true when the user chose to save and quit.
    fn review(&mut self) -> Result<bool> {
        print_items(&self.controller);

        let form = &self.controller.form;
        println!(
            "{} Unique Items  |  Quantity on Hand: {}  |  Total: ${:.2}\n",
            form.accepted_count(),
            form.total_quantity(),
            form.total_value()
        );

        let menu = [
            "Generate documents",
            "Edit an item",
            "Back to items",
            "Save draft",
            "Save draft & quit",
        ];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Review")
            .items(&menu)
            .default(0)
            .interact()?;

        match menu[choice] {
            "Generate documents" => self.controller.apply(Action::Finish)?,
            "Edit an item" => {
                if let Some(index) = self.pick_item()? {
                    self.edit_fields(index)?;
                }
            }
            "Back to items" => self.controller.apply(Action::BackToItems)?,
            "Save draft" => self.save_draft()?,
            "Save draft & quit" => {
                self.save_draft()?;
                return Ok(true);
            }
            _ => {}
        }
        Ok(false)
    }

    fn finish(&mut self) -> Result<()> {
        let formats = ["Receipt + photo sheet", "Receipt only", "Photo sheet only"];
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Which documents?")
            .items(&formats)
            .default(0)
            .interact()?;
        let format = match choice {
            1 => ExportFormat::Receipt,
            2 => ExportFormat::Photos,
            _ => ExportFormat::Both,
        };

        export_documents(&self.config, &self.controller.form, &format, &self.output_dir)?;

        if let Some(id) = self.draft_id.clone() {
            let remove = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Delete the saved draft?")
                .default(true)
                .interact()?;
            if remove {
                self.store.delete(&id)?;
            }
        }

        println!("\n✅ Intake complete");
        Ok(())
    }

    fn save_draft(&mut self) -> Result<()> {
        let name = default_draft_name(&self.controller.form);
        let id = self
            .store
            .save(self.draft_id.as_deref(), &name, &self.controller.form)?;
        println!("✔ Draft saved: {} ({})", name, id);
        self.draft_id = Some(id);
        Ok(())
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn text_input(prompt: &str, initial: &str) -> Result<String> {
    let value = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(value)
}

/// Resolve a user-entered path to image bytes. A directory offers its
/// images for selection; an empty answer or a missing file yields None.
fn prompt_photo(prompt: &str) -> Result<Option<Vec<u8>>> {
    let raw = text_input(prompt, "")?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let mut path = PathBuf::from(raw);
    if path.is_dir() {
        match pick_image_in_dir(&path)? {
            Some(picked) => path = picked,
            None => return Ok(None),
        }
    }

    if !path.exists() {
        println!("⚠ File not found: {}", path.display());
        return Ok(None);
    }

    Ok(Some(std::fs::read(&path)?))
}

fn pick_image_in_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            matches!(
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase())
                    .as_deref(),
                Some("jpg" | "jpeg" | "png")
            )
        })
        .collect();
    images.sort();

    if images.is_empty() {
        println!("⚠ No images found in {}", dir.display());
        return Ok(None);
    }

    let labels: Vec<String> = images
        .iter()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which image?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(Some(images[choice].clone()))
}

fn current_text(values: &ItemValues, id: FieldId) -> String {
    match id {
        FieldId::Name => values.name.clone(),
        FieldId::Status => values.status.as_str().to_string(),
        FieldId::Price => {
            if values.price > 0.0 {
                format!("{:.2}", values.price)
            } else {
                String::new()
            }
        }
        FieldId::Notes => values.notes.clone(),
        FieldId::Quantity => values.quantity.to_string(),
        FieldId::Condition => values.condition.clone(),
        FieldId::Dimensions => values.dimensions.clone(),
    }
}

fn print_items(controller: &Controller) {
    let form = &controller.form;
    if form.items.is_empty() {
        println!("\nNo items yet.\n");
        return;
    }

    println!("\nItems ({}):", form.items.len());
    for (i, item) in form.items.iter().enumerate() {
        let name = if item.has_name() {
            item.values.name.as_str()
        } else {
            "(unnamed)"
        };
        let status = if item.included() { "" } else { " [rejected]" };
        let photo = if item.photo.is_some() { " 📷" } else { "" };
        println!(
            "  {}. {}{}  ${:.2}{}",
            i + 1,
            name,
            status,
            item.values.price,
            photo
        );
    }
    println!();
}
