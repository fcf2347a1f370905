use clap::Parser;
use consign_intake::{cli, config, detect, error, export, lookup, session, store};

use cli::{Cli, Commands};
use config::Config;
use detect::{Detector, VisionDetector};
use error::Result;
use lookup::ShopifyLookup;
use session::Session;
use store::DraftStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Intake { resume, output } => {
            println!("🧾 consign-intake - Intake session\n");

            let mut session = match resume {
                Some(id) => Session::resume(config, &id, output, cli.verbose)?,
                None => Session::new(config, output, cli.verbose)?,
            };
            session.run().await?;
        }

        Commands::Drafts { delete } => {
            let store =
                DraftStore::with_retention(Config::draft_dir()?, config.draft_retention_hours);

            if let Some(id) = delete {
                if store.delete(&id)? {
                    println!("✔ Draft deleted: {}", id);
                } else {
                    println!("⚠ No draft with id {}", id);
                }
            } else {
                let drafts = store.list()?;
                if drafts.is_empty() {
                    println!("No saved drafts.");
                }
                for draft in drafts {
                    println!(
                        "{}  {}  [{}]  updated {}",
                        draft.id,
                        draft.name,
                        draft.mode,
                        draft.updated_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }

        Commands::Export { draft, format, output } => {
            println!("📄 consign-intake - Export\n");

            let store =
                DraftStore::with_retention(Config::draft_dir()?, config.draft_retention_hours);
            let (form, _mode) = store.load(&draft)?;

            let written = export::export_documents(&config, &form, &format, &output)?;
            println!("\n✅ {} file(s) written", written.len());
        }

        Commands::Lookup { account } => {
            println!("🔎 consign-intake - Account lookup\n");

            let lookup = ShopifyLookup::from_config(&config)?;
            let summary = lookup.search_account(&account).await?;

            println!(
                "✔ Account {}: {} items on file",
                summary.account_number, summary.total_items
            );
            let recent = summary.items.len().saturating_sub(10);
            for item in &summary.items[recent..] {
                println!(
                    "  {}  {}  ${}  qty {}",
                    item.sku, item.title, item.price, item.qty
                );
            }
            println!("\nNext item number: {}", summary.next_item_number);
        }

        Commands::Detect { image, confidence } => {
            println!("📸 consign-intake - Item detection\n");

            let bytes = std::fs::read(&image)?;
            let detector = VisionDetector::new(cli.verbose);
            let threshold = confidence.unwrap_or(config.detection_confidence);

            let boxes = detector.detect(&bytes, threshold)?;
            println!("✔ {} item(s) detected", boxes.len());
            for bbox in &boxes {
                println!("  [{}, {}, {}, {}]", bbox.x1, bbox.y1, bbox.x2, bbox.y2);
            }
        }

        Commands::Config {
            set_store_url,
            set_access_token,
            set_gmail_client_id,
            set_gmail_client_secret,
            set_gmail_refresh_token,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_store_url {
                config.shopify_store_url = Some(url);
                changed = true;
            }
            if let Some(token) = set_access_token {
                config.shopify_access_token = Some(token);
                changed = true;
            }
            if let Some(id) = set_gmail_client_id {
                config.gmail_client_id = Some(id);
                changed = true;
            }
            if let Some(secret) = set_gmail_client_secret {
                config.gmail_client_secret = Some(secret);
                changed = true;
            }
            if let Some(refresh) = set_gmail_refresh_token {
                config.gmail_refresh_token = Some(refresh);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ Configuration saved");
            }

            if show || !changed {
                println!("Config file: {}", Config::config_path()?.display());
                println!(
                    "  store url:            {}",
                    config.shopify_store_url.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  access token:         {}",
                    mask(config.shopify_access_token.as_deref())
                );
                println!(
                    "  gmail client id:      {}",
                    mask(config.gmail_client_id.as_deref())
                );
                println!(
                    "  gmail client secret:  {}",
                    mask(config.gmail_client_secret.as_deref())
                );
                println!(
                    "  gmail refresh token:  {}",
                    mask(config.gmail_refresh_token.as_deref())
                );
                println!("  detection confidence: {}", config.detection_confidence);
                println!("  draft retention:      {}h", config.draft_retention_hours);
                println!("  inbox page size:      {}", config.inbox_page_size);
            }
        }
    }

    Ok(())
}

fn mask(value: Option<&str>) -> &'static str {
    if value.map(|v| !v.is_empty()).unwrap_or(false) {
        "(set)"
    } else {
        "(not set)"
    }
}
