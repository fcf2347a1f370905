use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "consign-intake")]
#[command(about = "Consignment intake form, receipt and photo sheet generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive intake session
    Intake {
        /// Resume a saved draft by id
        #[arg(short, long)]
        resume: Option<String>,

        /// Output directory for generated PDFs
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List or delete saved drafts
    Drafts {
        /// Delete the draft with this id
        #[arg(long)]
        delete: Option<String>,
    },

    /// Generate PDFs from a saved draft without opening the session
    Export {
        /// Draft id
        #[arg(required = true)]
        draft: String,

        /// Output format (receipt/photos/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Look up an existing consigner account
    Lookup {
        /// Account number
        #[arg(required = true)]
        account: String,
    },

    /// Detect items in a photo and print the bounding boxes
    Detect {
        /// Path to the photo
        #[arg(required = true)]
        image: PathBuf,

        /// Confidence threshold (0.0-1.0)
        #[arg(short, long)]
        confidence: Option<f32>,
    },

    /// Show or edit configuration
    Config {
        /// Set the commerce store URL
        #[arg(long)]
        set_store_url: Option<String>,

        /// Set the commerce API access token
        #[arg(long)]
        set_access_token: Option<String>,

        /// Set the mail OAuth client id
        #[arg(long)]
        set_gmail_client_id: Option<String>,

        /// Set the mail OAuth client secret
        #[arg(long)]
        set_gmail_client_secret: Option<String>,

        /// Set the mail OAuth refresh token
        #[arg(long)]
        set_gmail_refresh_token: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    Receipt,
    Photos,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "receipt" | "pdf" => Ok(ExportFormat::Receipt),
            "photos" | "photo" => Ok(ExportFormat::Photos),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use receipt, photos, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Receipt => write!(f, "receipt"),
            ExportFormat::Photos => write!(f, "photos"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
