use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Shopify credentials are not configured. Set them with `consign-intake config --set-store-url URL --set-access-token TOKEN`")]
    MissingShopifyCredentials,

    #[error("Gmail credentials are not configured. Set them with `consign-intake config --set-gmail-client-id ... --set-gmail-client-secret ... --set-gmail-refresh-token ...`")]
    MissingGmailCredentials,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Invalid item index: {0}")]
    ItemIndex(usize),

    #[error("Detection error: {0}")]
    Detection(String),

    #[error("API call error: {0}")]
    ApiCall(String),

    #[error("API response parse error: {0}")]
    ApiParse(String),

    #[error("No items found for account {0}")]
    AccountNotFound(String),

    #[error("Draft not found: {0}")]
    DraftNotFound(String),

    #[error("Draft decode error: {0}")]
    DraftDecode(String),

    #[error("PDF generation error: {0}")]
    PdfGeneration(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] consign_common::Error),
}

pub type Result<T> = std::result::Result<T, IntakeError>;
