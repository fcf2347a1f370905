use crate::error::{IntakeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store hostname, e.g. "my-shop.myshopify.com".
    pub shopify_store_url: Option<String>,
    pub shopify_access_token: Option<String>,
    pub gmail_client_id: Option<String>,
    pub gmail_client_secret: Option<String>,
    pub gmail_refresh_token: Option<String>,
    /// Minimum detection confidence passed to the vision model.
    pub detection_confidence: f32,
    /// Drafts older than this are purged when the draft list is read.
    pub draft_retention_hours: i64,
    /// How many inbox threads to list at once.
    pub inbox_page_size: usize,
    /// Printed at the top of every receipt.
    pub company_name: String,
    pub company_address: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shopify_store_url: None,
            shopify_access_token: None,
            gmail_client_id: None,
            gmail_client_secret: None,
            gmail_refresh_token: None,
            detection_confidence: 0.25,
            draft_retention_hours: 24,
            inbox_page_size: 10,
            company_name: "Consigned By Design".into(),
            company_address: vec![
                "7035 East 96th Street".into(),
                "Suite A".into(),
                "Indianapolis, Indiana 46250".into(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| IntakeError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("consign-intake").join("config.json"))
    }

    /// Default location of the draft store.
    pub fn draft_dir() -> Result<PathBuf> {
        let data = dirs::data_dir()
            .ok_or_else(|| IntakeError::Config("data directory not found".into()))?;
        Ok(data.join("consign-intake").join("drafts"))
    }

    /// Environment variables take precedence over the config file.
    pub fn shopify_credentials(&self) -> Result<(String, String)> {
        let url = std::env::var("SHOPIFY_STORE_URL")
            .ok()
            .or_else(|| self.shopify_store_url.clone());
        let token = std::env::var("SHOPIFY_ACCESS_TOKEN")
            .ok()
            .or_else(|| self.shopify_access_token.clone());

        match (url, token) {
            (Some(url), Some(token)) => Ok((url, token)),
            _ => Err(IntakeError::MissingShopifyCredentials),
        }
    }

    pub fn gmail_credentials(&self) -> Result<(String, String, String)> {
        let id = std::env::var("GMAIL_CLIENT_ID")
            .ok()
            .or_else(|| self.gmail_client_id.clone());
        let secret = std::env::var("GMAIL_CLIENT_SECRET")
            .ok()
            .or_else(|| self.gmail_client_secret.clone());
        let refresh = std::env::var("GMAIL_REFRESH_TOKEN")
            .ok()
            .or_else(|| self.gmail_refresh_token.clone());

        match (id, secret, refresh) {
            (Some(id), Some(secret), Some(refresh)) => Ok((id, secret, refresh)),
            _ => Err(IntakeError::MissingGmailCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // env mutations stay inside one test per credential family so parallel
    // test threads never observe each other's variables

    #[test]
    fn test_gmail_credentials_env_override() {
        let mut config = Config::default();
        assert!(matches!(
            config.gmail_credentials(),
            Err(IntakeError::MissingGmailCredentials)
        ));

        config.gmail_client_id = Some("file-id".into());
        config.gmail_client_secret = Some("file-secret".into());
        config.gmail_refresh_token = Some("file-refresh".into());
        let (id, _, _) = config.gmail_credentials().unwrap();
        assert_eq!(id, "file-id");

        std::env::set_var("GMAIL_CLIENT_ID", "env-id");
        let (id, secret, refresh) = config.gmail_credentials().unwrap();
        std::env::remove_var("GMAIL_CLIENT_ID");

        assert_eq!(id, "env-id");
        assert_eq!(secret, "file-secret");
        assert_eq!(refresh, "file-refresh");
    }

    #[test]
    fn test_shopify_credentials_env_override() {
        let mut config = Config::default();
        assert!(matches!(
            config.shopify_credentials(),
            Err(IntakeError::MissingShopifyCredentials)
        ));

        config.shopify_store_url = Some("file.myshopify.com".into());
        config.shopify_access_token = Some("file-token".into());
        let (url, _) = config.shopify_credentials().unwrap();
        assert_eq!(url, "file.myshopify.com");

        std::env::set_var("SHOPIFY_STORE_URL", "env.myshopify.com");
        let (url, token) = config.shopify_credentials().unwrap();
        std::env::remove_var("SHOPIFY_STORE_URL");

        assert_eq!(url, "env.myshopify.com");
        assert_eq!(token, "file-token");
    }
}
