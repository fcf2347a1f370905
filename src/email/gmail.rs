//! Gmail inbox adapter
//!
//! REST calls against the Gmail API with an OAuth refresh-token exchange
//! per operation. Message bodies arrive base64url-encoded inside a nested
//! MIME part tree; only text/plain parts are collected.

use super::{Inbox, ThreadBody, ThreadSummary};
use crate::config::Config;
use crate::error::{IntakeError, Result};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::Deserialize;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

pub struct GmailInbox {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ThreadListResponse {
    threads: Vec<ThreadRef>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ThreadRef {
    id: String,
    snippet: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ThreadResponse {
    id: String,
    messages: Vec<Message>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Message {
    payload: Part,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct Part {
    mime_type: String,
    headers: Vec<Header>,
    body: PartBody,
    parts: Vec<Part>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Header {
    name: String,
    value: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PartBody {
    data: Option<String>,
}

impl GmailInbox {
    pub fn from_config(config: &Config) -> Result<Self> {
        let (client_id, client_secret, refresh_token) = config.gmail_credentials()?;
        Ok(Self {
            client: reqwest::Client::new(),
            client_id,
            client_secret,
            refresh_token,
        })
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", self.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| IntakeError::ApiCall(format!("token refresh failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IntakeError::ApiCall(format!(
                "token refresh failed: HTTP {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IntakeError::ApiParse(format!("token response: {}", e)))?;
        Ok(token.access_token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| IntakeError::ApiCall(format!("Gmail request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(IntakeError::ApiCall(format!(
                "Gmail API error: HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IntakeError::ApiParse(format!("Gmail response: {}", e)))
    }
}

/// Gmail sends body data URL-safe encoded, usually without padding.
fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| URL_SAFE.decode(data))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn header_value<'a>(part: &'a Part, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Collect text/plain content from a MIME part tree, depth first.
fn collect_text(part: &Part, out: &mut String) {
    if part.mime_type.starts_with("text/plain") {
        if let Some(data) = part.body.data.as_deref() {
            if let Some(text) = decode_body(data) {
                if !out.is_empty() {
                    out.push_str("\n\n");
                }
                out.push_str(text.trim());
            }
        }
    }
    for child in &part.parts {
        collect_text(child, out);
    }
}

#[async_trait::async_trait]
impl Inbox for GmailInbox {
    async fn list_threads(&self, query: Option<&str>, max: usize) -> Result<Vec<ThreadSummary>> {
        let token = self.access_token().await?;
        let q = query.unwrap_or("in:inbox").to_string();

        let list: ThreadListResponse = self
            .get_json(
                &token,
                &format!("{}/threads", API_BASE),
                &[("maxResults", max.to_string()), ("q", q)],
            )
            .await?;

        let mut summaries = Vec::with_capacity(list.threads.len());
        for thread_ref in list.threads {
            // one metadata fetch per thread for the subject line
            let thread: ThreadResponse = self
                .get_json(
                    &token,
                    &format!("{}/threads/{}", API_BASE, thread_ref.id),
                    &[
                        ("format", "metadata".to_string()),
                        ("metadataHeaders", "Subject".to_string()),
                    ],
                )
                .await?;

            let subject = thread
                .messages
                .first()
                .and_then(|m| header_value(&m.payload, "Subject"))
                .unwrap_or("(no subject)")
                .to_string();

            summaries.push(ThreadSummary {
                id: thread_ref.id,
                subject,
                snippet: thread_ref.snippet,
            });
        }

        Ok(summaries)
    }

    async fn fetch_thread(&self, id: &str) -> Result<ThreadBody> {
        let token = self.access_token().await?;

        let thread: ThreadResponse = self
            .get_json(
                &token,
                &format!("{}/threads/{}", API_BASE, id),
                &[("format", "full".to_string())],
            )
            .await?;

        let subject = thread
            .messages
            .first()
            .and_then(|m| header_value(&m.payload, "Subject"))
            .unwrap_or("(no subject)")
            .to_string();

        let mut text = String::new();
        for message in &thread.messages {
            collect_text(&message.payload, &mut text);
        }

        Ok(ThreadBody {
            id: thread.id,
            subject,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_no_pad() {
        let data = URL_SAFE_NO_PAD.encode("Hello, I have a dresser.");
        assert_eq!(
            decode_body(&data).unwrap(),
            "Hello, I have a dresser."
        );
    }

    #[test]
    fn test_collect_text_nested_parts() {
        let leaf = Part {
            mime_type: "text/plain".into(),
            body: PartBody {
                data: Some(URL_SAFE_NO_PAD.encode("inner text")),
            },
            ..Default::default()
        };
        let html = Part {
            mime_type: "text/html".into(),
            body: PartBody {
                data: Some(URL_SAFE_NO_PAD.encode("<p>ignored</p>")),
            },
            ..Default::default()
        };
        let root = Part {
            mime_type: "multipart/alternative".into(),
            parts: vec![html, leaf],
            ..Default::default()
        };

        let mut out = String::new();
        collect_text(&root, &mut out);
        assert_eq!(out, "inner text");
    }
}
