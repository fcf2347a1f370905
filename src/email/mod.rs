//! Email import boundary
//!
//! An inbox adapter lists recent conversation threads and fetches full
//! message bodies; the extraction step turns a thread's text into a
//! structured pre-approved item list.

mod extract;
mod gmail;

pub use extract::{build_extract_prompt, extract_intake};
pub use gmail::GmailInbox;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One inbox thread as shown in the selection queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: String,
    pub subject: String,
    pub snippet: String,
}

/// A selected thread with the concatenated plain-text bodies of all its
/// messages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadBody {
    pub id: String,
    pub subject: String,
    pub text: String,
}

#[async_trait::async_trait]
pub trait Inbox {
    /// List recent threads, bounded by `max`. With a query, runs an inbox
    /// search instead.
    async fn list_threads(&self, query: Option<&str>, max: usize) -> Result<Vec<ThreadSummary>>;

    /// Fetch the full message bodies of one thread.
    async fn fetch_thread(&self, id: &str) -> Result<ThreadBody>;
}
