//! Access to the time tracker. [EntrySource] is the seam the rest of the application depends on,
//! [client::TogglClient] is the realization talking to Toggl Track.

pub mod client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::tracking::entities::TimeEntry;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Toggl responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Received no time entries from Toggl, got {0:?} instead")]
    NotEntries(String),

    #[error("Time entry has an invalid start {start:?}: {reason}")]
    InvalidStart { start: String, reason: String },
}

/// Provides time entries that started between 2 moments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn fetch(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, FetchError>;
}
