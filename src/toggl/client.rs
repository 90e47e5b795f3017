use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{settings::Settings, tracking::entities::TimeEntry};

use super::{EntrySource, FetchError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Time entry as Toggl returns it. Everything apart from start and duration is ignored.
#[derive(Debug, Deserialize)]
struct TogglTimeEntry {
    start: String,
    duration: i64,
}

/// Client for the Toggl Track v9 API.
pub struct TogglClient {
    client: Client,
    base_url: String,
    api_token: String,
    time_format: String,
}

impl TogglClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        time_format: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_token: api_token.into(),
            time_format: time_format.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::new(
            settings.api_url.clone(),
            settings.api_token.clone(),
            settings.time_format.clone(),
        )
    }

    fn parse_start(&self, start: &str) -> Result<DateTime<FixedOffset>, FetchError> {
        DateTime::parse_from_str(start, &self.time_format)
            .or_else(|_| DateTime::parse_from_rfc3339(start))
            .map_err(|e| FetchError::InvalidStart {
                start: start.into(),
                reason: e.to_string(),
            })
    }

    /// Only a JSON array counts as entries. Toggl reports some failures as a plain string, which
    /// must not be mistaken for an empty week.
    fn parse_entries(&self, body: &str) -> Result<Vec<TimeEntry>, FetchError> {
        let raw = match serde_json::from_str::<Value>(body) {
            Ok(value @ Value::Array(_)) => serde_json::from_value::<Vec<TogglTimeEntry>>(value)
                .map_err(|_| FetchError::NotEntries(body.into()))?,
            Ok(Value::String(message)) => return Err(FetchError::NotEntries(message)),
            Ok(_) | Err(_) => return Err(FetchError::NotEntries(body.into())),
        };

        raw.into_iter()
            .map(|entry| {
                Ok(TimeEntry::new(
                    self.parse_start(&entry.start)?,
                    entry.duration,
                ))
            })
            .collect()
    }
}

fn to_query_time(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl EntrySource for TogglClient {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, FetchError> {
        let url = format!("{}/me/time_entries", self.base_url.trim_end_matches('/'));
        debug!("Requesting {url}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_token, Some("api_token"))
            .query(&[("start_date", to_query_time(start)), ("end_date", to_query_time(end))])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let entries = self.parse_entries(&body)?;
        info!("Fetched {} time entries", entries.len());
        Ok(entries)
    }
}
