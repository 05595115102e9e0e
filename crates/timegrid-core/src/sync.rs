//! One-way external calendar synchronization.
//!
//! Pulls events from an OAuth-backed provider and mirrors them into the
//! local store with a provenance id prefix. The engine treats pulled
//! events as ordinary events for conflict and recurrence purposes, but
//! local edits are never forwarded back, and each pull fully replaces the
//! previously-synced subset.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::Event;
use crate::store::EventStore;

/// Sync error types. Authorization expiry is surfaced distinctly so the
/// shell can prompt for reauthentication instead of showing a generic
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Calendar API error: {0}")]
    CalendarApi(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication required")]
    AuthenticationRequired,
}

/// External calendar sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Provider calendar to pull from.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Provenance prefix applied to every pulled event id.
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
    /// Provider API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_calendar_id() -> String {
    "primary".into()
}

fn default_id_prefix() -> String {
    "ext_".into()
}

fn default_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            calendar_id: default_calendar_id(),
            id_prefix: default_id_prefix(),
            base_url: default_base_url(),
        }
    }
}

/// Result of a completed pull.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub pulled: usize,
    pub synced_at: Option<DateTime<Utc>>,
}

/// One-way puller for an external calendar provider.
pub struct ExternalCalendarSync {
    config: SyncConfig,
    /// Caller-supplied bearer token; acquisition and refresh are the host
    /// application's concern.
    access_token: Option<String>,
    http_client: Client,
}

impl ExternalCalendarSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            access_token: None,
            http_client: Client::new(),
        }
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Pull the visible range from the provider and replace the previously
    /// synced subset in the store.
    pub async fn pull_into(
        &self,
        store: &Mutex<EventStore>,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        if !self.config.enabled {
            return Ok(SyncOutcome::default());
        }
        let events = self.fetch_events(range_start, range_end).await?;
        let pulled = events.len();
        store
            .lock()
            .expect("event store poisoned")
            .replace_prefixed(&self.config.id_prefix, events);
        debug!(pulled, "external calendar pull applied");
        Ok(SyncOutcome {
            pulled,
            synced_at: Some(Utc::now()),
        })
    }

    /// Fetch and map provider events, following pagination.
    async fn fetch_events(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Event>, SyncError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(SyncError::AuthenticationRequired)?;

        let url = format!(
            "{}/calendars/{}/events",
            self.config.base_url.trim_end_matches('/'),
            self.config.calendar_id
        );

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(token)
                .query(&[
                    ("timeMin", range_start.to_rfc3339()),
                    ("timeMax", range_end.to_rfc3339()),
                    ("singleEvents", "true".to_string()),
                    ("maxResults", "250".to_string()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(SyncError::AuthenticationRequired);
            }
            let body: serde_json::Value = response.json().await?;
            if let Some(err) = body.get("error") {
                return Err(SyncError::CalendarApi(err.to_string()));
            }

            if let Some(items) = body["items"].as_array() {
                for item in items {
                    if let Some(event) = self.parse_provider_event(item) {
                        events.push(event);
                    }
                }
            }

            page_token = body["nextPageToken"].as_str().map(|s| s.to_string());
            if page_token.is_none() {
                break;
            }
        }

        Ok(events)
    }

    /// Map one provider item to an Event. Items without a usable time
    /// range are skipped.
    fn parse_provider_event(&self, item: &serde_json::Value) -> Option<Event> {
        let provider_id = item["id"].as_str()?;
        let title = item["summary"].as_str().unwrap_or("(untitled)");

        let (start, end, all_day) = match (
            parse_instant(&item["start"]),
            parse_instant(&item["end"]),
        ) {
            (Some((start, start_all_day)), Some((end, _))) => (start, end, start_all_day),
            _ => return None,
        };
        if end <= start {
            return None;
        }

        let mut event = Event::new(title, start, end);
        event.id = format!("{}{}", self.config.id_prefix, provider_id);
        event.all_day = all_day;
        event.description = item["description"].as_str().map(|s| s.to_string());
        event.multi_day = event.spans_days();
        Some(event)
    }
}

/// Provider instants come as either `dateTime` (RFC 3339) or `date`
/// (all-day). Returns the instant and whether it was date-only.
fn parse_instant(value: &serde_json::Value) -> Option<(DateTime<Utc>, bool)> {
    if let Some(datetime) = value["dateTime"].as_str() {
        let parsed = DateTime::parse_from_rfc3339(datetime).ok()?;
        return Some((parsed.with_timezone(&Utc), false));
    }
    let date = value["date"].as_str()?;
    let day = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((
        Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN)),
        true,
    ))
}
