//! Remote event store API.
//!
//! The engine assumes a CRUD-style remote store reached over the network.
//! [`EventApi`] is the contract surface; [`RemoteStoreClient`] is the
//! reqwest implementation. All calls are round-trips and may fail with a
//! not-found or transport error -- the orchestrator decides what that
//! means for local state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::event::{Event, Participant, Priority, RecurrenceRule, ReminderRule};

/// Remote store error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The target identifier is unknown to the remote store.
    #[error("Event not found in remote store")]
    NotFound,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Event store API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Partial changes to an event. Unset fields are left untouched; the
/// same shape goes over the wire as a PATCH body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<ReminderRule>>,
}

impl EventPatch {
    /// Move or resize to a new time range.
    pub fn time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..Default::default()
        }
    }

    /// Whether the patch touches `start_time` or `end_time` -- the trigger
    /// for the participant-notification confirmation gate.
    pub fn touches_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    /// Apply the set fields onto an event, refreshing `updated_at`.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(start) = self.start_time {
            event.start_time = start;
        }
        if let Some(end) = self.end_time {
            event.end_time = end;
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(priority) = self.priority {
            event.priority = priority;
        }
        if let Some(service) = &self.service {
            event.service = Some(service.clone());
        }
        if let Some(client_id) = &self.client_id {
            event.client_id = Some(client_id.clone());
        }
        if let Some(client_name) = &self.client_name {
            event.client_name = Some(client_name.clone());
        }
        if let Some(recurrence) = &self.recurrence {
            event.is_recurring = true;
            event.recurrence = Some(recurrence.clone());
        }
        if let Some(participants) = &self.participants {
            event.participants = participants.clone();
        }
        if let Some(notifications) = &self.notifications {
            event.notifications = notifications.clone();
        }
        event.updated_at = Utc::now();
    }
}

/// Scope of a delete across a recurrence cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringDeleteOption {
    ThisOnly,
    AllPrevious,
    ThisAndFollowing,
    All,
}

impl RecurringDeleteOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisOnly => "this_only",
            Self::AllPrevious => "all_previous",
            Self::ThisAndFollowing => "this_and_following",
            Self::All => "all",
        }
    }
}

/// Result of a confirmed bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringDeleteOutcome {
    pub deleted_count: usize,
    pub deleted_ids: Vec<String>,
}

/// Contract surface of the remote event store.
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, ApiError>;

    async fn create(&self, event: &Event) -> Result<Event, ApiError>;

    async fn update(&self, id: &str, patch: &EventPatch) -> Result<Event, ApiError>;

    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    async fn delete_recurring(
        &self,
        id: &str,
        option: RecurringDeleteOption,
        group_id: &str,
    ) -> Result<RecurringDeleteOutcome, ApiError>;
}

/// Reqwest-backed implementation of [`EventApi`].
pub struct RemoteStoreClient {
    base_url: String,
    bearer_token: Option<String>,
    http_client: Client,
}

impl RemoteStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            http_client: Client::new(),
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a response to `T`, folding 404 and error bodies into [`ApiError`].
    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(format!("{status}: {body}")));
        }
        let value: serde_json::Value = response.json().await?;
        if let Some(err) = value.get("error") {
            return Err(ApiError::Api(err.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl EventApi for RemoteStoreClient {
    async fn list(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, ApiError> {
        let request = self
            .http_client
            .get(self.url("/events"))
            .query(&[("start", start.to_rfc3339()), ("end", end.to_rfc3339())]);
        Self::parse(self.authorize(request).send().await?).await
    }

    async fn create(&self, event: &Event) -> Result<Event, ApiError> {
        let request = self.http_client.post(self.url("/events")).json(event);
        Self::parse(self.authorize(request).send().await?).await
    }

    async fn update(&self, id: &str, patch: &EventPatch) -> Result<Event, ApiError> {
        let request = self
            .http_client
            .patch(self.url(&format!("/events/{id}")))
            .json(patch);
        Self::parse(self.authorize(request).send().await?).await
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let request = self.http_client.delete(self.url(&format!("/events/{id}")));
        let response = self.authorize(request).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        Ok(response.status().is_success())
    }

    async fn delete_recurring(
        &self,
        id: &str,
        option: RecurringDeleteOption,
        group_id: &str,
    ) -> Result<RecurringDeleteOutcome, ApiError> {
        let body = serde_json::json!({
            "option": option,
            "group_id": group_id,
        });
        let request = self
            .http_client
            .post(self.url(&format!("/events/{id}/delete-recurring")))
            .json(&body);
        Self::parse(self.authorize(request).send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture_event() -> Event {
        Event::new(
            "remote",
            Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_posts_and_parses_event() {
        let mut server = mockito::Server::new_async().await;
        let event = fixture_event();
        let body = serde_json::to_string(&event).unwrap();
        let mock = server
            .mock("POST", "/events")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(&body)
            .create_async()
            .await;

        let client = RemoteStoreClient::new(server.url());
        let created = client.create(&event).await.unwrap();
        assert_eq!(created.id, event.id);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_maps_404_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PATCH", "/events/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = RemoteStoreClient::new(server.url());
        let patch = EventPatch {
            title: Some("renamed".into()),
            ..Default::default()
        };
        match client.update("missing", &patch).await {
            Err(ApiError::NotFound) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_recurring_parses_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/events/e-2/delete-recurring")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"deleted_count":3,"deleted_ids":["e-2","e-3","e-4"]}"#)
            .create_async()
            .await;

        let client = RemoteStoreClient::new(server.url());
        let outcome = client
            .delete_recurring("e-2", RecurringDeleteOption::ThisAndFollowing, "grp-1")
            .await
            .unwrap();
        assert_eq!(outcome.deleted_count, 3);
        assert_eq!(outcome.deleted_ids.len(), 3);
    }

    #[test]
    fn patch_detects_time_changes() {
        assert!(EventPatch::time_range(
            Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
        )
        .touches_times());
        assert!(!EventPatch {
            title: Some("x".into()),
            ..Default::default()
        }
        .touches_times());
    }

    #[test]
    fn patch_application_is_partial() {
        let mut event = fixture_event();
        let original_start = event.start_time;
        let patch = EventPatch {
            title: Some("renamed".into()),
            ..Default::default()
        };
        patch.apply_to(&mut event);
        assert_eq!(event.title, "renamed");
        assert_eq!(event.start_time, original_start);
    }
}
