//! Client for the spreadsheet-backed API.
//!
//! Writes are single-record pushes (`sync_users`, `sync_customers`,
//! `sync_orders`) spawned onto the runtime and never awaited by callers.
//! Reads pull whole collections (`get_users`, `get_customers`, `get_orders`).
//! Every failure is logged and swallowed: the local store stays authoritative
//! for the request that triggered the call.

use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Users,
    Customers,
    Orders,
}

impl SyncAction {
    pub fn push_action(self) -> &'static str {
        match self {
            SyncAction::Users => "sync_users",
            SyncAction::Customers => "sync_customers",
            SyncAction::Orders => "sync_orders",
        }
    }

    pub fn fetch_action(self) -> &'static str {
        match self {
            SyncAction::Users => "get_users",
            SyncAction::Customers => "get_customers",
            SyncAction::Orders => "get_orders",
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned status {0}")]
    Status(u16),

    #[error("invalid endpoint URL: {0}")]
    Url(String),
}

#[derive(Clone)]
pub struct SheetClient {
    client: Client,
    endpoint: Option<Url>,
}

impl std::fmt::Debug for SheetClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetClient")
            .field("enabled", &self.endpoint.is_some())
            .finish_non_exhaustive()
    }
}

impl SheetClient {
    pub fn new(endpoint: Option<&str>) -> Result<Self, SyncError> {
        let endpoint = endpoint
            .map(|raw| Url::parse(raw).map_err(|e| SyncError::Url(format!("{raw}: {e}"))))
            .transpose()?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn disabled() -> Self {
        Self { client: Client::new(), endpoint: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Fire-and-forget push of one changed record.
    pub fn push<T: Serialize>(&self, action: SyncAction, record: &T) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let body = match serde_json::to_string(&json!({ "action": action.push_action(), "data": record })) {
            Ok(b) => b,
            Err(e) => {
                error!(action = action.push_action(), error = %e, "Failed to encode sync payload");
                return;
            }
        };
        let client = self.client.clone();

        tokio::spawn(async move {
            if let Err(e) = send_push(&client, endpoint, body).await {
                error!(action = action.push_action(), error = %e, "Error syncing to sheet");
            } else {
                debug!(action = action.push_action(), "Synced to sheet");
            }
        });
    }

    /// Pulls a whole collection. Any failure yields an empty list.
    pub async fn fetch(&self, action: SyncAction) -> Vec<Value> {
        let Some(endpoint) = &self.endpoint else {
            return Vec::new();
        };
        info!(action = action.fetch_action(), "Fetching from sheet");
        match fetch_rows(&self.client, endpoint, action).await {
            Ok(rows) => {
                debug!(action = action.fetch_action(), count = rows.len(), "Fetched from sheet");
                rows
            }
            Err(e) => {
                error!(action = action.fetch_action(), error = %e, "Error fetching from sheet");
                Vec::new()
            }
        }
    }
}

async fn send_push(client: &Client, endpoint: Url, body: String) -> Result<(), SyncError> {
    // text/plain keeps Apps Script from requiring a CORS preflight
    let response = client
        .post(endpoint)
        .header(header::CONTENT_TYPE, "text/plain;charset=utf-8")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    debug!(%status, body = %text, "Sheet push response");
    Ok(())
}

async fn fetch_rows(client: &Client, endpoint: &Url, action: SyncAction) -> Result<Vec<Value>, SyncError> {
    // Cache-buster: Apps Script deployments sit behind a CDN
    let stamp = chrono::Utc::now().timestamp_millis().to_string();
    let response = client
        .get(endpoint.clone())
        .query(&[("action", action.fetch_action()), ("_t", stamp.as_str())])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SyncError::Status(response.status().as_u16()));
    }

    let payload: Value = response.json().await?;
    Ok(extract_rows(payload))
}

/// The sheet answers either with a bare array or `{ "data": [...] }`.
pub fn extract_rows(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => {
                warn!("Sheet response has no data array");
                Vec::new()
            }
        },
        _ => Vec::new(),
    }
}
