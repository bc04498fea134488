use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Result, RsvpError};
use crate::model::{Guest, GuestRequest};
use crate::normalize::normalize_guest_for_read;

/// The slice of the JSON API the browser-side flows talk to.
#[async_trait]
pub trait RsvpApi: Send + Sync {
    async fn list_guests(&self) -> Result<Vec<Guest>>;

    /// `PUT /api/guests` with `id` plus the changed fields.
    async fn update_guest(&self, id: &str, fields: Map<String, Value>) -> Result<Value>;

    async fn submit_join_request(&self, request: &GuestRequest) -> Result<Value>;
}

/// reqwest-backed [`RsvpApi`] against a running server.
pub struct HttpRsvpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRsvpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RsvpError::Config {
                message: format!("Failed to build reqwest client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Non-2xx replies carry `{"error": "..."}`; that text is what the user sees.
    async fn read(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed ({status})"));
        Err(RsvpError::Upstream { message })
    }
}

#[async_trait]
impl RsvpApi for HttpRsvpApi {
    async fn list_guests(&self) -> Result<Vec<Guest>> {
        let response = self.client.get(self.url("/api/guests")).send().await?;
        match Self::read(response).await? {
            Value::Array(rows) => Ok(rows.iter().map(normalize_guest_for_read).collect()),
            other => Err(RsvpError::Upstream {
                message: format!("Unexpected guest list payload: {other}"),
            }),
        }
    }

    async fn update_guest(&self, id: &str, mut fields: Map<String, Value>) -> Result<Value> {
        fields.insert("id".into(), Value::String(id.to_string()));
        let response = self
            .client
            .put(self.url("/api/guests"))
            .json(&Value::Object(fields))
            .send()
            .await?;
        Self::read(response).await
    }

    async fn submit_join_request(&self, request: &GuestRequest) -> Result<Value> {
        let response = self
            .client
            .post(self.url("/api/guest-requests"))
            .json(request)
            .send()
            .await?;
        Self::read(response).await
    }
}
