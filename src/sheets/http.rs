use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Sheet, SheetBackend, UpstreamReply};
use crate::config::UpstreamConfig;
use crate::error::{Result, RsvpError};

/// reqwest-backed transport to the proxy scripts.
pub struct HttpSheetBackend {
    client: reqwest::Client,
    upstream: UpstreamConfig,
}

impl HttpSheetBackend {
    pub fn new(upstream: UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(upstream.timeout_ms))
            .build()
            .map_err(|e| RsvpError::Config {
                message: format!("Failed to build reqwest client: {e}"),
            })?;
        Ok(Self { client, upstream })
    }

    fn endpoint(&self, sheet: Sheet) -> Result<&str> {
        self.upstream
            .endpoint(sheet)
            .ok_or_else(|| RsvpError::Config {
                message: format!("No endpoint configured for the {sheet} sheet"),
            })
    }

    async fn decode(sheet: Sheet, response: reqwest::Response) -> Result<UpstreamReply> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%sheet, %status, body = %body, "non-OK reply from sheet");
            return Err(RsvpError::UpstreamUnavailable {
                sheet,
                status: status.as_u16(),
            });
        }
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(UpstreamReply::classify(body))
    }

    async fn get_once(&self, sheet: Sheet, url: &str) -> Result<UpstreamReply> {
        let response = self.client.get(url).send().await?;
        Self::decode(sheet, response).await
    }
}

#[async_trait]
impl SheetBackend for HttpSheetBackend {
    /// Reads are idempotent, so transport failures are retried with
    /// exponential backoff up to `read_retries` extra attempts.
    async fn fetch(&self, sheet: Sheet) -> Result<UpstreamReply> {
        let url = self.endpoint(sheet)?;
        let attempts = self.upstream.read_retries + 1;
        let mut last_err: Option<RsvpError> = None;
        for i in 0..attempts {
            match self.get_once(sheet, url).await {
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    if i + 1 < attempts {
                        let delay_ms = 200u64 * (1u64 << i);
                        warn!(%sheet, attempt = i + 1, error = %e, "sheet read failed, retrying in {delay_ms}ms");
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| RsvpError::Internal {
            message: format!("No read attempt made for the {sheet} sheet"),
        }))
    }

    /// Writes are not idempotent upstream and are sent exactly once.
    async fn submit(&self, sheet: Sheet, envelope: Value) -> Result<UpstreamReply> {
        let url = self.endpoint(sheet)?;
        let response = self.client.post(url).json(&envelope).send().await?;
        Self::decode(sheet, response).await
    }
}
