//! Spreadsheet proxy client.
//!
//! Every entity lives in its own sheet behind a web-hosted script. Reads are
//! plain GETs; writes POST an envelope `{"action": "create"|"update"|"delete", ...}`.
//! [`SheetClient`] turns local CRUD intents into that envelope and unwraps the
//! reply, while [`SheetBackend`] implementations own the transport.

pub mod http;
pub mod memory;
pub mod traits;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, RsvpError};

pub use http::HttpSheetBackend;
pub use memory::MemorySheets;
pub use traits::{SheetBackend, UpstreamReply};

/// Keys under which a proxy may wrap its row array.
const WRAPPER_KEYS: &[&str] = &[
    "data", "rows", "records", "values", "items", "result", "messages", "guests",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sheet {
    Guests,
    Messages,
    GuestRequests,
    Entourage,
    PrincipalSponsors,
}

impl Sheet {
    pub const ALL: [Sheet; 5] = [
        Sheet::Guests,
        Sheet::Messages,
        Sheet::GuestRequests,
        Sheet::Entourage,
        Sheet::PrincipalSponsors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sheet::Guests => "guests",
            Sheet::Messages => "messages",
            Sheet::GuestRequests => "guest-requests",
            Sheet::Entourage => "entourage",
            Sheet::PrincipalSponsors => "principal-sponsors",
        }
    }

    /// Column the proxy uses to locate a row for update/delete.
    pub fn id_field(&self) -> &'static str {
        match self {
            Sheet::Guests => "id",
            Sheet::Messages => "timestamp",
            Sheet::GuestRequests | Sheet::Entourage => "Name",
            Sheet::PrincipalSponsors => "MalePrincipalSponsor",
        }
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a write envelope. Caller fields are laid down first so that
/// `action` and the id field always reflect the intent.
pub fn envelope(action: &str, id: Option<(&str, &str)>, fields: Map<String, Value>) -> Value {
    let mut body = fields;
    body.insert("action".to_string(), Value::String(action.to_string()));
    if let Some((key, value)) = id {
        body.insert(key.to_string(), Value::String(value.to_string()));
    }
    Value::Object(body)
}

/// Pulls the row array out of a read payload: either a bare array or an
/// object carrying the array under one of [`WRAPPER_KEYS`].
pub fn extract_rows(sheet: Sheet, payload: Value) -> Result<Vec<Value>> {
    match payload {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .ok_or(RsvpError::MalformedShape { sheet }),
        _ => Err(RsvpError::MalformedShape { sheet }),
    }
}

/// CRUD facade over a [`SheetBackend`].
#[derive(Clone)]
pub struct SheetClient {
    backend: Arc<dyn SheetBackend>,
}

impl SheetClient {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch_all(&self, sheet: Sheet) -> Result<Vec<Value>> {
        match self.backend.fetch(sheet).await? {
            UpstreamReply::Records(payload) => {
                let rows = extract_rows(sheet, payload)?;
                debug!(%sheet, rows = rows.len(), "fetched sheet");
                Ok(rows)
            }
            UpstreamReply::Error(message) => Err(RsvpError::Upstream { message }),
            UpstreamReply::UnexpectedShape(_) => Err(RsvpError::MalformedShape { sheet }),
        }
    }

    pub async fn create(&self, sheet: Sheet, fields: Map<String, Value>) -> Result<Value> {
        self.write(sheet, envelope("create", None, fields)).await
    }

    /// Forwards every provided field; merging into the stored row is the
    /// proxy's job.
    pub async fn update(&self, sheet: Sheet, id: &str, fields: Map<String, Value>) -> Result<Value> {
        self.write(sheet, envelope("update", Some((sheet.id_field(), id)), fields))
            .await
    }

    pub async fn delete(&self, sheet: Sheet, id: &str) -> Result<Value> {
        self.write(
            sheet,
            envelope("delete", Some((sheet.id_field(), id)), Map::new()),
        )
        .await
    }

    async fn write(&self, sheet: Sheet, envelope: Value) -> Result<Value> {
        let action = envelope
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        debug!(%sheet, %action, "submitting to sheet");
        match self.backend.submit(sheet, envelope).await? {
            UpstreamReply::Records(body) | UpstreamReply::UnexpectedShape(body) => Ok(body),
            UpstreamReply::Error(message) => Err(RsvpError::Upstream { message }),
        }
    }
}
