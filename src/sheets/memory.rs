//! In-process sheet store, used for local development (`serve --in-memory`)
//! and as the backend in tests. Behaves like the proxy script: it assigns
//! numeric ids on create, merges on update and reports problems through the
//! `error` field rather than through transport failures.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::{Sheet, SheetBackend, UpstreamReply};
use crate::deserializers::scalar_to_string;
use crate::error::{Result, RsvpError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    Fetch,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
struct Inner {
    rows: HashMap<Sheet, Vec<Value>>,
    raw: HashMap<Sheet, Value>,
    reported: HashMap<(Sheet, Op), String>,
    offline: HashSet<Sheet>,
    submissions: Vec<(Sheet, Value)>,
    next_id: u64,
}

pub struct MemorySheets {
    inner: Mutex<Inner>,
}

impl Default for MemorySheets {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySheets {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the rows of a sheet.
    pub fn seed(&self, sheet: Sheet, rows: Vec<Value>) {
        let mut inner = self.lock();
        inner.raw.remove(&sheet);
        inner.rows.insert(sheet, rows);
    }

    /// Serve `payload` verbatim on the next reads of `sheet`.
    pub fn serve_raw(&self, sheet: Sheet, payload: Value) {
        self.lock().raw.insert(sheet, payload);
    }

    pub fn fail_fetch(&self, sheet: Sheet, message: &str) {
        self.lock()
            .reported
            .insert((sheet, Op::Fetch), message.to_string());
    }

    pub fn fail_create(&self, sheet: Sheet, message: &str) {
        self.lock()
            .reported
            .insert((sheet, Op::Create), message.to_string());
    }

    pub fn fail_delete(&self, sheet: Sheet, message: &str) {
        self.lock()
            .reported
            .insert((sheet, Op::Delete), message.to_string());
    }

    /// Make every call to `sheet` fail as if the network were down.
    pub fn take_offline(&self, sheet: Sheet) {
        self.lock().offline.insert(sheet);
    }

    pub fn rows(&self, sheet: Sheet) -> Vec<Value> {
        self.lock().rows.get(&sheet).cloned().unwrap_or_default()
    }

    /// Every write envelope received, in order.
    pub fn submissions(&self) -> Vec<(Sheet, Value)> {
        self.lock().submissions.clone()
    }

    fn check_online(inner: &Inner, sheet: Sheet) -> Result<()> {
        if inner.offline.contains(&sheet) {
            return Err(RsvpError::Network {
                message: format!("{sheet} sheet unreachable"),
            });
        }
        Ok(())
    }
}

fn matches_id(row: &Value, key: &str, id: &str) -> bool {
    row.get(key)
        .and_then(scalar_to_string)
        .is_some_and(|v| v.trim() == id.trim())
}

#[async_trait]
impl SheetBackend for MemorySheets {
    async fn fetch(&self, sheet: Sheet) -> Result<UpstreamReply> {
        let inner = self.lock();
        Self::check_online(&inner, sheet)?;
        if let Some(message) = inner.reported.get(&(sheet, Op::Fetch)) {
            return Ok(UpstreamReply::Error(message.clone()));
        }
        if let Some(raw) = inner.raw.get(&sheet) {
            return Ok(UpstreamReply::classify(raw.clone()));
        }
        let rows = inner.rows.get(&sheet).cloned().unwrap_or_default();
        Ok(UpstreamReply::Records(Value::Array(rows)))
    }

    async fn submit(&self, sheet: Sheet, envelope: Value) -> Result<UpstreamReply> {
        let mut inner = self.lock();
        Self::check_online(&inner, sheet)?;
        inner.submissions.push((sheet, envelope.clone()));

        let Value::Object(mut fields) = envelope else {
            return Ok(UpstreamReply::Error("Invalid request body".into()));
        };
        let op = match fields.remove("action").as_ref().and_then(Value::as_str) {
            Some("create") => Op::Create,
            Some("update") => Op::Update,
            Some("delete") => Op::Delete,
            other => {
                return Ok(UpstreamReply::Error(format!(
                    "Unknown action: {}",
                    other.unwrap_or("none")
                )));
            }
        };
        if let Some(message) = inner.reported.get(&(sheet, op)) {
            return Ok(UpstreamReply::Error(message.clone()));
        }

        let key = sheet.id_field();
        let id = fields
            .get(key)
            .and_then(scalar_to_string)
            .unwrap_or_default();

        match op {
            Op::Create => {
                if sheet == Sheet::Guests && !fields.contains_key("id") {
                    let next = inner.next_id;
                    inner.next_id += 1;
                    fields.insert("id".into(), json!(next));
                }
                let row = Value::Object(fields);
                inner.rows.entry(sheet).or_default().push(row.clone());
                Ok(UpstreamReply::Records(
                    json!({ "success": true, "data": row }),
                ))
            }
            Op::Update => {
                let rows = inner.rows.entry(sheet).or_default();
                let Some(row) = rows.iter_mut().find(|r| matches_id(r, key, &id)) else {
                    return Ok(UpstreamReply::Error(format!("Record not found: {id}")));
                };
                if let Value::Object(existing) = row {
                    merge(existing, fields);
                }
                Ok(UpstreamReply::Records(
                    json!({ "success": true, "data": row.clone() }),
                ))
            }
            Op::Delete => {
                let rows = inner.rows.entry(sheet).or_default();
                let before = rows.len();
                rows.retain(|r| !matches_id(r, key, &id));
                if rows.len() == before {
                    return Ok(UpstreamReply::Error(format!("Record not found: {id}")));
                }
                Ok(UpstreamReply::Records(json!({ "success": true })))
            }
            Op::Fetch => Ok(UpstreamReply::Error("Unknown action: fetch".into())),
        }
    }
}

fn merge(existing: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (k, v) in fields {
        existing.insert(k, v);
    }
}
