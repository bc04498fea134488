//! Guestbook rows. Column order in the sheet is not fixed: the first array
//! row is a header, and each role is located by case-insensitive substring
//! match against it.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::guest::iso_timestamp;
use super::{ValidationError, required_text};
use crate::deserializers::scalar_to_string;
use crate::model::Message;

const DEFAULT_NAME_COLUMN: usize = 0;
const DEFAULT_MESSAGE_COLUMN: usize = 1;
const DEFAULT_TIMESTAMP_COLUMN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub message: usize,
    pub timestamp: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME_COLUMN,
            message: DEFAULT_MESSAGE_COLUMN,
            timestamp: DEFAULT_TIMESTAMP_COLUMN,
        }
    }
}

impl ColumnMap {
    pub fn from_header(header: &[Value]) -> Self {
        let find = |needle: &str, fallback: usize| {
            header
                .iter()
                .position(|cell| {
                    scalar_to_string(cell).is_some_and(|s| s.to_lowercase().contains(needle))
                })
                .unwrap_or(fallback)
        };
        Self {
            name: find("name", DEFAULT_NAME_COLUMN),
            message: find("message", DEFAULT_MESSAGE_COLUMN),
            timestamp: find("timestamp", DEFAULT_TIMESTAMP_COLUMN),
        }
    }

    fn read(&self, cells: &[Value]) -> Option<Message> {
        let cell = |i: usize| {
            cells
                .get(i)
                .and_then(scalar_to_string)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        build(cell(self.timestamp), cell(self.name), cell(self.message))
    }
}

fn build(timestamp: String, name: String, message: String) -> Option<Message> {
    if name.is_empty() && message.is_empty() {
        return None;
    }
    Some(Message {
        timestamp,
        name,
        message,
    })
}

/// Object rows are matched the same way, against their keys.
fn from_object(row: &serde_json::Map<String, Value>) -> Option<Message> {
    let pick = |needle: &str| {
        row.iter()
            .find(|(k, _)| k.to_lowercase().contains(needle))
            .and_then(|(_, v)| scalar_to_string(v))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    build(pick("timestamp"), pick("name"), pick("message"))
}

/// Parses guestbook rows, newest first. Blank rows are dropped.
pub fn parse_messages(rows: &[Value]) -> Vec<Message> {
    let mut columns: Option<ColumnMap> = None;
    let mut messages = Vec::new();
    for row in rows {
        match row {
            Value::Array(cells) => {
                let Some(map) = columns.as_ref() else {
                    columns = Some(ColumnMap::from_header(cells));
                    continue;
                };
                messages.extend(map.read(cells));
            }
            Value::Object(fields) => messages.extend(from_object(fields)),
            _ => {}
        }
    }
    messages.reverse();
    messages
}

pub fn validate_message(input: &Value, now: DateTime<Utc>) -> Result<Message, ValidationError> {
    let name = required_text(input, "name", "name", "Name")?;
    let message = required_text(input, "message", "message", "Message")?;
    Ok(Message {
        timestamp: iso_timestamp(now),
        name,
        message,
    })
}
