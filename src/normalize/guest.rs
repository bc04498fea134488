use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ValidationError, lookup, required_text};
use crate::deserializers::{headcount_or_one, scalar_to_string, trimmed_or_empty};
use crate::model::{Companion, Guest, GuestRequest, GuestStatus};

const DEFAULT_ROLE: &str = "Guest";

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_blank(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn read_status(value: Option<&Value>) -> GuestStatus {
    let text = trimmed_or_empty(value);
    if text.is_empty() {
        return GuestStatus::Pending;
    }
    GuestStatus::parse(&text.to_lowercase()).unwrap_or_else(|| {
        tracing::debug!(status = %text, "unknown guest status on read, treating as pending");
        GuestStatus::Pending
    })
}

/// Companions may arrive as an array or as JSON text stored in a cell.
fn read_companions(value: Option<&Value>) -> Vec<Companion> {
    let list = match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter()
        .filter_map(|item| {
            let name = trimmed_or_empty(lookup(item, "name"));
            non_blank(name).map(|name| Companion {
                name,
                relationship: trimmed_or_empty(lookup(item, "relationship")),
            })
        })
        .collect()
}

fn read_vip(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "TRUE",
        _ => false,
    }
}

fn read_stamp(value: Option<&Value>, fallback: &str) -> String {
    non_blank(trimmed_or_empty(value)).unwrap_or_else(|| fallback.to_string())
}

/// Canonical guest from whatever the sheet returned.
pub fn normalize_guest_for_read(raw: &Value) -> Guest {
    normalize_guest_at(raw, Utc::now())
}

pub fn normalize_guest_at(raw: &Value, now: DateTime<Utc>) -> Guest {
    let stamp = iso_timestamp(now);
    Guest {
        id: lookup(raw, "id")
            .and_then(scalar_to_string)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        name: trimmed_or_empty(lookup(raw, "name")),
        role: non_blank(trimmed_or_empty(lookup(raw, "role")))
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        email: trimmed_or_empty(lookup(raw, "email")),
        contact: trimmed_or_empty(lookup(raw, "contact")),
        message: trimmed_or_empty(lookup(raw, "message")),
        allowed_guests: headcount_or_one(lookup(raw, "allowedGuests")),
        companions: read_companions(lookup(raw, "companions")),
        table_number: trimmed_or_empty(lookup(raw, "tableNumber")),
        is_vip: read_vip(lookup(raw, "isVip")),
        status: read_status(lookup(raw, "status")),
        added_by: non_blank(trimmed_or_empty(lookup(raw, "addedBy"))),
        created_at: read_stamp(lookup(raw, "createdAt"), &stamp),
        updated_at: read_stamp(lookup(raw, "updatedAt"), &stamp),
    }
}

/// Fields sent upstream with `action: "create"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestCreatePayload {
    pub name: String,
    pub role: String,
    pub email: String,
    pub contact: String,
    pub message: String,
    pub allowed_guests: u32,
    pub companions: Vec<Companion>,
    pub table_number: String,
    pub is_vip: bool,
    pub status: GuestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl GuestCreatePayload {
    pub fn to_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Guest created when an admin approves a join request.
    pub fn from_request(request: &GuestRequest, now: DateTime<Utc>) -> Self {
        let stamp = iso_timestamp(now);
        let status = if request.rsvp == "Yes" {
            GuestStatus::Confirmed
        } else {
            GuestStatus::Pending
        };
        let headcount = Value::String(request.guest.clone());
        Self {
            name: request.name.trim().to_string(),
            role: DEFAULT_ROLE.to_string(),
            email: request.email.trim().to_string(),
            contact: request.phone.trim().to_string(),
            message: request.message.trim().to_string(),
            allowed_guests: headcount_or_one(Some(&headcount)),
            companions: Vec::new(),
            table_number: String::new(),
            is_vip: false,
            status,
            added_by: Some("Guest Request".to_string()),
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }
}

pub fn validate_guest_create(input: &Value) -> Result<GuestCreatePayload, ValidationError> {
    validate_guest_create_at(input, Utc::now())
}

pub fn validate_guest_create_at(
    input: &Value,
    now: DateTime<Utc>,
) -> Result<GuestCreatePayload, ValidationError> {
    let name = required_text(input, "name", "name", "Full Name")?;
    let status = match input.get("status") {
        Some(Value::String(s)) if !s.is_empty() => s,
        _ => {
            return Err(ValidationError::MissingField {
                field: "status",
                label: "Attendance/RSVP Status",
            });
        }
    };
    let status = GuestStatus::parse(status).ok_or_else(|| ValidationError::InvalidEnum {
        field: "status",
        value: status.clone(),
    })?;

    let stamp = iso_timestamp(now);
    Ok(GuestCreatePayload {
        name,
        role: non_blank(trimmed_or_empty(input.get("role")))
            .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
        email: trimmed_or_empty(input.get("email")),
        contact: trimmed_or_empty(input.get("contact")),
        message: trimmed_or_empty(input.get("message")),
        allowed_guests: headcount_or_one(input.get("allowedGuests")),
        companions: read_companions(input.get("companions")),
        table_number: trimmed_or_empty(input.get("tableNumber")),
        is_vip: read_vip(input.get("isVip")),
        status,
        added_by: non_blank(trimmed_or_empty(input.get("addedBy"))),
        created_at: stamp.clone(),
        updated_at: stamp,
    })
}

/// A partial update: the id plus every other provided field, forwarded as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestUpdate {
    pub id: String,
    pub fields: Map<String, Value>,
}

fn required_id(input: &Value) -> Result<String, ValidationError> {
    required_text(input, "id", "id", "Guest ID")
}

/// Updates enforce the same status allow-list as creates. A null status is
/// dropped rather than forwarded.
pub fn validate_guest_update(input: &Value) -> Result<GuestUpdate, ValidationError> {
    let id = required_id(input)?;
    let mut fields = input.as_object().cloned().unwrap_or_default();
    fields.remove("id");
    fields.remove("action");

    match fields.get("status").cloned() {
        None => {}
        Some(Value::Null) => {
            fields.remove("status");
        }
        Some(Value::String(s)) if GuestStatus::parse(&s).is_some() => {}
        Some(other) => {
            return Err(ValidationError::InvalidEnum {
                field: "status",
                value: scalar_to_string(&other).unwrap_or_else(|| other.to_string()),
            });
        }
    }

    if let Some(name) = fields.get("name").cloned() {
        match name {
            Value::String(s) if !s.trim().is_empty() => {
                let trimmed = s.trim().to_string();
                fields.insert("name".into(), Value::String(trimmed));
            }
            _ => {
                return Err(ValidationError::MissingField {
                    field: "name",
                    label: "Full Name",
                });
            }
        }
    }

    if !fields.contains_key("updatedAt") {
        fields.insert(
            "updatedAt".into(),
            Value::String(iso_timestamp(Utc::now())),
        );
    }

    Ok(GuestUpdate { id, fields })
}

pub fn validate_guest_delete(input: &Value) -> Result<String, ValidationError> {
    required_id(input)
}
