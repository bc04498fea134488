//! Record normalization: every row read from or written to a sheet passes
//! through here so that defaults and coercions live in one place.

pub mod guest;
pub mod message;
pub mod records;

use serde_json::Value;
use thiserror::Error;

use crate::model::GuestStatus;

pub use guest::{
    GuestCreatePayload, GuestUpdate, normalize_guest_at, normalize_guest_for_read,
    validate_guest_create, validate_guest_create_at, validate_guest_delete, validate_guest_update,
};
pub use message::{ColumnMap, parse_messages, validate_message};
pub use records::{
    normalize_entourage, normalize_guest_requests, normalize_sponsors, validate_guest_request,
    validate_request_name,
};

/// Client input rejected before anything is sent upstream. The `Display`
/// text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    MissingField {
        field: &'static str,
        label: &'static str,
    },

    #[error("Invalid RSVP status. Must be one of: {allowed}", allowed = GuestStatus::allowed_list())]
    InvalidEnum { field: &'static str, value: String },
}

/// Looks a field up by exact key first, then by a loose match that ignores
/// case, spaces and underscores (`"Allowed Guests"` finds `allowedGuests`).
pub fn lookup<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    let map = raw.as_object()?;
    if let Some(v) = map.get(key) {
        return Some(v);
    }
    let wanted = loose_key(key);
    map.iter()
        .find(|(k, _)| loose_key(k) == wanted)
        .map(|(_, v)| v)
}

fn loose_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A required text field: must be a string that is non-blank after trimming.
pub(crate) fn required_text(
    input: &Value,
    key: &str,
    field: &'static str,
    label: &'static str,
) -> Result<String, ValidationError> {
    match input.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ValidationError::MissingField { field, label }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_is_forgiving_about_casing() {
        let raw = json!({ "Allowed Guests": 3, "EMAIL": "a@b.c" });
        assert_eq!(lookup(&raw, "allowedGuests"), Some(&json!(3)));
        assert_eq!(lookup(&raw, "email"), Some(&json!("a@b.c")));
        assert_eq!(lookup(&raw, "contact"), None);
        assert_eq!(lookup(&json!([1, 2]), "email"), None);
    }

    #[test]
    fn messages_are_field_specific() {
        let err = ValidationError::MissingField {
            field: "status",
            label: "Attendance/RSVP Status",
        };
        assert_eq!(err.to_string(), "Attendance/RSVP Status is required");
        let err = ValidationError::InvalidEnum {
            field: "status",
            value: "maybe".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid RSVP status. Must be one of: pending, confirmed, declined, request"
        );
    }
}
