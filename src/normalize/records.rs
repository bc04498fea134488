//! Join requests, entourage and sponsor rows.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ValidationError, lookup};
use crate::deserializers::trimmed_or_empty;
use crate::model::{EntourageMember, GuestRequest, PrincipalSponsor};

/// Rows that fail to deserialize are dropped with a debug log; a sheet with a
/// stray header or notes row should not take the whole listing down.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!(kind = what, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect()
}

/// The request's `Name` (either casing), trimmed and non-blank.
pub fn validate_request_name(input: &Value) -> Result<String, ValidationError> {
    let name = trimmed_or_empty(lookup(input, "Name"));
    if name.is_empty() {
        return Err(ValidationError::MissingField {
            field: "Name",
            label: "Name",
        });
    }
    Ok(name)
}

pub fn validate_guest_request(input: &Value) -> Result<GuestRequest, ValidationError> {
    let name = validate_request_name(input)?;
    let text = |key: &str| trimmed_or_empty(lookup(input, key));
    Ok(GuestRequest {
        name,
        email: text("Email"),
        phone: text("Phone"),
        rsvp: text("RSVP"),
        guest: text("Guest"),
        message: text("Message"),
    })
}

pub fn normalize_guest_requests(rows: Vec<Value>) -> Vec<GuestRequest> {
    decode_rows::<GuestRequest>(rows, "guest-request")
        .into_iter()
        .filter(|r| !r.name.is_empty())
        .collect()
}

pub fn normalize_entourage(rows: Vec<Value>) -> Vec<EntourageMember> {
    decode_rows::<EntourageMember>(rows, "entourage")
        .into_iter()
        .filter(|m| !(m.name.is_empty() && m.role_category.is_empty()))
        .collect()
}

pub fn normalize_sponsors(rows: Vec<Value>) -> Vec<PrincipalSponsor> {
    decode_rows::<PrincipalSponsor>(rows, "principal-sponsor")
        .into_iter()
        .filter(|s| !(s.male.is_empty() && s.female.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_name_accepts_either_casing() {
        assert_eq!(validate_request_name(&json!({ "Name": " Bob " })).unwrap(), "Bob");
        assert_eq!(validate_request_name(&json!({ "name": "Ann" })).unwrap(), "Ann");
        let err = validate_request_name(&json!({ "Name": "  " })).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");
        assert!(validate_request_name(&json!({})).is_err());
    }

    #[test]
    fn guest_request_is_trimmed() {
        let req = validate_guest_request(&json!({
            "Name": "Bob",
            "Email": " b@x.com ",
            "Phone": 917,
            "RSVP": "Yes",
            "Guest": "2"
        }))
        .unwrap();
        assert_eq!(req.email, "b@x.com");
        assert_eq!(req.phone, "917");
        assert_eq!(req.guest, "2");
        assert_eq!(req.message, "");
    }

    #[test]
    fn blank_rows_are_dropped() {
        let sponsors = normalize_sponsors(vec![
            json!({ "MalePrincipalSponsor": " Mr. A ", "FemalePrincipalSponsor": "Mrs. A" }),
            json!({ "MalePrincipalSponsor": "", "FemalePrincipalSponsor": "  " }),
            json!({ "FemalePrincipalSponsor": "Mrs. B" }),
        ]);
        assert_eq!(sponsors.len(), 2);
        assert_eq!(sponsors[0].male, "Mr. A");
        assert_eq!(sponsors[1].male, "");

        let members = normalize_entourage(vec![
            json!({ "Name": "Leo", "RoleCategory": "Ring Bearer" }),
            json!({ "Name": "", "RoleCategory": "" }),
            json!("not a row"),
        ]);
        assert_eq!(members.len(), 1);

        let requests = normalize_guest_requests(vec![json!({ "Name": "Cara" }), json!({ "Email": "x" })]);
        assert_eq!(requests.len(), 1);
    }
}
