//! Read-mostly sheet rows: guestbook messages, join requests, sponsors.

use serde::{Deserialize, Serialize};

use crate::deserializers::de_cell_string;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: String,
    pub name: String,
    pub message: String,
}

/// A request from someone not on the list to be added to it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuestRequest {
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "de_cell_string")]
    pub name: String,
    #[serde(rename = "Email", alias = "email", default, deserialize_with = "de_cell_string")]
    pub email: String,
    #[serde(rename = "Phone", alias = "phone", default, deserialize_with = "de_cell_string")]
    pub phone: String,
    /// `"Yes"` / `"No"`
    #[serde(rename = "RSVP", alias = "rsvp", default, deserialize_with = "de_cell_string")]
    pub rsvp: String,
    /// Requested headcount, as typed.
    #[serde(rename = "Guest", alias = "guest", default, deserialize_with = "de_cell_string")]
    pub guest: String,
    #[serde(rename = "Message", alias = "message", default, deserialize_with = "de_cell_string")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalSponsor {
    #[serde(rename = "MalePrincipalSponsor", default, deserialize_with = "de_cell_string")]
    pub male: String,
    #[serde(rename = "FemalePrincipalSponsor", default, deserialize_with = "de_cell_string")]
    pub female: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guest_request_accepts_loose_cells() {
        let req: GuestRequest = serde_json::from_value(json!({
            "Name": "  Bob ",
            "Phone": 9171234567u64,
            "RSVP": "Yes",
            "Guest": 2
        }))
        .unwrap();
        assert_eq!(req.name, "Bob");
        assert_eq!(req.phone, "9171234567");
        assert_eq!(req.guest, "2");
        assert_eq!(req.email, "");
    }

    #[test]
    fn guest_request_accepts_lowercase_keys() {
        let req: GuestRequest =
            serde_json::from_value(json!({ "name": "Cara", "message": "Hi" })).unwrap();
        assert_eq!(req.name, "Cara");
        assert_eq!(req.message, "Hi");
    }
}
