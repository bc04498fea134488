//! Capitalized guest view consumed by the book of guests and the simple RSVP
//! widget. It is an adapter over [`Guest`], not a separate record.

use serde::{Deserialize, Serialize};

use super::guest::{Guest, GuestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyGuest {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    /// `"Yes"`, `"No"` or `""` when unanswered.
    #[serde(rename = "RSVP")]
    pub rsvp: String,
    /// Headcount for the party.
    #[serde(rename = "Guest")]
    pub guest: u32,
    #[serde(rename = "Message")]
    pub message: String,
}

pub fn rsvp_label(status: GuestStatus) -> &'static str {
    match status {
        GuestStatus::Confirmed => "Yes",
        GuestStatus::Declined => "No",
        GuestStatus::Pending | GuestStatus::Request => "",
    }
}

impl From<&Guest> for LegacyGuest {
    fn from(guest: &Guest) -> Self {
        Self {
            name: guest.name.clone(),
            email: guest.email.clone(),
            rsvp: rsvp_label(guest.status).to_string(),
            guest: guest.allowed_guests,
            message: guest.message.clone(),
        }
    }
}
