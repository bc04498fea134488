use std::fmt;

use serde::{Deserialize, Serialize};

/// RSVP state of an invited party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
    Request,
}

impl GuestStatus {
    pub const ALL: [GuestStatus; 4] = [
        GuestStatus::Pending,
        GuestStatus::Confirmed,
        GuestStatus::Declined,
        GuestStatus::Request,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Pending => "pending",
            GuestStatus::Confirmed => "confirmed",
            GuestStatus::Declined => "declined",
            GuestStatus::Request => "request",
        }
    }

    /// Exact, case-sensitive match against the allow-list.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// `"pending, confirmed, declined, request"`
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(GuestStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the guest has answered (accepted or declined).
    pub fn is_answered(&self) -> bool {
        matches!(self, GuestStatus::Confirmed | GuestStatus::Declined)
    }
}

impl fmt::Display for GuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Companion {
    pub name: String,
    #[serde(default)]
    pub relationship: String,
}

/// Canonical guest record as served to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Guest {
    /// Case-insensitive comparison on trimmed names.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}
