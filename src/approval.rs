//! Turning a join request into a guest.
//!
//! Two upstream calls with no transaction between them: create the guest,
//! then delete the request row. If the delete fails the guest stays; the
//! request row is left for the admin to clear by hand.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::deserializers::scalar_to_string;
use crate::error::{Result, RsvpError};
use crate::normalize::{
    GuestCreatePayload, lookup, normalize_guest_for_read, normalize_guest_requests,
};
use crate::sheets::{Sheet, SheetClient};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    /// Upstream reply for a fresh create, or the existing guest row.
    pub guest: Value,
    /// False when a guest with the same name already existed.
    pub created: bool,
    pub request_removed: bool,
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub async fn approve_guest_request(sheets: &SheetClient, name: &str) -> Result<ApprovalOutcome> {
    // The proxy deletes by exact cell text, so keep the name as stored.
    let rows = sheets.fetch_all(Sheet::GuestRequests).await?;
    let (request, stored_name) = rows
        .into_iter()
        .find_map(|row| {
            let stored = lookup(&row, "Name").and_then(scalar_to_string)?;
            let request = normalize_guest_requests(vec![row]).into_iter().next()?;
            same_name(&request.name, name).then_some((request, stored))
        })
        .ok_or_else(|| RsvpError::NotFound {
            message: "Guest request not found".into(),
        })?;

    let existing = sheets
        .fetch_all(Sheet::Guests)
        .await?
        .iter()
        .map(normalize_guest_for_read)
        .find(|g| g.has_name(&request.name));

    let (guest, created) = match existing {
        Some(guest) => {
            info!(name = %request.name, id = %guest.id, "guest already on the list, reusing");
            (serde_json::to_value(&guest)?, false)
        }
        None => {
            let payload = GuestCreatePayload::from_request(&request, Utc::now());
            let reply = sheets.create(Sheet::Guests, payload.to_fields()).await?;
            info!(name = %request.name, status = %payload.status, "guest created from request");
            (reply, true)
        }
    };

    let request_removed = match sheets.delete(Sheet::GuestRequests, &stored_name).await {
        Ok(_) => true,
        Err(e) => {
            warn!(name = %request.name, error = %e, "guest approved but request row not removed");
            false
        }
    };

    Ok(ApprovalOutcome {
        guest,
        created,
        request_removed,
    })
}
