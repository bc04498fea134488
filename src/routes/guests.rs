use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{AppState, body};
use crate::error::{ApiError, RsvpError};
use crate::model::{Guest, LegacyGuest};
use crate::normalize::{
    normalize_guest_for_read, validate_guest_create, validate_guest_delete, validate_guest_update,
};
use crate::sheets::Sheet;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `legacy` selects the capitalized `{Name, Email, RSVP, Guest, Message}` view.
    pub view: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let rows = state
        .sheets
        .fetch_all(Sheet::Guests)
        .await
        .map_err(|e| ApiError::with_context("Failed to fetch guests", e))?;
    let guests: Vec<Guest> = rows.iter().map(normalize_guest_for_read).collect();

    let rendered = match query.view.as_deref() {
        Some("legacy") => {
            let legacy: Vec<LegacyGuest> = guests.iter().map(LegacyGuest::from).collect();
            serde_json::to_value(legacy)
        }
        _ => serde_json::to_value(guests),
    };
    rendered
        .map(Json)
        .map_err(|e| ApiError::with_context("Failed to fetch guests", RsvpError::from(e)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = body(payload)?;
    let guest = validate_guest_create(&input)?;
    let reply = state
        .sheets
        .create(Sheet::Guests, guest.to_fields())
        .await
        .map_err(|e| ApiError::with_context("Failed to add guest", e))?;
    info!(name = %guest.name, status = %guest.status, "guest added");
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload)?;
    let update = validate_guest_update(&input)?;
    let reply = state
        .sheets
        .update(Sheet::Guests, &update.id, update.fields)
        .await
        .map_err(|e| ApiError::with_context("Failed to update guest", e))?;
    info!(id = %update.id, "guest updated");
    Ok(Json(reply))
}

pub async fn remove(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload)?;
    let id = validate_guest_delete(&input)?;
    let reply = state
        .sheets
        .delete(Sheet::Guests, &id)
        .await
        .map_err(|e| ApiError::with_context("Failed to delete guest", e))?;
    info!(%id, "guest deleted");
    Ok(Json(reply))
}
