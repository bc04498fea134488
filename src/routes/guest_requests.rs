use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Map, Value};
use tracing::info;

use super::{AppState, body};
use crate::error::{ApiError, RsvpError};
use crate::model::GuestRequest;
use crate::normalize::{normalize_guest_requests, validate_guest_request, validate_request_name};
use crate::sheets::Sheet;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<GuestRequest>>, ApiError> {
    let rows = state
        .sheets
        .fetch_all(Sheet::GuestRequests)
        .await
        .map_err(|e| ApiError::with_context("Failed to fetch guest requests", e))?;
    Ok(Json(normalize_guest_requests(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = body(payload)?;
    let request = validate_guest_request(&input)?;
    let fields = match serde_json::to_value(&request) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            return Err(ApiError::with_context(
                "Failed to add guest request",
                RsvpError::from(e),
            ));
        }
    };
    let reply = state
        .sheets
        .create(Sheet::GuestRequests, fields)
        .await
        .map_err(|e| ApiError::with_context("Failed to add guest request", e))?;
    info!(name = %request.name, "guest request submitted");
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn remove(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload)?;
    let name = validate_request_name(&input)?;
    let reply = state
        .sheets
        .delete(Sheet::GuestRequests, &name)
        .await
        .map_err(|e| ApiError::with_context("Failed to delete guest request", e))?;
    Ok(Json(reply))
}
