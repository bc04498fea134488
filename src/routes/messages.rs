use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::warn;

use super::{AppState, body};
use crate::error::{ApiError, RsvpError};
use crate::model::Message;
use crate::normalize::{parse_messages, validate_message};
use crate::sheets::Sheet;

/// Guestbook entries, newest first. A payload with no recognizable rows is
/// served as an empty list rather than an error.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    match state.sheets.fetch_all(Sheet::Messages).await {
        Ok(rows) => Ok(Json(parse_messages(&rows))),
        Err(RsvpError::MalformedShape { sheet }) => {
            warn!(%sheet, "guestbook payload had no rows, serving empty list");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(ApiError::with_context("Failed to fetch messages", e)),
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = body(payload)?;
    let message = validate_message(&input, Utc::now())?;

    let mut fields = Map::new();
    fields.insert("timestamp".into(), Value::String(message.timestamp));
    fields.insert("name".into(), Value::String(message.name));
    fields.insert("message".into(), Value::String(message.message));

    let reply = state
        .sheets
        .create(Sheet::Messages, fields)
        .await
        .map_err(|e| ApiError::with_context("Failed to add message", e))?;
    Ok((StatusCode::CREATED, Json(reply)))
}
