//! Dashboard login and the actions that need it.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use serde_json::Value;

use super::{AppState, body};
use crate::approval::{ApprovalOutcome, approve_guest_request};
use crate::error::ApiError;
use crate::normalize::validate_request_name;
use crate::session::AdminSession;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<AdminSession, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        if state.sessions.enabled() {
            ApiError::unauthorized("Missing bearer token")
        } else {
            ApiError::new(StatusCode::FORBIDDEN, "Admin dashboard is disabled")
        }
    })?;
    state
        .sessions
        .validate(token)
        .await
        .map_err(|e| ApiError::with_context("Failed to validate session", e))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AdminSession>), ApiError> {
    let input = body(payload)?;
    let passcode = input
        .get("passcode")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let session = state
        .sessions
        .issue(passcode)
        .await
        .map_err(|e| ApiError::with_context("Failed to start session", e))?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn current(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminSession>, ApiError> {
    require_session(&state, &headers).await.map(Json)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token).await;
    }
    StatusCode::NO_CONTENT
}

pub async fn approve_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApprovalOutcome>, ApiError> {
    require_session(&state, &headers).await?;
    let input = body(payload)?;
    let name = validate_request_name(&input)?;
    approve_guest_request(&state.sheets, &name)
        .await
        .map(Json)
        .map_err(|e| ApiError::with_context("Failed to approve guest request", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);
    }
}
