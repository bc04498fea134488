use axum::{Json, extract::State};

use super::AppState;
use crate::error::{self, ApiError};
use crate::model::{EntourageGroup, EntourageMember, group_entourage};
use crate::normalize::normalize_entourage;
use crate::sheets::Sheet;

async fn members(state: &AppState) -> error::Result<Vec<EntourageMember>> {
    let rows = state.sheets.fetch_all(Sheet::Entourage).await?;
    Ok(normalize_entourage(rows))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<EntourageMember>>, ApiError> {
    members(&state)
        .await
        .map(Json)
        .map_err(|e| ApiError::with_context("Failed to fetch entourage", e))
}

/// Members grouped by category and paired for the two-column layout.
pub async fn grouped(
    State(state): State<AppState>,
) -> Result<Json<Vec<EntourageGroup>>, ApiError> {
    members(&state)
        .await
        .map(|list| Json(group_entourage(&list)))
        .map_err(|e| ApiError::with_context("Failed to fetch entourage", e))
}
