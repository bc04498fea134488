use axum::{Json, extract::State};

use super::AppState;
use crate::error::ApiError;
use crate::model::PrincipalSponsor;
use crate::normalize::normalize_sponsors;
use crate::sheets::Sheet;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PrincipalSponsor>>, ApiError> {
    let rows = state
        .sheets
        .fetch_all(Sheet::PrincipalSponsors)
        .await
        .map_err(|e| ApiError::with_context("Failed to fetch principal sponsors", e))?;
    Ok(Json(normalize_sponsors(rows)))
}
