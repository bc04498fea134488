use axum::{Json, extract::State};

use super::AppState;
use crate::config::SiteConfig;

/// Event details shown on the landing page, straight from `[site]`.
pub async fn show(State(state): State<AppState>) -> Json<SiteConfig> {
    Json(state.config.site.clone())
}
