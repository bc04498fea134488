//! JSON API under `/api`. Each handler validates its input, makes one (or,
//! for approvals, a few) upstream calls and converts every failure into an
//! `{"error": ...}` body.

pub mod admin;
pub mod entourage;
pub mod guest_requests;
pub mod guests;
pub mod messages;
pub mod principal_sponsor;
pub mod site;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{get, post},
};
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::sheets::SheetClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sheets: SheetClient,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, sheets: SheetClient) -> Self {
        let sessions = SessionStore::new(
            config.runtime.admin_passcode.as_deref(),
            config.runtime.session_ttl_min,
        );
        Self {
            config,
            sheets,
            sessions: Arc::new(sessions),
        }
    }
}

/// Unwraps a JSON body, answering 400 for anything that does not parse.
pub(crate) fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected request body");
            Err(ApiError::bad_request("Invalid JSON body"))
        }
    }
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/guests",
            get(guests::list)
                .post(guests::create)
                .put(guests::update)
                .delete(guests::remove),
        )
        .route("/api/messages", get(messages::list).post(messages::create))
        .route(
            "/api/guest-requests",
            get(guest_requests::list)
                .post(guest_requests::create)
                .delete(guest_requests::remove),
        )
        .route("/api/entourage", get(entourage::list))
        .route("/api/entourage/grouped", get(entourage::grouped))
        .route("/api/principal-sponsor", get(principal_sponsor::list))
        .route("/api/site", get(site::show))
        .route(
            "/api/admin/session",
            post(admin::login).get(admin::current).delete(admin::logout),
        )
        .route(
            "/api/admin/guest-requests/approve",
            post(admin::approve_request),
        )
}
