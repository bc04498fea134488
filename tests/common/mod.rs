#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use celebration_rsvp::{
    config::Config,
    http::build_router,
    routes::AppState,
    sheets::{MemorySheets, SheetClient},
};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSCODE: &str = "forever-and-always";

pub fn app(sheets: Arc<MemorySheets>) -> Router {
    build_router(AppState::new(
        Arc::new(Config::default()),
        SheetClient::new(sheets),
    ))
}

pub fn app_with_admin(sheets: Arc<MemorySheets>) -> Router {
    let mut config = Config::default();
    config.runtime.admin_passcode = Some(PASSCODE.to_string());
    build_router(AppState::new(Arc::new(config), SheetClient::new(sheets)))
}

/// Sends one request through the router. Non-JSON bodies come back as a
/// JSON string.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}
