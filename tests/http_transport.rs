//! reqwest transports against real sockets: the sheet backend against a
//! fake proxy script, and the browser-side API client against the app.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use celebration_rsvp::{
    client::{
        Attendance, GuestSearch, HttpRsvpApi, JoinPhase, JoinRequestForm, RosterEvent,
        RosterEvents, RsvpApi, RsvpForm, RsvpPhase,
    },
    config::{Config, UpstreamConfig},
    error::RsvpError,
    http::build_router,
    routes::AppState,
    sheets::{HttpSheetBackend, MemorySheets, Sheet, SheetClient},
};
use serde_json::{Value, json};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct Script {
    hits: Arc<AtomicUsize>,
    posts: Arc<std::sync::Mutex<Vec<Value>>>,
}

async fn flaky_guests(State(script): State<Script>) -> (StatusCode, Json<Value>) {
    let n = script.hits.fetch_add(1, Ordering::SeqCst);
    if n == 0 {
        return (StatusCode::BAD_GATEWAY, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({ "data": [{ "id": 1, "name": "Ana" }] })),
    )
}

async fn record_post(State(script): State<Script>, Json(body): Json<Value>) -> Json<Value> {
    script.posts.lock().unwrap().push(body.clone());
    Json(json!({ "success": true, "data": body }))
}

async fn always_down(State(script): State<Script>) -> StatusCode {
    script.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::SERVICE_UNAVAILABLE
}

async fn reports_error() -> Json<Value> {
    Json(json!({ "error": "Sheet 'Messages' not found" }))
}

fn upstream(base: &str, retries: u32) -> UpstreamConfig {
    UpstreamConfig {
        guests_url: format!("{base}/guests"),
        messages_url: format!("{base}/messages"),
        entourage_url: format!("{base}/entourage"),
        timeout_ms: 2_000,
        read_retries: retries,
        ..UpstreamConfig::default()
    }
}

#[tokio::test]
async fn test_reads_retry_then_succeed() {
    let script = Script::default();
    let base = serve(
        Router::new()
            .route("/guests", get(flaky_guests).post(record_post))
            .with_state(script.clone()),
    )
    .await;
    let client = SheetClient::new(Arc::new(HttpSheetBackend::new(upstream(&base, 1)).unwrap()));

    let rows = client.fetch_all(Sheet::Guests).await.unwrap();
    assert_eq!(rows, vec![json!({ "id": 1, "name": "Ana" })]);
    assert_eq!(script.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_non_ok_status_is_unavailable_after_retries() {
    let script = Script::default();
    let base = serve(
        Router::new()
            .route("/entourage", get(always_down))
            .with_state(script.clone()),
    )
    .await;
    let client = SheetClient::new(Arc::new(HttpSheetBackend::new(upstream(&base, 2)).unwrap()));

    let err = client.fetch_all(Sheet::Entourage).await.unwrap_err();
    assert!(matches!(
        err,
        RsvpError::UpstreamUnavailable {
            sheet: Sheet::Entourage,
            status: 503
        }
    ));
    assert_eq!(script.hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_reported_error_and_missing_endpoint() {
    let base = serve(Router::new().route("/messages", get(reports_error))).await;
    let client = SheetClient::new(Arc::new(HttpSheetBackend::new(upstream(&base, 0)).unwrap()));

    let err = client.fetch_all(Sheet::Messages).await.unwrap_err();
    assert!(matches!(err, RsvpError::Upstream { ref message } if message == "Sheet 'Messages' not found"));

    let err = client.fetch_all(Sheet::PrincipalSponsors).await.unwrap_err();
    assert!(matches!(err, RsvpError::Config { .. }));
}

#[tokio::test]
async fn test_writes_post_the_envelope_once() {
    let script = Script::default();
    let base = serve(
        Router::new()
            .route("/guests", get(flaky_guests).post(record_post))
            .with_state(script.clone()),
    )
    .await;
    let client = SheetClient::new(Arc::new(HttpSheetBackend::new(upstream(&base, 3)).unwrap()));

    let mut fields = serde_json::Map::new();
    fields.insert("status".into(), json!("confirmed"));
    client.update(Sheet::Guests, "12", fields).await.unwrap();

    let posts = script.posts.lock().unwrap().clone();
    assert_eq!(
        posts,
        vec![json!({ "action": "update", "id": "12", "status": "confirmed" })]
    );
}

#[tokio::test]
async fn test_rsvp_round_trip_through_live_api() {
    let sheets = Arc::new(MemorySheets::new());
    sheets.seed(
        Sheet::Guests,
        vec![json!({ "id": 5, "name": "Ana Reyes", "status": "pending" })],
    );
    let state = AppState::new(Arc::new(Config::default()), SheetClient::new(sheets.clone()));
    let base = serve(build_router(state)).await;

    let api = HttpRsvpApi::new(base, Duration::from_secs(2)).unwrap();
    let events = RosterEvents::new();
    let mut rx = events.subscribe();

    let roster = api.list_guests().await.unwrap();
    assert_eq!(roster.len(), 1);

    let mut form = RsvpForm::new(roster[0].clone());
    form.choose(Attendance::Attending).unwrap();
    form.set_message("See you there").unwrap();
    form.submit(&api, &events).await.unwrap();

    assert_eq!(form.phase(), RsvpPhase::Confirmed);
    assert_eq!(rx.recv().await.unwrap(), RosterEvent::GuestUpdated { id: "5".into() });
    assert_eq!(sheets.rows(Sheet::Guests)[0]["status"], json!("confirmed"));

    let refreshed = api.list_guests().await.unwrap();
    assert_eq!(RsvpForm::new(refreshed[0].clone()).phase(), RsvpPhase::AlreadyResponded);
}

#[tokio::test]
async fn test_api_errors_surface_server_message() {
    let sheets = Arc::new(MemorySheets::new());
    let state = AppState::new(Arc::new(Config::default()), SheetClient::new(sheets));
    let base = serve(build_router(state)).await;
    let api = HttpRsvpApi::new(base, Duration::from_secs(2)).unwrap();

    let err = api
        .update_guest("99", serde_json::Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RsvpError::Upstream { ref message } if message == "Failed to update guest"));
}

#[tokio::test]
async fn test_request_to_join_lands_in_sheet() {
    let sheets = Arc::new(MemorySheets::new());
    sheets.seed(
        Sheet::Guests,
        vec![json!({ "id": 1, "name": "Maria Santos", "status": "pending" })],
    );
    let state = AppState::new(Arc::new(Config::default()), SheetClient::new(sheets.clone()));
    let base = serve(build_router(state)).await;
    let api = HttpRsvpApi::new(base, Duration::from_secs(2)).unwrap();
    let events = RosterEvents::new();
    let mut rx = events.subscribe();

    let mut search = GuestSearch::new(api.list_guests().await.unwrap());
    search.type_query("Marla Santos");
    assert!(search.request_to_join());

    let mut form = JoinRequestForm::from_search(search.state()).unwrap();
    {
        let request = form.edit().unwrap();
        request.email = "marla@example.com".into();
        request.rsvp = "Yes".into();
        request.guest = "2".into();
    }
    form.submit(&api, &events).await.unwrap();

    assert_eq!(form.phase(), JoinPhase::Sent);
    assert_eq!(
        rx.recv().await.unwrap(),
        RosterEvent::RequestSubmitted {
            name: "Marla Santos".into()
        }
    );
    let rows = sheets.rows(Sheet::GuestRequests);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Name"], json!("Marla Santos"));
    assert_eq!(rows[0]["Email"], json!("marla@example.com"));
    assert_eq!(rows[0]["RSVP"], json!("Yes"));
}
