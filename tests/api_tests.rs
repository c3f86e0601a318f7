mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

use common::{FakeParser, FakeSearch, PendingSearch, RecordingHandler};
use trackarr::clients::ReleaseSearch;
use trackarr::config::Config;
use trackarr::services::ScanPhase;
use trackarr::state::{Collaborators, SharedState};

struct TestApp {
    router: Router,
    shared: Arc<SharedState>,
    dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

async fn spawn_app_with(search: Arc<dyn ReleaseSearch>) -> TestApp {
    let dir = std::env::temp_dir().join(format!("trackarr_api_{}", uuid::Uuid::new_v4()));
    let mut config = Config::default();
    config.general.tracked_shows_file = dir.join("tracked_shows.json").display().to_string();
    config.general.known_shows_file = dir.join("known_shows.json").display().to_string();

    let collaborators = Collaborators {
        search,
        parser: Arc::new(FakeParser::default()),
        handler: Arc::new(RecordingHandler::default()),
    };
    let shared = Arc::new(SharedState::with_collaborators(config, collaborators, None).await);
    let router = trackarr::api::router(trackarr::api::create_app_state(Arc::clone(&shared)));

    TestApp {
        router,
        shared,
        dir,
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(FakeSearch::default())).await
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn frieren_form() -> Value {
    json!({
        "names": ["Sousou no Frieren", "Frieren"],
        "start_season": 1,
        "start_episode": 1,
        "end_season": 1,
        "end_episode": 4,
        "quality": "1080p"
    })
}

#[tokio::test]
async fn add_list_and_get_shows() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "POST", "/api/shows", Some(frieren_form())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["index"], json!(0));
    assert_eq!(
        body["data"]["needed_episodes"],
        json!([[1, 1], [1, 2], [1, 3], [1, 4]])
    );

    let (status, body) = send(&app, "GET", "/api/shows", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, "GET", "/api/shows/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["names"][1], json!("Frieren"));

    let saved = app.shared.store.load_shows().await;
    assert_eq!(saved.len(), 1);
}

#[tokio::test]
async fn invalid_and_missing_shows_are_rejected() {
    let app = spawn_app().await;

    let mut form = frieren_form();
    form["names"] = json!(["  "]);
    let (status, body) = send(&app, "POST", "/api/shows", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/shows/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/shows/3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_reset_and_remove() {
    let app = spawn_app().await;
    send(&app, "POST", "/api/shows", Some(frieren_form())).await;

    let mut form = frieren_form();
    form["end_episode"] = json!(2);
    let (status, body) = send(&app, "PUT", "/api/shows/0", Some(form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["needed_episodes"], json!([[1, 1], [1, 2]]));

    let (status, body) = send(&app, "POST", "/api/shows/0/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["downloaded_episodes"], json!([]));

    let (status, _) = send(&app, "DELETE", "/api/shows/0", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/api/shows", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn catalog_edits_reshape_episode_listing() {
    let app = spawn_app().await;
    let mut form = frieren_form();
    form["end_season"] = json!(2);
    form["end_episode"] = json!(2);
    send(&app, "POST", "/api/shows", Some(form)).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/catalog/Sousou%20no%20Frieren",
        Some(json!({ "episodes_per_season": "3,5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["episodes_per_season"], json!([3, 5]));

    let (status, body) = send(&app, "GET", "/api/shows/0/episodes", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows[3],
        json!({ "season": 2, "episode": 1, "absolute": 4, "status": "Needed" })
    );

    let (status, _) = send(
        &app,
        "PUT",
        "/api/catalog/Other",
        Some(json!({ "episodes_per_season": 12 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/catalog/Other/rename",
        Some(json!({ "name": "Sousou no Frieren" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/catalog/Other",
        Some(json!({ "episodes_per_season": "twelve" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", "/api/catalog/Missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/catalog", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(app.shared.store.load_catalog().await.len(), 2);
}

#[tokio::test]
async fn scan_start_conflict_and_stop() {
    let app = spawn_app_with(Arc::new(PendingSearch)).await;
    send(&app, "POST", "/api/shows", Some(frieren_form())).await;

    let (status, body) = send(&app, "POST", "/api/scan", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["started"], json!(true));

    let (status, _) = send(&app, "POST", "/api/scan", Some(json!({ "show": 0 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/api/scan/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stopping"], json!(true));

    app.shared.scanner.wait().await;

    let status = app.shared.scanner.status().await;
    assert_eq!(status.phase, ScanPhase::Idle);
    assert!(status.last_outcome.is_some_and(|outcome| outcome.stopped));

    let (_, body) = send(&app, "GET", "/api/scan", None).await;
    assert_eq!(body["data"]["phase"], json!("idle"));
    assert_eq!(body["data"]["last_outcome"]["stopped"], json!(true));

    let (_, body) = send(&app, "POST", "/api/scan/stop", None).await;
    assert_eq!(body["data"]["stopping"], json!(false));
}

#[tokio::test]
async fn scan_of_unknown_show_is_not_found() {
    let app = spawn_app().await;
    let (status, _) = send(&app, "POST", "/api/scan", Some(json!({ "show": 2 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!app.shared.scanner.is_active().await);
}
