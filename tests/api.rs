use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use presence_analyzer::server::config::ServerConfig;
use presence_analyzer::web::{AppState, create_axum_router};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("runtime/data")
        .join(name)
}

fn app_with(data_csv: PathBuf) -> Router {
    let config = ServerConfig {
        data_csv,
        data_xml: fixture("users_test.xml"),
        ..ServerConfig::default()
    };
    let state = AppState::from_config(Arc::new(config)).unwrap();
    create_axum_router(Arc::new(state))
}

fn app() -> Router {
    app_with(fixture("test_data.csv"))
}

async fn send(app: &Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json_body(response: Response) -> Value {
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_mainpage_redirects() {
    let response = get(&app(), "/").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.ends_with("/presence_weekday"));
}

#[tokio::test]
async fn test_api_users() {
    let response = get(&app(), "/api/v1/users").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            { "user_id": 10, "name": "User 10" },
            { "user_id": 11, "name": "User 11" },
        ])
    );
}

#[tokio::test]
async fn test_api_users_v2() {
    let response = get(&app(), "/api/v2/users").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            [141, { "name": "Adam P.", "image": "https://intranet.stxnext.pl/api/images/users/141" }],
            [176, { "name": "Adrian K.", "image": "https://intranet.stxnext.pl/api/images/users/176" }],
        ])
    );
}

#[tokio::test]
async fn test_mean_time_weekday_view() {
    let response = get(&app(), "/api/v1/mean_time_weekday/10").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            ["Mon", 0.0],
            ["Tue", 30047.0],
            ["Wed", 24465.0],
            ["Thu", 23705.0],
            ["Fri", 0.0],
            ["Sat", 0.0],
            ["Sun", 0.0],
        ])
    );
}

#[tokio::test]
async fn test_presence_weekday_view() {
    let response = get(&app(), "/api/v1/presence_weekday/11").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            ["Weekday", "Presence (s)"],
            ["Mon", 24123],
            ["Tue", 16564],
            ["Wed", 25321],
            ["Thu", 45968],
            ["Fri", 6426],
            ["Sat", 0],
            ["Sun", 0],
        ])
    );
}

#[tokio::test]
async fn test_presence_start_end_view() {
    let response = get(&app(), "/api/v1/presence_start_end/10").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([
            ["Mon", 0.0, 0.0],
            ["Tue", 34745.0, 64792.0],
            ["Wed", 33592.0, 58057.0],
            ["Thu", 38926.0, 62631.0],
            ["Fri", 0.0, 0.0],
            ["Sat", 0.0, 0.0],
            ["Sun", 0.0, 0.0],
        ])
    );
}

#[tokio::test]
async fn test_unknown_user_yields_empty_list() {
    let app = app();
    for endpoint in ["mean_time_weekday", "presence_weekday", "presence_start_end"] {
        let response = get(&app, &format!("/api/v1/{endpoint}/9999")).await;
        assert_eq!(response.status(), StatusCode::OK, "{endpoint}");
        assert_eq!(json_body(response).await, json!([]), "{endpoint}");
    }
}

#[tokio::test]
async fn test_missing_data_file_is_a_server_error() {
    let app = app_with(PathBuf::from("/nonexistent/presence.csv"));
    let response = get(&app, "/api/v1/users").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_templates_render() {
    let app = app();
    for (page, title) in [
        ("/presence_weekday", "Presence by weekday"),
        ("/mean_time_weekday", "Presence mean time by weekday"),
        ("/presence_start_end", "Presence start end"),
    ] {
        let response = get(&app, page).await;
        assert_eq!(response.status(), StatusCode::OK, "{page}");
        assert!(body_text(response).await.contains(title), "{page}");
    }
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let response = get(&app(), "/bad_page_name").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "page not found");
}

#[tokio::test]
async fn test_cache_invalidation_rereads_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presence.csv");
    std::fs::copy(fixture("test_data.csv"), &path).unwrap();
    let app = app_with(path.clone());

    let before = json_body(get(&app, "/api/v1/users").await).await;
    assert_eq!(before.as_array().unwrap().len(), 2);

    std::fs::copy(fixture("test_cache_data.csv"), &path).unwrap();
    let stale = json_body(get(&app, "/api/v1/users").await).await;
    assert_eq!(stale, before);

    let response = send(&app, Method::POST, "/api/v1/cache/invalidate").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fresh = json_body(get(&app, "/api/v1/users").await).await;
    assert_eq!(
        fresh,
        json!([
            { "user_id": 10, "name": "User 10" },
            { "user_id": 12, "name": "User 12" },
        ])
    );
}
