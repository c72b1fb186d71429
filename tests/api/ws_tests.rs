//! WebSocket upgrade authentication tests

use axum::http::{header::COOKIE, HeaderValue, StatusCode};
use serde_json::Value;

use crate::common::TestApp;

#[tokio::test]
async fn test_upgrade_without_cookie_is_unauthorized() {
    let app = TestApp::new();

    let response = app.server.get("/ws").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], 10003);
}

#[tokio::test]
async fn test_upgrade_with_unknown_session_is_unauthorized() {
    let app = TestApp::new();
    app.login("known", 1);

    let response = app
        .server
        .get("/ws")
        .add_header(COOKIE, HeaderValue::from_static("session_token=bogus"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.gateway.connection_count(), 0);
}

#[tokio::test]
async fn test_cookie_with_other_name_is_ignored() {
    let app = TestApp::new();
    app.login("known", 1);

    let response = app
        .server
        .get("/ws")
        .add_header(COOKIE, HeaderValue::from_static("other=known"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_session_without_upgrade_is_rejected_by_websocket_layer() {
    let app = TestApp::new();
    app.login("known", 1);

    let response = app
        .server
        .get("/ws")
        .add_header(COOKIE, HeaderValue::from_static("session_token=known"))
        .expect_failure()
        .await;

    assert_ne!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.gateway.connection_count(), 0);
}
