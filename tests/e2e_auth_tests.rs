//! End-to-end authentication tests

mod common;

use common::*;
use reqwest::StatusCode;

#[tokio::test]
async fn login_with_valid_credentials_succeeds() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(&server.base_url);

    let response = client.login(TEST_USER, TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
}

#[tokio::test]
async fn login_with_wrong_password_is_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(&server.base_url);

    let response = client.login(TEST_USER, "wrongpassword").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_with_unknown_user_is_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(&server.base_url);

    let response = client.login("nobody", TEST_PASS).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn protected_routes_require_authentication() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(&server.base_url);

    let response = client.list_tracks().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.list_jobs().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client.profile_stats().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn session_cookie_persists_across_requests() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(&server.base_url).await;

    let response = client.list_tracks().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.list_transformations().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(&server.base_url).await;

    let response = client.list_tracks().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.list_tracks().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn home_is_public_and_reports_stats() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(&server.base_url);

    let response = client.get_statics().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["uptime"].is_string());
    assert!(body["hash"].is_string());
}
