//! User management integration tests
//!
//! Admin-only creation and authenticated lookup.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, PASSWORD};

#[test_log::test(tokio::test)]
async fn test_admin_creates_user() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = app
        .post_authed(
            "/api/v1/users",
            &token,
            json!({
                "email": "new.admin@example.com",
                "name": "New Admin",
                "password": PASSWORD,
                "role": "admin"
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "User created successfully");
    assert_eq!(response.body["data"]["role"], "admin");

    // The new account can log in
    assert!(app.login("new.admin@example.com").await.is_ok());
}

#[test_log::test(tokio::test)]
async fn test_created_user_defaults_to_user_role() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = app
        .post_authed(
            "/api/v1/users",
            &token,
            json!({ "email": "plain@example.com", "name": "Plain User", "password": PASSWORD }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["role"], "user");
}

#[test_log::test(tokio::test)]
async fn test_non_admin_cannot_create_user() {
    let app = TestApp::new().await.unwrap();
    app.register("jane@example.com", "Jane Doe").await.unwrap();
    let (token, _) = app.login("jane@example.com").await.unwrap();

    let response = app
        .post_authed(
            "/api/v1/users",
            &token,
            json!({ "email": "x@example.com", "name": "Xavier", "password": PASSWORD }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"]["code"], "AUTHORIZATION_ERROR");
}

#[test_log::test(tokio::test)]
async fn test_create_user_duplicate_email_conflicts() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = app
        .post_authed(
            "/api/v1/users",
            &token,
            json!({ "email": app.admin.email, "name": "Copy Cat", "password": PASSWORD }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_get_user_v1_and_v2() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();
    let uri = |version: &str| format!("/api/{}/users/{}", version, app.admin.id);

    let v1 = app.get_authed(&uri("v1"), &token).await.unwrap();
    assert_eq!(v1.status, StatusCode::OK);
    assert_eq!(v1.body["data"]["email"], app.admin.email);
    assert!(v1.body["data"].get("profile").is_none());

    let v2 = app.get_authed(&uri("v2"), &token).await.unwrap();
    assert_eq!(v2.status, StatusCode::OK);
    assert_eq!(v2.body["data"]["isActive"], true);
    assert_eq!(v2.body["data"]["profile"]["initials"], "AA");
    assert_eq!(v2.body["data"]["profile"]["status"], "active");
    assert!(v2.body["data"]["metadata"]["createdAt"].is_string());
}

#[test_log::test(tokio::test)]
async fn test_get_user_not_found() {
    let app = TestApp::new().await.unwrap();
    let token = app.admin_token().await.unwrap();

    let response = app
        .get_authed(&format!("/api/v1/users/{}", Uuid::new_v4()), &token)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"]["message"], "User not found");

    let response = app
        .get_authed("/api/v1/users/not-a-uuid", &token)
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_get_user_rejects_bad_token() {
    let app = TestApp::new().await.unwrap();

    let response = app
        .get_authed(&format!("/api/v1/users/{}", app.admin.id), "invalid.jwt.token")
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"]["message"], "Invalid or expired token");
}
