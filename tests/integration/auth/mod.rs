//! Authentication flow integration tests
//!
//! Register, login, refresh, logout and rate limiting through the HTTP
//! surface.

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{TestApp, PASSWORD};

mod test_register {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_register_returns_created_user() {
        let app = TestApp::new().await.unwrap();

        let response = app.register("jane@example.com", "Jane Doe").await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["success"], true);
        assert_eq!(response.body["message"], "User registered successfully");
        assert_eq!(response.body["data"]["email"], "jane@example.com");
        assert_eq!(response.body["data"]["role"], "user");
        assert!(response.body["data"].get("password_hash").is_none());
        assert_eq!(response.body["meta"]["version"], "v1");
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_registration_conflicts() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();

        let response = app.register("jane@example.com", "Jane Again").await.unwrap();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"]["code"], "CONFLICT");
    }

    #[test_log::test(tokio::test)]
    async fn test_register_validation_errors() {
        let app = TestApp::new().await.unwrap();

        let response = app
            .post(
                "/api/v1/auth/register",
                json!({ "email": "nope", "name": "J", "password": "short" }),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"]["code"], "VALIDATION_ERROR");

        let response = app
            .post("/api/v1/auth/register", json!({ "email": "a@b.co" }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}

mod test_login {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_login_v1_shape() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();

        let response = app
            .post(
                "/api/v1/auth/login",
                json!({ "email": "jane@example.com", "password": PASSWORD }),
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "Login successful");

        let data = &response.body["data"];
        assert!(data["accessToken"].is_string());
        assert!(data["refreshToken"].is_string());
        assert_ne!(data["accessToken"], data["refreshToken"]);
        assert_eq!(data["user"]["name"], "Jane Doe");
        assert!(data.get("tokens").is_none());
        assert!(data.get("metadata").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_login_v2_shape() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();

        let response = app
            .request_from(
                "203.0.113.9:51000",
                "POST",
                "/api/v2/auth/login",
                Some(json!({ "email": "jane@example.com", "password": PASSWORD })),
                &[("x-forwarded-for", "198.51.100.99")],
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("api-version"), Some("v2"));

        let data = &response.body["data"];
        assert!(data["tokens"]["access"].is_string());
        assert!(data["tokens"]["refresh"].is_string());
        assert_eq!(data["tokens"]["expiresIn"], "7d");
        assert_eq!(data["user"]["profile"]["displayName"], "Jane Doe");
        assert_eq!(data["user"]["profile"]["initials"], "JD");
        assert!(data["metadata"]["loginTime"].is_string());
        assert_eq!(data["metadata"]["ipAddress"], "203.0.113.9");
    }

    #[test_log::test(tokio::test)]
    async fn test_login_v2_ip_from_trusted_proxy() {
        let app = TestApp::with_vars(&[("TRUST_PROXY", "true")])
            .await
            .unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();

        let response = app
            .request(
                "POST",
                "/api/v2/auth/login",
                Some(json!({ "email": "jane@example.com", "password": PASSWORD })),
                &[("x-forwarded-for", "198.51.100.99, 10.0.0.1")],
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["metadata"]["ipAddress"], "198.51.100.99");
    }

    #[test_log::test(tokio::test)]
    async fn test_login_failures_share_one_error() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();

        let wrong_password = app
            .post(
                "/api/v1/auth/login",
                json!({ "email": "jane@example.com", "password": "wrong-password" }),
            )
            .await
            .unwrap();
        let unknown_email = app
            .post(
                "/api/v1/auth/login",
                json!({ "email": "ghost@example.com", "password": PASSWORD }),
            )
            .await
            .unwrap();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.body["error"], unknown_email.body["error"]);
        assert_eq!(
            wrong_password.body["error"]["message"],
            "Invalid credentials"
        );
    }
}

mod test_refresh_lifecycle {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_refresh_then_logout() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();
        let (_, refresh) = app.login("jane@example.com").await.unwrap();

        let response = app
            .post("/api/v1/auth/refresh", json!({ "refreshToken": refresh }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        let access = response.body["data"]["accessToken"].as_str().unwrap();

        // The refreshed access token authenticates
        let me = app
            .get_authed(
                &format!("/api/v1/users/{}", app.admin.id),
                access,
            )
            .await
            .unwrap();
        assert_eq!(me.status, StatusCode::OK);

        let response = app
            .post("/api/v1/auth/logout", json!({ "refreshToken": refresh }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "Logged out");

        let response = app
            .post("/api/v1/auth/refresh", json!({ "refreshToken": refresh }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"]["code"], "AUTHENTICATION_ERROR");

        // Logging out twice is harmless
        let response = app
            .post("/api/v1/auth/logout", json!({ "refreshToken": refresh }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_logout_all_revokes_every_session() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();
        let (access, first) = app.login("jane@example.com").await.unwrap();
        let (_, second) = app.login("jane@example.com").await.unwrap();

        let response = app
            .post_authed("/api/v1/auth/logout-all", &access, json!({}))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "All sessions revoked");
        assert_eq!(response.body["data"]["revoked"], 2);

        for token in [first, second] {
            let response = app
                .post("/api/v1/auth/refresh", json!({ "refreshToken": token }))
                .await
                .unwrap();
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_logout_all_requires_token() {
        let app = TestApp::new().await.unwrap();

        let response = app
            .post("/api/v1/auth/logout-all", json!({}))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.body["error"]["message"],
            "No authentication token provided"
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_access_token_cannot_refresh() {
        let app = TestApp::new().await.unwrap();
        app.register("jane@example.com", "Jane Doe").await.unwrap();
        let (access, _) = app.login("jane@example.com").await.unwrap();

        let response = app
            .post("/api/v1/auth/refresh", json!({ "refreshToken": access }))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

mod test_rate_limiting {
    use super::*;

    const CLIENT: &str = "198.51.100.7:50000";

    async fn login_from(app: &TestApp, peer: &str, forwarded_for: &str) -> StatusCode {
        let body = json!({ "email": "ghost@example.com", "password": PASSWORD });
        app.request_from(
            peer,
            "POST",
            "/api/v1/auth/login",
            Some(body),
            &[("x-forwarded-for", forwarded_for)],
        )
        .await
        .unwrap()
        .status
    }

    #[test_log::test(tokio::test)]
    async fn test_sixth_login_is_rate_limited() {
        let app = TestApp::with_env("development").await.unwrap();
        let body = json!({ "email": "ghost@example.com", "password": PASSWORD });

        for _ in 0..5 {
            let response = app
                .request_from(CLIENT, "POST", "/api/v1/auth/login", Some(body.clone()), &[])
                .await
                .unwrap();
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        }

        let response = app
            .request_from(CLIENT, "POST", "/api/v1/auth/login", Some(body.clone()), &[])
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.body["error"]["code"], "RATE_LIMIT_EXCEEDED");
        assert_eq!(
            response.body["error"]["message"],
            "Too many login attempts, please try again later"
        );

        // Another client is unaffected
        let response = app
            .request_from(
                "198.51.100.8:50000",
                "POST",
                "/api/v1/auth/login",
                Some(body),
                &[],
            )
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[test_log::test(tokio::test)]
    async fn test_rotating_forwarded_for_still_limited() {
        let app = TestApp::with_env("development").await.unwrap();

        for attempt in 0..5 {
            let forwarded_for = format!("203.0.113.{}", attempt);
            assert_eq!(
                login_from(&app, CLIENT, &forwarded_for).await,
                StatusCode::UNAUTHORIZED
            );
        }
        assert_eq!(
            login_from(&app, CLIENT, "203.0.113.200").await,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_trusted_proxy_limits_forwarded_clients() {
        let app = TestApp::with_vars(&[("APP_ENV", "development"), ("TRUST_PROXY", "true")])
            .await
            .unwrap();

        // Every request arrives from the proxy
        for _ in 0..5 {
            assert_eq!(
                login_from(&app, CLIENT, "203.0.113.1").await,
                StatusCode::UNAUTHORIZED
            );
        }
        assert_eq!(
            login_from(&app, CLIENT, "203.0.113.1").await,
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            login_from(&app, CLIENT, "203.0.113.2").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_limits_disabled_in_test_env() {
        let app = TestApp::new().await.unwrap();
        let body = json!({ "email": "ghost@example.com", "password": PASSWORD });

        for _ in 0..8 {
            let response = app.post("/api/v1/auth/login", body.clone()).await.unwrap();
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        }
    }
}
