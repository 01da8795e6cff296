//! Common test utilities and fixtures for integration tests
//!
//! - Application setup over in-memory repositories
//! - A seeded admin account
//! - Request helpers returning status, headers and JSON body, sent from a
//!   fixed peer address unless one is given

use std::collections::HashMap;
use std::net::SocketAddr;

use anyhow::Result;
use atlas_auth::Role;
use atlas_common::config::Config;
use atlas_common::hash_password;
use atlas_users::{User, UsersRepositories};
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@atlas.test";
pub const PASSWORD: &str = "password123";

/// Peer address used by `request`
pub const DEFAULT_PEER: &str = "127.0.0.1:40000";

/// Response pieces the tests assert on
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Application under test
pub struct TestApp {
    pub router: Router,
    pub repos: UsersRepositories,
    pub admin: User,
}

impl TestApp {
    /// App with rate limiting disabled (`APP_ENV=test`)
    pub async fn new() -> Result<Self> {
        Self::with_env("test").await
    }

    /// App for the given `APP_ENV`
    pub async fn with_env(app_env: &str) -> Result<Self> {
        Self::with_vars(&[("APP_ENV", app_env)]).await
    }

    /// App with extra configuration variables on top of the test defaults
    pub async fn with_vars(extra: &[(&'static str, &str)]) -> Result<Self> {
        let mut vars: HashMap<&str, String> = HashMap::from([
            ("APP_ENV", "test".to_string()),
            ("DATABASE_URL", "postgres://unused".to_string()),
            ("JWT_SECRET", "integration-access-secret-0123456789".to_string()),
            (
                "JWT_REFRESH_SECRET",
                "integration-refresh-secret-0123456789".to_string(),
            ),
        ]);
        for (key, value) in extra {
            vars.insert(*key, value.to_string());
        }
        let config = Config::from_lookup(|key| vars.get(key).cloned())?;

        let repos = UsersRepositories::in_memory();
        let admin = User::new(
            ADMIN_EMAIL.to_string(),
            "Ada Admin".to_string(),
            hash_password(PASSWORD)?,
            Role::Admin,
        )?;
        let admin = repos.users.create(&admin).await?;

        let router = atlas_app::build_app(&config, repos.clone())?;
        Ok(Self {
            router,
            repos,
            admin,
        })
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Result<TestResponse> {
        self.request_from(DEFAULT_PEER, method, uri, body, headers)
            .await
    }

    /// Send a request as if it arrived on a socket from `peer`
    pub async fn request_from(
        &self,
        peer: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Result<TestResponse> {
        let peer: SocketAddr = peer.parse()?;
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(peer));
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.request("POST", uri, Some(body), &[]).await
    }

    pub async fn post_authed(&self, uri: &str, token: &str, body: Value) -> Result<TestResponse> {
        let bearer = format!("Bearer {}", token);
        self.request("POST", uri, Some(body), &[("authorization", &bearer)])
            .await
    }

    pub async fn get_authed(&self, uri: &str, token: &str) -> Result<TestResponse> {
        let bearer = format!("Bearer {}", token);
        self.request("GET", uri, None, &[("authorization", &bearer)])
            .await
    }

    pub async fn register(&self, email: &str, name: &str) -> Result<TestResponse> {
        self.post(
            "/api/v1/auth/register",
            json!({ "email": email, "name": name, "password": PASSWORD }),
        )
        .await
    }

    /// Log in through v1 and return `(accessToken, refreshToken)`
    pub async fn login(&self, email: &str) -> Result<(String, String)> {
        let response = self
            .post(
                "/api/v1/auth/login",
                json!({ "email": email, "password": PASSWORD }),
            )
            .await?;
        anyhow::ensure!(
            response.status == StatusCode::OK,
            "login failed: {:?}",
            response.body
        );

        let data = &response.body["data"];
        let access = data["accessToken"].as_str().unwrap_or_default().to_string();
        let refresh = data["refreshToken"].as_str().unwrap_or_default().to_string();
        Ok((access, refresh))
    }

    pub async fn admin_token(&self) -> Result<String> {
        Ok(self.login(ADMIN_EMAIL).await?.0)
    }
}
