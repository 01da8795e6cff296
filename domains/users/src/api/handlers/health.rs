//! GET / and GET /health for each API mount

use atlas_common::version::SUPPORTED_VERSIONS;
use atlas_common::{ApiResponse, ApiVersion};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Features advertised on v2
const V2_FEATURES: [&str; 3] = ["enhanced-profiles", "login-metadata", "session-revocation"];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: ApiVersion,
    pub timestamp: DateTime<Utc>,
    pub versions: Vec<&'static str>,
    pub features: Vec<&'static str>,
}

/// Endpoint roots under the resolved version
#[derive(Debug, Serialize)]
pub struct WelcomeEndpoints {
    pub users: String,
    pub auth: String,
    pub health: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub version: ApiVersion,
    pub endpoints: WelcomeEndpoints,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<&'static str>,
}

fn features(version: &ApiVersion) -> Vec<&'static str> {
    if version.as_str() == "v2" {
        V2_FEATURES.to_vec()
    } else {
        Vec::new()
    }
}

/// GET /
pub async fn welcome(version: ApiVersion) -> ApiResponse<WelcomeResponse> {
    let message = if version.as_str() == "v2" {
        "Welcome to API v2 (Enhanced)".to_string()
    } else {
        format!("Welcome to API {}", version)
    };
    let base = format!("/api/{}", version);

    let body = WelcomeResponse {
        version: version.clone(),
        endpoints: WelcomeEndpoints {
            users: format!("{}/users", base),
            auth: format!("{}/auth", base),
            health: format!("{}/health", base),
        },
        features: features(&version),
    };
    ApiResponse::ok(body, version).with_message(message)
}

/// GET /health
pub async fn health(version: ApiVersion) -> ApiResponse<HealthResponse> {
    let body = HealthResponse {
        status: "healthy",
        version: version.clone(),
        timestamp: Utc::now(),
        versions: SUPPORTED_VERSIONS.to_vec(),
        features: features(&version),
    };
    ApiResponse::ok(body, version)
}
