//! API version negotiation
//!
//! The version of a request is taken from, in order:
//! 1. a `v<digits>` path segment right after the API root (`/api/v2/...` or `/v2/...`)
//! 2. the `API-Version` header
//! 3. the `version` query parameter
//! 4. the default, `v1`
//!
//! `resolve_version` runs this for every request, stores the result as a
//! request extension and echoes it in the `API-Version` response header.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query, Request},
    http::{request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Request and response header carrying the version tag
pub const VERSION_HEADER: &str = "api-version";

/// Version used when a request names none
pub const DEFAULT_VERSION: &str = "v1";

/// Versions with a dedicated response shape
pub const SUPPORTED_VERSIONS: [&str; 2] = ["v1", "v2"];

lazy_static::lazy_static! {
    /// Leading version segment, optionally behind the `/api` root
    static ref VERSION_SEGMENT_REGEX: Regex =
        Regex::new(r"^/(?:api/)?(v\d+)(?:/|$)").unwrap();
}

/// Resolved API version tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiVersion(String);

impl ApiVersion {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a dedicated response shape exists for this tag
    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&self.0.as_str())
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(DEFAULT_VERSION.to_string())
    }
}

impl From<&str> for ApiVersion {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the version segment from a request path, if any
pub fn version_from_path(path: &str) -> Option<&str> {
    VERSION_SEGMENT_REGEX
        .captures(path)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Pick the version from the available signals, first match wins.
///
/// Blank values count as absent. Never fails.
pub fn resolve(
    path_segment: Option<&str>,
    header_value: Option<&str>,
    query_value: Option<&str>,
) -> ApiVersion {
    [path_segment, header_value, query_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|tag| !tag.is_empty())
        .map(ApiVersion::from)
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct VersionQuery {
    version: Option<String>,
}

/// Middleware: resolve the version, expose it to handlers, echo it back
pub async fn resolve_version(mut req: Request, next: Next) -> Response {
    let path_segment = version_from_path(req.uri().path()).map(str::to_owned);
    let header_value = req
        .headers()
        .get(VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let query_value = Query::<VersionQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.version);

    let version = resolve(
        path_segment.as_deref(),
        header_value.as_deref(),
        query_value.as_deref(),
    );
    tracing::trace!(version = %version, path = %req.uri().path(), "Resolved API version");

    req.extensions_mut().insert(version.clone());
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(version.as_str()) {
        response.headers_mut().insert(VERSION_HEADER, value);
    }
    response
}

impl<S> FromRequestParts<S> for ApiVersion
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<ApiVersion>()
            .cloned()
            .unwrap_or_default())
    }
}
