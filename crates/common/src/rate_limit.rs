//! Fixed-window request rate limiting
//!
//! Counts requests per client address inside a fixed window and rejects
//! the overflow with `429 RATE_LIMIT_EXCEEDED`. State is in-process only.
//!
//! The client address is the socket peer unless the deployment sits behind
//! a trusted proxy, in which case the first `X-Forwarded-For` hop is used.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts, Request, State},
    http::{request::Parts, Extensions, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::{Error, Result};

/// Client key used when no address can be determined
const UNKNOWN_CLIENT: &str = "unknown";

/// Windows tracked before expired entries are swept
const SWEEP_THRESHOLD: usize = 10_000;

/// Limit applied by a `RateLimiter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    /// General API traffic: 100 requests per 15 minutes
    pub const fn api() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }

    /// Credential endpoints: 5 requests per 15 minutes
    pub const fn auth() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Where the caller address is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressSource {
    /// Socket peer address only
    #[default]
    Peer,
    /// First `X-Forwarded-For` hop, then the peer address
    ForwardedFor,
}

impl AddressSource {
    pub fn from_trust_proxy(trust_proxy: bool) -> Self {
        if trust_proxy {
            Self::ForwardedFor
        } else {
            Self::Peer
        }
    }

    /// Caller address, `None` when it cannot be determined
    pub fn client_address(self, headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
        let forwarded = match self {
            Self::Peer => None,
            Self::ForwardedFor => forwarded_for(headers),
        };
        forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()))
    }

    /// Rate limit key for the caller, `unknown` when no address is available
    pub fn client_key(self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        self.client_address(headers, peer)
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Shared fixed-window limiter keyed by client
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    message: Arc<str>,
    enabled: bool,
    source: AddressSource,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, message: &str) -> Self {
        Self {
            config,
            message: Arc::from(message),
            enabled: true,
            source: AddressSource::Peer,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Limiter for general API traffic
    pub fn api() -> Self {
        Self::new(
            RateLimitConfig::api(),
            "Too many requests, please try again later",
        )
    }

    /// Limiter for login and registration
    pub fn auth() -> Self {
        Self::new(
            RateLimitConfig::auth(),
            "Too many login attempts, please try again later",
        )
    }

    /// Turn enforcement on or off
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Choose where client keys come from
    pub fn address_source(mut self, source: AddressSource) -> Self {
        self.source = source;
        self
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count one request for `key`, returning how many remain in the window
    pub fn check(&self, key: &str) -> Result<u32> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<u32> {
        if !self.enabled {
            return Ok(self.config.max_requests);
        }

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() >= SWEEP_THRESHOLD {
            let window = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.config.window {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count >= self.config.max_requests {
            tracing::warn!(client = %key, limit = self.config.max_requests, "Rate limit exceeded");
            return Err(Error::RateLimit(self.message.to_string()));
        }

        entry.count += 1;
        Ok(self.config.max_requests - entry.count)
    }
}

fn peer_address(extensions: &Extensions) -> Option<SocketAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Extractor for the caller address, `None` when it cannot be determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub Option<String>);

impl<S> FromRequestParts<S> for ClientAddress
where
    AddressSource: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let source = AddressSource::from_ref(state);
        let peer = peer_address(&parts.extensions);
        Ok(ClientAddress(source.client_address(&parts.headers, peer)))
    }
}

/// Middleware enforcing the limiter passed as state
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let peer = peer_address(req.extensions());
    let key = limiter.source.client_key(req.headers(), peer);

    let remaining = limiter.check(&key)?;

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        "ratelimit-limit",
        HeaderValue::from(limiter.config().max_requests),
    );
    headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
    Ok(response)
}
