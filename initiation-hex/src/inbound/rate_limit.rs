//! Rate limiting middleware using Governor.
//!
//! Implements per-peer rate limiting with a token bucket algorithm. The
//! bucket is keyed on the connection's IP address, which the caller cannot
//! pick per request. The `X-Client-Id` header is only a label for logs.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

/// Header carrying the caller's self-declared identity.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Default per-peer quota.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// How often idle buckets are dropped by [`RateLimiterState::spawn_pruner`].
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// One bucket per peer address
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateLimiterState {
    /// Allows `requests` per minute per peer, with a burst of the same size.
    /// Zero is treated as one.
    pub fn per_minute(requests: u32) -> Self {
        let requests = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(Quota::per_minute(requests))
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, peer: IpAddr) -> bool {
        self.limiter.check_key(&peer).is_ok()
    }

    /// Drops buckets that have refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of peers currently tracked.
    pub fn tracked_peers(&self) -> usize {
        self.limiter.len()
    }

    /// Prunes idle buckets every [`PRUNE_INTERVAL`] until the state is dropped.
    pub fn spawn_pruner(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let state = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(live) = state.upgrade() else { break };
                live.prune();
                tracing::debug!(peers = live.tracked_peers(), "Pruned rate limiter");
            }
        })
    }
}

/// Peer address recorded by the listener, or loopback when the router is
/// driven without one (e.g. `oneshot` in tests).
fn peer_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let peer = peer_ip(&request);

    if !limiter.check(peer) {
        let client = request
            .headers()
            .get(CLIENT_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("anonymous");
        tracing::warn!(%peer, client, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": StatusCode::TOO_MANY_REQUESTS.as_u16(),
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
