//! Rate limiting middleware.
//!
//! Per-client-address admission control for public listing routes, using
//! fixed windows. Each address may make `limit` requests per window; further
//! requests are rejected with 429 until the next window starts. Every window
//! gets a fresh keyed limiter, so state never outlives the window it counts.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota,
    RateLimiter as GovRateLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_rate_limited;

/// Length of one counting window for the badge listing.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(3600);

type AddressRateLimiter = GovRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// The limiter counting the current window.
struct Window {
    index: u128,
    limiter: Arc<AddressRateLimiter>,
}

/// Rate limiter state shared across all requests.
#[derive(Clone)]
pub struct RateLimiterState {
    current: Arc<RwLock<Window>>,
    quota: Quota,
    window: Duration,
    started: Instant,
    limit: u32,
    trusted_proxies: Arc<[IpAddr]>,
}

impl RateLimiterState {
    /// Creates a limiter allowing `limit_per_hour` requests per address per
    /// hour. Returns `None` when the limit is zero, which disables limiting.
    pub fn per_hour(limit_per_hour: u32, trusted_proxies: &[IpAddr]) -> Option<Self> {
        Self::new(limit_per_hour, RATE_LIMIT_WINDOW, trusted_proxies)
    }

    /// Creates a limiter allowing `limit` requests per address in each
    /// `window`. Returns `None` for a zero limit or an empty window.
    pub fn new(limit: u32, window: Duration, trusted_proxies: &[IpAddr]) -> Option<Self> {
        let burst = NonZeroU32::new(limit)?;
        // One cell replenishes per window, so a window never admits more
        // than the burst.
        let quota = Quota::with_period(window)?.allow_burst(burst);
        Some(Self {
            current: Arc::new(RwLock::new(Window {
                index: 0,
                limiter: Arc::new(GovRateLimiter::keyed(quota)),
            })),
            quota,
            window,
            started: Instant::now(),
            limit,
            trusted_proxies: trusted_proxies.into(),
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    /// Checks a request from `addr`.
    /// Returns Err with the seconds until the window resets when over the limit.
    pub fn check(&self, addr: IpAddr) -> Result<(), u64> {
        let elapsed = self.started.elapsed();
        let window_nanos = self.window.as_nanos().max(1);
        let index = elapsed.as_nanos() / window_nanos;

        match self.limiter_for(index).check_key(&addr) {
            Ok(_) => Ok(()),
            Err(_) => {
                let into_window = elapsed.as_nanos() % window_nanos;
                let remaining = (window_nanos - into_window).div_ceil(1_000_000_000);
                Err(u64::try_from(remaining).unwrap_or(u64::MAX).max(1))
            }
        }
    }

    /// Number of addresses counted in the current window.
    pub fn tracked_addresses(&self) -> usize {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .limiter
            .len()
    }

    fn limiter_for(&self, index: u128) -> Arc<AddressRateLimiter> {
        {
            let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if current.index >= index {
                return current.limiter.clone();
            }
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have rolled the window over already.
        if current.index < index {
            *current = Window {
                index,
                limiter: Arc::new(GovRateLimiter::keyed(self.quota)),
            };
        }
        current.limiter.clone()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("limit", &self.limit)
            .field("window_secs", &self.window.as_secs())
            .field("trusted_proxies", &self.trusted_proxies)
            .field("tracked_addresses", &self.tracked_addresses())
            .finish()
    }
}

/// Client address of a request.
///
/// The peer address, unless the peer is a trusted proxy. Then the
/// `X-Forwarded-For` hops are walked from the right and the first hop not
/// belonging to a trusted proxy is the client. Without a peer address the
/// unspecified address is used.
pub fn client_addr(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> IpAddr {
    let Some(peer) = peer.map(|p| p.ip()) else {
        return IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    };
    if !trusted_proxies.contains(&peer) {
        return peer;
    }

    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .collect();

    let mut client = peer;
    for hop in hops.iter().rev() {
        let Ok(ip) = hop.trim().parse::<IpAddr>() else {
            break;
        };
        client = ip;
        if !trusted_proxies.contains(&ip) {
            break;
        }
    }
    client
}

/// Middleware that applies the per-address limit.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(ref limiter) = state.rate_limiter else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let addr = client_addr(req.headers(), peer, limiter.trusted_proxies());

    if let Err(retry_after_secs) = limiter.check(addr) {
        tracing::warn!(client = %addr, retry_after_secs, "Rate limit exceeded");
        record_rate_limited("/badges");
        return ApiError::RateLimited { retry_after_secs }.into_response();
    }

    next.run(req).await
}
