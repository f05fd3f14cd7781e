//! Per-client fixed-window rate limiting.
//!
//! Each client IP gets `max_requests` per window. The window starts with the
//! client's first request and resets once it has fully elapsed. Requests over
//! budget are answered with 429 and a `Retry-After` hint.

use axum::{
	extract::{ConnectInfo, Request, State},
	middleware::Next,
	response::{IntoResponse, Response},
};
use order_config::RateLimitConfig;
use order_types::APIError;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Paths that are never limited.
const EXEMPT_PATHS: &[&str] = &["/health"];

/// Tracked clients above which expired windows are swept on insert.
const SWEEP_THRESHOLD: usize = 10_000;

const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later";

#[derive(Debug, Clone, Copy)]
struct Window {
	started: Instant,
	count: u32,
}

/// Outcome of checking one request against the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	Allowed,
	Limited { retry_after: Duration },
}

/// Fixed-window request counter keyed by client IP.
#[derive(Debug)]
pub struct RateLimiter {
	max_requests: u32,
	window: Duration,
	clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
	pub fn new(max_requests: u32, window: Duration) -> Self {
		Self {
			max_requests,
			window,
			clients: Mutex::new(HashMap::new()),
		}
	}

	pub fn from_config(config: &RateLimitConfig) -> Self {
		Self::new(
			config.max_requests,
			Duration::from_secs(config.window_seconds),
		)
	}

	/// Counts a request from `ip` and decides whether it may proceed.
	pub fn check(&self, ip: IpAddr) -> Decision {
		self.check_at(ip, Instant::now())
	}

	fn check_at(&self, ip: IpAddr, now: Instant) -> Decision {
		let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

		if clients.len() >= SWEEP_THRESHOLD && !clients.contains_key(&ip) {
			let window = self.window;
			clients.retain(|_, w| now.duration_since(w.started) < window);
		}

		let entry = clients.entry(ip).or_insert(Window {
			started: now,
			count: 0,
		});
		if now.duration_since(entry.started) >= self.window {
			*entry = Window {
				started: now,
				count: 0,
			};
		}

		if entry.count >= self.max_requests {
			let elapsed = now.duration_since(entry.started);
			return Decision::Limited {
				retry_after: self.window.saturating_sub(elapsed),
			};
		}

		entry.count += 1;
		Decision::Allowed
	}
}

/// Axum middleware applying `limiter` to every non-exempt request.
pub async fn limit_requests(
	State(limiter): State<Arc<RateLimiter>>,
	request: Request,
	next: Next,
) -> Response {
	if EXEMPT_PATHS.contains(&request.uri().path()) {
		return next.run(request).await;
	}

	let ip = client_ip(&request);
	match limiter.check(ip) {
		Decision::Allowed => next.run(request).await,
		Decision::Limited { retry_after } => {
			tracing::warn!("Rate limit exceeded for IP {}", ip);
			let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
			APIError::TooManyRequests {
				message: RATE_LIMIT_MESSAGE.to_string(),
				retry_after: Some(retry_secs),
			}
			.into_response()
		},
	}
}

/// Peer address of the connection, or the unspecified address when the
/// server was not started with connect info (as in router tests).
fn client_ip(request: &Request) -> IpAddr {
	request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip())
		.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
