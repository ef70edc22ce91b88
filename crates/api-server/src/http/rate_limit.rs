use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::AppState;
use super::errors::too_many_requests_response;

const LIMITED_PATH_PREFIX: &str = "/api/";

#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: usize,
    pub window: Duration,
}

/// Sliding-window limiter keyed by client address.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    policy: RateLimitPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RateLimitDecision {
    Allowed,
    Denied { retry_after_seconds: u64 },
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    pub fn spawn_pruner(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let entries = Arc::clone(&self.entries);
        let window = self.policy.window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                prune_entries(&entries, window, Instant::now());
            }
        })
    }

    fn check(&self, subject: &str) -> RateLimitDecision {
        self.check_at(subject, Instant::now())
    }

    fn check_at(&self, subject: &str, now: Instant) -> RateLimitDecision {
        let window = self.policy.window;
        let cutoff = now.checked_sub(window).unwrap_or(now);

        let mut entries = self
            .entries
            .lock()
            .expect("rate limiter mutex should not be poisoned");

        let bucket = entries.entry(subject.to_string()).or_default();
        prune_bucket(bucket, cutoff);

        if bucket.len() >= self.policy.max_requests {
            let retry_after_seconds = bucket
                .front()
                .map(|first_seen| {
                    let elapsed = now.saturating_duration_since(*first_seen);
                    window.saturating_sub(elapsed).as_secs().max(1)
                })
                .unwrap_or_else(|| window.as_secs().max(1));
            return RateLimitDecision::Denied {
                retry_after_seconds,
            };
        }

        bucket.push_back(now);

        RateLimitDecision::Allowed
    }
}

fn prune_entries(
    entries: &Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    now: Instant,
) {
    let cutoff = now.checked_sub(window).unwrap_or(now);
    let mut state = entries
        .lock()
        .expect("rate limiter prune mutex should not be poisoned");

    state.retain(|_, bucket| {
        prune_bucket(bucket, cutoff);
        !bucket.is_empty()
    });
}

fn prune_bucket(bucket: &mut VecDeque<Instant>, cutoff: Instant) {
    while let Some(front) = bucket.front() {
        if *front <= cutoff {
            bucket.pop_front();
        } else {
            break;
        }
    }
}

pub(super) async fn api_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if !req.uri().path().starts_with(LIMITED_PATH_PREFIX) {
        return next.run(req).await;
    }

    let subject = request_subject(&req, &state.trusted_proxy_ips);

    match state.rate_limiter.check(&subject) {
        RateLimitDecision::Allowed => next.run(req).await,
        RateLimitDecision::Denied {
            retry_after_seconds,
        } => {
            warn!(
                path = req.uri().path(),
                retry_after_seconds, "request denied by api rate limit",
            );
            too_many_requests_response(retry_after_seconds)
        }
    }
}

fn request_subject(req: &Request, trusted_proxy_ips: &HashSet<IpAddr>) -> String {
    match remote_ip(req, trusted_proxy_ips) {
        Some(ip) => format!("ip:{ip}"),
        None => "anonymous".to_string(),
    }
}

fn remote_ip(req: &Request, trusted_proxy_ips: &HashSet<IpAddr>) -> Option<IpAddr> {
    let peer_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0.ip())?;

    if !trusted_proxy_ips.contains(&peer_ip) {
        return Some(peer_ip);
    }

    forwarded_client_ip(req, trusted_proxy_ips, peer_ip).or(Some(peer_ip))
}

fn forwarded_client_ip(
    req: &Request,
    trusted_proxy_ips: &HashSet<IpAddr>,
    peer_ip: IpAddr,
) -> Option<IpAddr> {
    let mut chain = req
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(parse_ip_chain)
        .collect::<Vec<_>>();
    if chain.is_empty() {
        return None;
    }

    chain.push(peer_ip);
    chain
        .iter()
        .rev()
        .find(|ip| !trusted_proxy_ips.contains(ip))
        .copied()
}

fn parse_ip_chain(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.parse::<IpAddr>().ok())
        .collect()
}
