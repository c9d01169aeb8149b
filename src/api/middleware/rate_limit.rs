use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::DefaultKeyedRateLimiter;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;
use crate::state::AppState;
use crate::error::AppError;

pub async fn general_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.rate_limiters.general, &request)?;
    Ok(next.run(request).await)
}

/// Tighter bucket for login, registration and public lead submission.
pub async fn strict_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.rate_limiters.strict, &request)?;
    Ok(next.run(request).await)
}

fn check(limiter: &DefaultKeyedRateLimiter<String>, request: &Request) -> Result<(), AppError> {
    let key = client_key(request);
    limiter.check_key(&key).map_err(|_| {
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        AppError::TooManyRequests
    })
}

/// Peer address when the server runs with connect info, else the first `X-Forwarded-For` hop.
pub fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
