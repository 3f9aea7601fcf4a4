use super::error::GatewayFailure;
use axum::{
    body::HttpBody,
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::{
    net::SocketAddr,
    time::{Duration, Instant},
};

/// Logs one structured line per gateway request once the response is ready.
///
/// Server errors are logged at `ERROR`, everything else at `INFO`.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let response = next.run(req).await;

    let mut latency = start.elapsed();
    if latency > Duration::from_secs(60) {
        latency = Duration::from_secs(latency.as_secs());
    }
    let status_code = response.status().as_u16();
    let body_size = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| i64::try_from(n).ok())
        .unwrap_or(-1);
    let message = response
        .extensions()
        .get::<GatewayFailure>()
        .map(|GatewayFailure(msg)| msg.as_str())
        .unwrap_or_default();

    if response.status().is_server_error() {
        tracing::error!(
            client_ip = %client_ip,
            %method,
            status_code,
            body_size,
            path = %path,
            ?latency,
            "{message}"
        );
    } else {
        tracing::info!(
            client_ip = %client_ip,
            %method,
            status_code,
            body_size,
            path = %path,
            ?latency,
            "{message}"
        );
    }

    response
}
