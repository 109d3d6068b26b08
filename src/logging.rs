use axum::{extract::Request, http::header, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Access log line per request under the `access_log` target
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_agent = header_value(&request, header::USER_AGENT.as_str());
    let remote_addr = header_value(&request, "x-forwarded-for")
        .or_else(|| header_value(&request, "x-real-ip"));

    let response = next.run(request).await;

    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    info!(
        target: "access_log",
        remote_addr = remote_addr.as_deref().unwrap_or("-"),
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        size = %size,
        latency_ms = start.elapsed().as_millis() as u64,
        user_agent = user_agent.as_deref().unwrap_or("-"),
        "{} {}",
        method,
        uri
    );

    response
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
