use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs one line per request: method, path, status and elapsed time
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        log::warn!("{} {} {} {}ms", method, path, status.as_u16(), elapsed_ms);
    } else {
        log::info!("{} {} {} {}ms", method, path, status.as_u16(), elapsed_ms);
    }

    response
}
