use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest upstream request id that is passed through unchanged
const MAX_REQUEST_ID_LEN: usize = 128;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request being handled by the current task, when called from
/// inside [`request_logger_middleware`]
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Logs each request inside a span carrying its request id, and echoes the id
/// back in `X-Request-ID`.
pub async fn request_logger_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id(&request);
    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let handled = async move {
        let start = Instant::now();
        debug!("Incoming request");

        let response = next.run(request).await;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;
        if status.is_server_error() {
            error!(status = status.as_u16(), duration_ms, "Request failed with server error");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), duration_ms, "Request failed with client error");
        } else {
            info!(status = status.as_u16(), duration_ms, "Request completed");
        }

        response
    }
    .instrument(span);
    let mut response = REQUEST_ID.scope(request_id.clone(), handled).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}
