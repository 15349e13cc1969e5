use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use tokio::sync::Semaphore;
use tower_http::timeout::TimeoutLayer;

use crate::infrastructure::settings::Settings;

pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    let permits = Arc::new(Semaphore::new(settings.http_concurrency_limit));

    router
        .layer(DefaultBodyLimit::max(settings.http_request_body_limit_bytes))
        .layer(timeout_layer(Duration::from_secs(
            settings.http_request_timeout_secs,
        )))
        .layer(middleware::from_fn_with_state(permits, concurrency_limit))
}

fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Waits for a free slot; requests beyond the limit queue here.
async fn concurrency_limit(
    State(permits): State<Arc<Semaphore>>,
    request: Request,
    next: Next,
) -> Response {
    let Ok(_permit) = permits.acquire().await else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };
    next.run(request).await
}
