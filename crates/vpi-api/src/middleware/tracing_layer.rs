//! # Request/Response Tracing
//!
//! Configures `tower_http::trace::TraceLayer` so every request runs inside a
//! span carrying its method and URI. The response status and latency are
//! logged at `info`; 5xx responses are recorded as failures.
//!
//! Headers are not recorded, so `Authorization` values never reach the logs.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the `TraceLayer` for the auth API.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
