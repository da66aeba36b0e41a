//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Error-to-JSON mapping
//! - The shared application state

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{Router, body::Body, extract::DefaultBodyLimit, http::Request};
use stowage_core::upload::UploadService;
use stowage_shared::UploadConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span, info_span};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload service, possibly uninitialized.
    pub uploads: Arc<UploadService>,
    /// Upload handling configuration.
    pub upload_config: Arc<UploadConfig>,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub fn new(uploads: UploadService, upload_config: UploadConfig) -> Self {
        Self {
            uploads: Arc::new(uploads),
            upload_config: Arc::new(upload_config),
        }
    }
}

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request span tagged with the id set by `SetRequestIdLayer`.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .upload_config
        .max_body_bytes
        .map_or_else(DefaultBodyLimit::disable, DefaultBodyLimit::max);

    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(body_limit)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
