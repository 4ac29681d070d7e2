use crate::server::{ServerError, ServerRouter, cache::ResponseCache};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

pub fn routes() -> ServerRouter {
    ServerRouter::new().typed_post(cache_clear)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/internal/cache/clear", rejection(ServerError))]
struct CacheClearPath();

/// Operator/test entry point forcing the next landing-feed read to
/// recompute.
async fn cache_clear(
    CacheClearPath(): CacheClearPath,
    State(cache): State<Arc<ResponseCache>>,
) -> StatusCode {
    cache.clear().await;
    info!("Response cache cleared");

    StatusCode::NO_CONTENT
}
