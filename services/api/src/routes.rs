use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use student_showcase::workflows::showcase::{showcase_router, ShowcaseServices};

pub(crate) fn with_showcase_routes(services: Arc<ShowcaseServices>) -> axum::Router {
    showcase_router(services)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/storage/:bucket/*path",
            axum::routing::get(stored_photo_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serves objects from the local photo bucket so issued public URLs resolve.
pub(crate) async fn stored_photo_endpoint(
    Extension(state): Extension<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Response {
    if bucket != state.photos.bucket() {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.photos.object(&path) {
        Some(photo) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, photo.content_type)],
            photo.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
