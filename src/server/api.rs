//! Route definitions

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Visit / for the web UI or /api/health to check API status.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed.",
        })),
    )
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_size = state.config.max_upload_size;

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/schema", get(handlers::get_schema))
        .route("/predict", post(handlers::predict))
        .route("/bulk/preview", post(handlers::bulk_preview))
        .route("/bulk/predict", post(handlers::bulk_predict))
        .route("/sample", get(handlers::download_sample))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    let app = Router::new()
        .nest("/api", api_routes)
        .route("/", get(handlers::serve_page))
        .route("/manual", post(handlers::submit_manual))
        .route("/bulk", post(handlers::submit_bulk_preview))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(DefaultBodyLimit::max(max_upload_size))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
