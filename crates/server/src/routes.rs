use std::path::Path;
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::catalog::{CatalogStore, ServiceCatalog};

use crate::{observability, openapi::ApiDoc};

pub mod services;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<dyn CatalogStore>,
}

impl ServerState {
    pub fn new(catalog: Arc<ServiceCatalog>) -> Self {
        Self { catalog }
    }

    pub fn from_store(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: service CRUD, health, metrics, API docs
/// and the frontend bundle (with `index.html` fallback) for everything else.
pub fn build_router(state: ServerState, cors: CorsLayer, frontend_dir: &Path) -> Router {
    let static_dir = ServeDir::new(frontend_dir).fallback(ServeFile::new(frontend_dir.join("index.html")));

    let api = Router::new()
        .route("/services", get(services::list_services).post(services::create_service))
        .route(
            "/services/:id",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        );

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api)
        .with_state(state)
        .fallback_service(static_dir)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径，日志级别为 INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
