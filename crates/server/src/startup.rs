use std::future::Future;

use axum::http::Method;
use axum::Router;
use configs::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::{catalog::ServiceCatalog, runtime};

/// CORS as the dashboard frontend expects it: any origin, CRUD verbs only.
pub fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: load configuration, build the app and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg, shutdown_signal()).await
}

/// Serve with an explicit configuration until `shutdown` resolves.
pub async fn run_with_config<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    runtime::ensure_env(&cfg.storage.frontend_dir, &cfg.storage.data_dir).await?;

    // 服务列表存储（文件持久化 data/services.json）
    let catalog = ServiceCatalog::open(cfg.storage.services_file()).await?;
    let state = ServerState::new(catalog);

    let app: Router = routes::build_router(state, build_cors(), &cfg.storage.frontend_dir);

    let addr = cfg.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_file = %cfg.storage.services_file().display(), "dashboard server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}
