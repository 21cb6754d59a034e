use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use service::catalog::ServiceCatalog;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::routes::{self, ServerState};
use server::startup::build_cors;

struct TestApp {
    base_url: String,
    data_dir: PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Use isolated temp files per test run
    let data_dir = std::env::temp_dir().join(format!("dashboard_e2e_{}", Uuid::new_v4()));
    let frontend_dir = data_dir.join("dist");
    tokio::fs::create_dir_all(&frontend_dir).await?;
    tokio::fs::write(frontend_dir.join("index.html"), "<!doctype html><title>Dashboard</title>").await?;

    let catalog = ServiceCatalog::open(data_dir.join("services.json")).await?;
    let app = routes::build_router(ServerState::new(catalog), build_cors(), &frontend_dir);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, data_dir })
}

#[tokio::test]
async fn e2e_router_scenario() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let services = format!("{}/services", app.base_url);

    let res = c.get(&services).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!([]));

    let res = c.post(&services)
        .json(&json!({"name": "Router", "url": "http://192.168.1.1"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created = res.json::<Value>().await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["category"], "Uncategorized");

    let listed = c.get(&services).send().await?.json::<Value>().await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    // persisted document has the `services` wrapper
    let raw: Value = serde_json::from_slice(&tokio::fs::read(app.data_dir.join("services.json")).await?)?;
    assert_eq!(raw["services"][0]["id"], id.as_str());

    let res = c.delete(format!("{}/{}", services, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["success"], true);

    let listed = c.get(&services).send().await?.json::<Value>().await?;
    assert_eq!(listed, json!([]));

    let res = c.delete(format!("{}/{}", services, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_spa_fallback_serves_index() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/some/client/route", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("Dashboard"));

    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.json::<Value>().await?["status"], "ok");
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_cors_preflight_allows_put() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/services/abc", app.base_url))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "PUT")
        .send()
        .await?;
    assert!(res.status().is_success());
    assert_eq!(
        res.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}
