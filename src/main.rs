// src/main.rs

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use smarthouse_api::notify::{HttpNotifier, NoopNotifier, Notifier};
use smarthouse_api::settings::ensure_settings;
use smarthouse_api::store::{JsonStore, SheetStore};
use smarthouse_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Open (or create) the JSON sheet store and make sure the settings
    // singleton exists before the first request needs it.
    let data_path =
        env::var("SMARTHOUSE_DATA").unwrap_or_else(|_| "smarthouse-data.json".to_string());
    let store: Arc<dyn SheetStore> = Arc::new(JsonStore::open(&data_path).await?);
    ensure_settings(store.as_ref()).await?;
    info!(path = %data_path, "sheet store ready");

    let notifier: Arc<dyn Notifier> = match env::var("PUSH_GATEWAY_URL") {
        Ok(url) if !url.trim().is_empty() => {
            info!(gateway = %url, "push notifications enabled");
            Arc::new(HttpNotifier::new(url))
        }
        _ => Arc::new(NoopNotifier),
    };

    let state = AppState { store, notifier };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = build_router(state).layer(cors).layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
