pub mod cache;
pub mod config;
pub mod logging;
pub mod metrics;
mod routes;
pub mod state;
pub mod store;

use std::process;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use flagvault_lib::FlagService;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use self::cache::open_cache;
use self::config::FvConfig;
use self::metrics::{handle_health_check, handle_metrics, track_metrics};
use self::routes::{
    handle_create_flag, handle_get_flag, handle_get_flag_value, handle_update_flag_value,
};
use self::state::AppState;
use self::store::open_store;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health_check))
        .route("/metrics", get(handle_metrics))
        .route("/v1/flags", post(handle_create_flag))
        .route("/v1/flags/{name}", get(handle_get_flag))
        .route(
            "/v1/flags/{name}/value",
            get(handle_get_flag_value).put(handle_update_flag_value),
        )
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}

pub async fn run_serve(config: FvConfig) {
    let store = match open_store(&config.storage) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, data_dir = %config.storage.data_dir, "failed to open store");
            process::exit(1);
        }
    };
    let cache = open_cache(&config.cache);
    let state = Arc::new(AppState::new(
        FlagService::new(store, cache),
        config.request_timeout(),
    ));

    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, %addr, "failed to bind");
            process::exit(1);
        }
    };
    info!(
        %addr,
        storage = ?config.storage.backend,
        cache = ?config.cache.backend,
        timeout_ms = config.server.request_timeout_ms,
        "serving flags"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }

    info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await.ok();

    info!("shutdown signal received, finishing in-flight requests");
}
