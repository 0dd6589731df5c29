//! HTTP server binary. Hosts the job submission/polling API and, in the same
//! process, the Worker's dispatch loop that drains the Registry's queue.

use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vclip_api::{create_router, metrics, ApiConfig, AppState};
use vclip_queue::{Registry, RegistryConfig};
use vclip_storage::RemoteStorage;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("vclip=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("starting shortclip api");

    let config = ApiConfig::from_env();
    info!(host = %config.host, port = config.port, "loaded api config");

    let storage = match RemoteStorage::from_env().await {
        Ok(s) => s,
        Err(e) => {
            error!("failed to configure remote storage: {e}");
            std::process::exit(1);
        }
    };

    let (registry, dispatch) = Registry::new(RegistryConfig::from_env());

    let worker_storage = storage.clone();
    let worker_registry = registry.clone();
    tokio::spawn(async move {
        vclip_worker::run_dispatch_loop(dispatch, worker_registry, worker_storage).await;
    });

    let metrics_enabled = std::env::var("METRICS_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    let metrics_handle = if metrics_enabled {
        info!("prometheus metrics enabled at /metrics");
        Some(metrics::init_metrics())
    } else {
        None
    };

    let state = AppState::new(config.clone(), storage, registry);
    let app = create_router(state, metrics_handle);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid bind address");

    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .unwrap();

    info!("server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C handler");
    info!("received shutdown signal");
}
