//! quotagate gateway binary.
//!
//! Composition root: load config, build state (opens the decision client
//! channel), serve the HTTP surface, and on ctrl-c drain, stop serving,
//! and shut the decision client down once.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use quotagate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "quotagate.yaml".to_string());
    let cfg = config::load_from_file(&config_path).expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg).expect("startup failed");
    let app = router::build_router(state.clone());

    tracing::info!(%listen, "quotagate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind");

    let draining = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received, draining");
            draining.set_draining();
        })
        .await
        .expect("server failed");

    state.shutdown();
    tracing::info!("shutdown complete");
}
