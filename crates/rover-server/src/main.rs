//! Rover Server - Always-on background travel for surface vehicles

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rover_server::config::Config;
use rover_server::state::AppState;
use rover_server::{api, loops, persistence};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("rover_server=debug".parse()?))
        .init();

    tracing::info!("Starting Rover Server...");

    let config = Config::from_env();
    let port = config.server_port;
    let state = Arc::new(AppState::from_config(&config));

    let snapshot = persistence::load_snapshot_or_default(&config.state_path).await;
    tracing::info!(
        vehicles = snapshot.vehicles.len(),
        universal_time = snapshot.universal_time,
        "Restored travel state from {}",
        config.state_path.display()
    );
    state.restore(snapshot);

    // Start background loops
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let travel = tokio::spawn(loops::travel_loop::run_travel_loop(
        state.clone(),
        config.clone(),
        shutdown_tx.subscribe(),
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let _ = shutdown_tx.send(());
    travel.await?;

    Ok(())
}
