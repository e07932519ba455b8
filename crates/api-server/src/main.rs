//! API Server for StackVault
//!
//! This is the main entry point for the Rust backend.
//! It provides REST API on one port and Socket.IO push on another.

mod auth;
mod routes;
mod socket;
mod state;

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::socket::create_socket_layer;
use crate::state::AppState;

fn port_from_env(var: &str, default: u16) -> u16 {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,tower_http=debug,socketioxide=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine data directory
    let data_dir = std::env::var("SV_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".sv-data"));

    tracing::info!("Using data directory: {:?}", data_dir);

    // Create application state for REST API
    let app_state = AppState::new(data_dir)
        .await
        .expect("Failed to initialize application state");

    // Create Socket.IO layer
    let (socket_layer, io) = create_socket_layer();
    app_state.set_socket_io(io).await;

    // Warm the price cache in the background; sessions work without it.
    {
        let state = app_state.clone();
        tokio::spawn(async move {
            let prices = state.refresh_prices().await;
            tracing::info!(
                gold = ?prices.gold,
                silver = ?prices.silver,
                platinum = ?prices.platinum,
                "initial spot price fetch complete"
            );
        });
    }

    // REST API server
    let rest_app = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::households::router())
        .merge(routes::items::router())
        .merge(routes::prices::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Socket.IO server
    // Layers are applied bottom-to-top, so CorsLayer is added last to be applied first
    let socket_app = Router::new()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(socket_layer);

    let rest_addr = SocketAddr::from(([0, 0, 0, 0], port_from_env("SV_API_PORT", 8081)));
    let socket_addr = SocketAddr::from(([0, 0, 0, 0], port_from_env("SV_SOCKET_PORT", 8080)));

    tracing::info!("REST API listening on {}", rest_addr);
    tracing::info!("Socket.IO listening on {}", socket_addr);

    // Spawn REST server
    let rest_listener = tokio::net::TcpListener::bind(rest_addr).await.unwrap();
    let rest_handle = tokio::spawn(async move {
        axum::serve(rest_listener, rest_app).await.unwrap();
    });

    // Spawn Socket.IO server
    let socket_listener = tokio::net::TcpListener::bind(socket_addr).await.unwrap();
    let socket_handle = tokio::spawn(async move {
        axum::serve(socket_listener, socket_app).await.unwrap();
    });

    // Wait for both
    tokio::try_join!(rest_handle, socket_handle).unwrap();
}
