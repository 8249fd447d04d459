// src/main.rs
mod auth;
mod config;
mod database;
mod dtos;
mod error;
mod handlers;
mod middleware;
mod models;
mod repository;
mod routes;
mod services;
mod state;
mod sync;

use axum::{routing::get, Router};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::database::LocalStore;
use crate::repository::Records;
use crate::sync::SheetClient;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    // Local store: Postgres when configured, otherwise process memory
    let store = match &config.database_url {
        Some(url) => match database::create_pool(url).await {
            Ok(pool) => LocalStore::Postgres(pool),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create database pool");
                return;
            }
        },
        None => {
            tracing::warn!("DATABASE_URL not set, keeping records in memory");
            LocalStore::in_memory()
        }
    };

    let sheet = match SheetClient::new(config.sheet_api_url.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Invalid sheet endpoint");
            return;
        }
    };
    if !sheet.is_enabled() {
        tracing::warn!("SHEET_API_URL not set, cloud sync disabled");
    }

    let records = Records::new(store, sheet);
    match records.refresh_users_from_cloud().await {
        Ok(true) => tracing::info!("Employee list refreshed from sheet"),
        Ok(false) => tracing::info!("Using cached employee list"),
        Err(e) => tracing::warn!(error = %e, "Employee refresh failed"),
    }

    // Create application state
    let app_state = state::AppState::new(records, &config.jwt_secret);

    // Build application under /BabyBoss base path
    let api = routes::create_router(&app_state)
        .route("/", get(|| async { "Baby Boss Sales API" }))
        .route("/health", get(health_check));

    let app = Router::new()
        .nest("/BabyBoss", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Try port..port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = config.port.saturating_add(offset);
            let addr = SocketAddr::from((config.host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => { bound = Some((l, addr)); break; }
                Err(e) => {
                    if offset == 0 { tracing::warn!(%addr, error=%e, "Port in use, trying next"); }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}", addr);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", config.port, config.host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}

async fn health_check() -> &'static str {
    "OK"
}
