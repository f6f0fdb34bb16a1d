//! Garment Inventory API Library
//!
//! REST backend for garment inventory management: product catalog,
//! category hierarchy, supplier registry, purchase/sale orders with
//! transactional stock adjustment, and read-only reporting.

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod services;

use axum::{http::HeaderValue, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::handlers::AppServices;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        let services = AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// The `/api` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::routes())
        .nest("/categories", handlers::categories::routes())
        .nest("/suppliers", handlers::suppliers::routes())
        .nest("/orders", handlers::orders::routes())
        .nest("/system", handlers::system::routes())
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    match config.cors_allowed_origins.as_deref() {
        Some(origins) if !origins.trim().is_empty() => {
            let parsed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        _ => CorsLayer::permissive(),
    }
}

/// Builds the full application router with middleware applied.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors(&state.config);
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}
