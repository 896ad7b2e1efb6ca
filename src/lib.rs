//! Backend for the rent-my-trip marketplace: user accounts (customer and
//! driver), login with signed session tokens, and lodge bookings, persisted
//! either to Postgres or to an in-memory store.

use std::sync::Arc;

use axum::{extract::Extension, Router};
use tower_http::cors::{Any, CorsLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;

use auth::JwtKeys;
use store::SharedStore;

/// Shared handler state: the store behind its trait and the token keys.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub jwt: Arc<JwtKeys>,
    pub port: u16,
}

/// Assembles the full application router. Used by `main` and mounted
/// directly by the integration tests.
pub fn app(state: AppState) -> Router {
    routes::api_router()
        .layer(Extension(state))
        // The SPA runs on its own dev server, so CORS stays wide open.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
