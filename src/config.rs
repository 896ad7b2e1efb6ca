//! Environment configuration.
//!
//! Recognized variables (each default is for local development only):
//! - `DATABASE_URL` — Postgres connection string. Unset selects the
//!   in-memory store, which loses all data on restart.
//! - `JWT_SECRET`   — HS256 signing key. Unset falls back to an insecure
//!   constant; a warning is logged at startup.
//! - `PORT`         — HTTP listen port, defaults to 5000.

use crate::auth::INSECURE_DEV_SECRET;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| INSECURE_DEV_SECRET.to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn jwt_secret_is_default(&self) -> bool {
        self.jwt_secret == INSECURE_DEV_SECRET
    }
}
