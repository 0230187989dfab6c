// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Maximum number of ranked entries returned by a challenge leaderboard.
pub const LEADERBOARD_LIMIT: i64 = 100;

/// A submission finished in fewer seconds than this unlocks the speed badge.
pub const SPEED_RUN_SECONDS: i64 = 300;

/// Display name used for leaderboard rows whose user record is gone.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// Where the server keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    /// Volatile store, only used when explicitly requested.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: Option<String>,
    /// Opt-in to the in-memory store (`IN_MEMORY_STORE=true`) when no database is configured.
    pub in_memory_store: bool,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let in_memory_store = env::var("IN_MEMORY_STORE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            database_url,
            in_memory_store,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            admin_email: env::var("ADMIN_EMAIL").ok(),
        }
    }

    /// Postgres wins whenever a URL is set. Without one, the in-memory store
    /// must have been asked for.
    pub fn store_backend(&self) -> Result<StoreBackend, &'static str> {
        match (&self.database_url, self.in_memory_store) {
            (Some(url), _) => Ok(StoreBackend::Postgres(url.clone())),
            (None, true) => Ok(StoreBackend::Memory),
            (None, false) => Err("DATABASE_URL must be set (or IN_MEMORY_STORE=true for a throwaway store)"),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
