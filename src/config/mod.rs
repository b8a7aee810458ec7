use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Session token lifetime when `JWT_EXPIRATION` is unset or unusable.
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL, or `memory` for the in-process store.
    pub database_url: String,
    pub db_max_connections: u32,
    pub cache_backend: CacheBackend,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub cors_origins: Vec<String>,
    pub stripe_secret_key: String,
    pub stripe_api_key: String,
    pub stripe_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Only `JWT_SECRET`
    /// is mandatory.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, env::VarError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(env::VarError::NotPresent)?;
        let cache_backend = var_or("CACHE_BACKEND", "memory")
            .parse()
            .unwrap_or_else(|e: String| {
                tracing::warn!("{}, falling back to memory", e);
                CacheBackend::Memory
            });

        Ok(Config {
            database_url: var_or("DATABASE_URL", "memory"),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", "10").parse().unwrap_or(10),
            cache_backend,
            redis_url: var_or("REDIS_URL", "redis://127.0.0.1/"),
            jwt_secret,
            jwt_expiration_secs: expiration_secs(&var_or("JWT_EXPIRATION", "24h")),
            server_host: var_or("SERVER_HOST", "::"),
            server_port: var_or("SERVER_PORT", "4000").parse().unwrap_or(4000),
            api_base_uri: normalize_base_uri(&var_or("API_BASE_URI", "/api/v1")),
            cors_origins: parse_origins(&var_or("CORS_ORIGINS", "")),
            stripe_secret_key: var_or("STRIPE_SECRET_KEY", ""),
            stripe_api_key: var_or("STRIPE_API_KEY", ""),
            stripe_api_base: var_or("STRIPE_API_BASE", "https://api.stripe.com"),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.eq_ignore_ascii_case("memory")
    }
}

/// `JWT_EXPIRATION` is given in hours, with or without a trailing `h`.
fn expiration_secs(raw: &str) -> u64 {
    raw.trim()
        .trim_end_matches('h')
        .parse::<u64>()
        .ok()
        .and_then(|hours| hours.checked_mul(3600))
        .unwrap_or_else(|| {
            tracing::warn!(value = %raw, "invalid JWT_EXPIRATION, using the default");
            DEFAULT_JWT_EXPIRATION_SECS
        })
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading slash, no trailing slash. The empty string means "serve at root".
fn normalize_base_uri(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
