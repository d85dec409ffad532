//! Application configuration loaded from environment variables.

use std::env;

use inkwell_infra::auth::JwtConfig;
use inkwell_infra::database::DatabaseConfig;
#[cfg(feature = "rate-limit")]
use inkwell_infra::rate_limit::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    /// Key rate limits on `Forwarded`/`X-Forwarded-For` instead of the peer address.
    #[cfg(feature = "rate-limit")]
    pub trust_proxy_headers: bool,
    /// Development user created at startup when running in memory.
    pub seed_user_email: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Call after telemetry is up: missing secrets are reported through `tracing`.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            trust_proxy_headers: parse_var("TRUST_PROXY_HEADERS").unwrap_or(false),
            seed_user_email: env::var("SEED_USER_EMAIL").ok(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
