use std::env;
use std::str::FromStr;

/// Application configuration parsed from environment variables
///
/// `DATABASE_URL` is required; the pool knobs fall back to defaults sized
/// for a single-process deployment (tests override them downward).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Config {
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 0),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 3),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
