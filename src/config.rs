use crate::persistence::DatabaseConfig;
use std::net::SocketAddr;
use std::str::FromStr;

/// Which [`MarketStore`](crate::domain::repositories::MarketStore) to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub storage_backend: StorageBackend,
    pub database: DatabaseConfig,
    pub demo_history_days: u32, // Days of generated history for the memory store
    pub demo_seed: Option<u64>, // Fixed seed for reproducible demo data
    pub rate_limit_per_minute: u32, // 0 disables the global limiter
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5000)),
            storage_backend: StorageBackend::Memory,
            database: DatabaseConfig::default(),
            demo_history_days: 14,
            demo_seed: None,
            rate_limit_per_minute: 600,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Parse an environment value, keeping `current` when it is missing or invalid
fn env_override<T, F>(key: &str, current: T, accept: F) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
    F: Fn(&T) -> bool,
{
    let Ok(raw) = std::env::var(key) else {
        return current;
    };
    match raw.parse::<T>() {
        Ok(value) if accept(&value) => value,
        Ok(value) => {
            tracing::warn!(
                "Invalid {} value: {:?} (out of range), using default: {:?}",
                key,
                value,
                current
            );
            current
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {} '{}': {}, using default: {:?}",
                key,
                raw,
                e,
                current
            );
            current
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppConfig {
        let defaults = AppConfig::default();

        let demo_seed = match std::env::var("DEMO_SEED") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    tracing::warn!("Failed to parse DEMO_SEED '{}': {}, using a random seed", raw, e);
                    None
                }
            },
            Err(_) => None,
        };

        AppConfig {
            bind_address: env_override("BIND_ADDRESS", defaults.bind_address, |_| true),
            storage_backend: env_override("STORAGE_BACKEND", defaults.storage_backend, |_| true),
            database: DatabaseConfig::from_env(),
            demo_history_days: env_override("DEMO_HISTORY_DAYS", defaults.demo_history_days, |d| {
                *d <= 365
            }),
            demo_seed,
            rate_limit_per_minute: env_override(
                "RATE_LIMIT_PER_MINUTE",
                defaults.rate_limit_per_minute,
                |_| true,
            ),
            max_body_bytes: env_override("MAX_BODY_BYTES", defaults.max_body_bytes, |n| {
                (1024..=16 * 1024 * 1024).contains(n)
            }),
        }
    }
}
