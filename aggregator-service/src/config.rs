/// Configuration management for the ticketing aggregator.
///
/// Loads from environment variables, following the variable names and
/// defaults fixed by the external interface contract.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub notifier: NotifierConfig,
    pub outbox: OutboxConfig,
    pub idempotency: IdempotencyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub cors_allowed_origins: String,
    /// How often (seconds) the sync scheduler triggers a full sync.
    pub sync_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxConfig {
    pub batch_size: i64,
    pub poll_interval_secs: u64,
    pub max_retries: i32,
    pub days_to_keep: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    pub ttl_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string()),
                sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(86_400),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/aggregator".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(30),
            },
            provider: ProviderConfig {
                base_url: std::env::var("BASE_URL")
                    .unwrap_or_else(|_| "https://provider.example.com".to_string()),
                api_key: std::env::var("LMS_API_KEY").unwrap_or_default(),
                max_retries: std::env::var("MAX_RETRIES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                backoff_factor: std::env::var("BACKOFF_FACTOR")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.5),
            },
            notifier: NotifierConfig {
                base_url: std::env::var("CAPASHINO_BASE_URL")
                    .unwrap_or_else(|_| "https://notifier.example.com".to_string()),
            },
            outbox: OutboxConfig {
                batch_size: std::env::var("BATCH_SIZE_OUTBOX_TASKS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
                poll_interval_secs: std::env::var("POLL_INTERVAL_OUTBOX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                max_retries: std::env::var("MAX_RETRIES_OUTBOX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                days_to_keep: std::env::var("DAYS_TO_KEEP")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7),
            },
            idempotency: IdempotencyConfig {
                ttl_days: std::env::var("TTL_DAYS_IDM_KEYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7),
            },
        })
    }
}
