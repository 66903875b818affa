//! Persistence Layer
//!
//! Two interchangeable [`MarketStore`](crate::domain::repositories::MarketStore)
//! backends: an in-memory store for demos and tests, and a SQLite store using
//! async operations via sqlx.
//!
//! # Database Schema
//!
//! ## commodities
//! - id, name (localized, unique), english_name
//! - sentiment_score, price, price_change: stored defaults
//! - keywords: JSON array
//!
//! ## price_history
//! - date, commodity (localized name), closing_price
//!
//! ## daily_market_summary
//! - date, commodity, daily_sentiment_score, rationale
//! - daily_keywords: JSON keyword set
//! - article_count
//!
//! ## raw_news / news_analysis_results
//! - raw articles from the ingestion pipeline and their per-article analysis
//!
//! ## chat_messages / email_alerts
//! - chatbot audit log and alert subscriptions (commodities as JSON array)

pub mod memory;
pub mod models;
pub mod repository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::domain::catalog::COMMODITIES;
use crate::domain::errors::StorageError;

pub use memory::MemoryMarketStore;
pub use repository::SqliteMarketStore;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/commodities.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Enable query logging
    pub log_queries: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/commodities.db".to_string(),
            max_connections: 5,
            log_queries: cfg!(debug_assertions),
        }
    }
}

impl DatabaseConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let url = std::env::var("DATABASE_URL").unwrap_or(defaults.url);

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| (1..=64).contains(n))
            .unwrap_or(defaults.max_connections);

        let log_queries = std::env::var("DATABASE_LOG_QUERIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.log_queries);

        Self {
            url,
            max_connections,
            log_queries,
        }
    }

    /// In-memory SQLite lives per connection, so the pool must stay at one
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Open the connection pool and run migrations
pub async fn init_database(config: &DatabaseConfig) -> Result<DbPool, StorageError> {
    info!("Initializing database: {}", config.url);

    // Ensure data directory exists
    if let Some(db_path) = config.url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Database(sqlx::Error::Configuration(Box::new(e)))
                })?;
            }
        }
    }

    let mut options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !config.log_queries {
        options = options.disable_statement_logging();
    }

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_options.connect_with(options).await?;

    run_migrations(&pool).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

async fn execute_migration(pool: &DbPool, name: &str, sql: &str) -> Result<(), StorageError> {
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| StorageError::Migration(format!("Failed to apply {}: {}", name, e)))?;
    Ok(())
}

/// Run database migrations
async fn run_migrations(pool: &DbPool) -> Result<(), StorageError> {
    info!("Running database migrations...");

    execute_migration(
        pool,
        "commodities table",
        r#"
        CREATE TABLE IF NOT EXISTS commodities (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            english_name TEXT NOT NULL,
            sentiment_score REAL NOT NULL,
            price REAL NOT NULL,
            price_change REAL NOT NULL DEFAULT 0.0,
            keywords TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "price_history table",
        r#"
        CREATE TABLE IF NOT EXISTS price_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            commodity TEXT NOT NULL,
            closing_price REAL NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "daily_market_summary table",
        r#"
        CREATE TABLE IF NOT EXISTS daily_market_summary (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            commodity TEXT NOT NULL,
            daily_sentiment_score REAL NOT NULL,
            rationale TEXT,
            daily_keywords TEXT NOT NULL DEFAULT '{}',
            article_count INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "raw_news table",
        r#"
        CREATE TABLE IF NOT EXISTS raw_news (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            commodity TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            source_url TEXT,
            published_time DATETIME NOT NULL,
            relevant_news BOOLEAN NOT NULL DEFAULT 1,
            analysis_status BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "news_analysis_results table",
        r#"
        CREATE TABLE IF NOT EXISTS news_analysis_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            raw_news_id INTEGER NOT NULL,
            sentiment_score REAL NOT NULL,
            keywords TEXT NOT NULL DEFAULT '{}',
            rationale TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (raw_news_id) REFERENCES raw_news(id)
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "chat_messages table",
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    execute_migration(
        pool,
        "email_alerts table",
        r#"
        CREATE TABLE IF NOT EXISTS email_alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL,
            commodities TEXT NOT NULL,
            frequency TEXT NOT NULL CHECK(frequency IN ('hourly', 'daily', 'weekly', 'on_update')),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    // Create indexes for better query performance
    for (name, sql) in [
        (
            "idx_price_history_commodity_date",
            "CREATE INDEX IF NOT EXISTS idx_price_history_commodity_date ON price_history(commodity, date)",
        ),
        (
            "idx_summary_commodity_date",
            "CREATE INDEX IF NOT EXISTS idx_summary_commodity_date ON daily_market_summary(commodity, date)",
        ),
        (
            "idx_raw_news_published",
            "CREATE INDEX IF NOT EXISTS idx_raw_news_published ON raw_news(published_time)",
        ),
        (
            "idx_analysis_raw_news",
            "CREATE INDEX IF NOT EXISTS idx_analysis_raw_news ON news_analysis_results(raw_news_id)",
        ),
    ] {
        execute_migration(pool, name, sql).await?;
    }

    seed_commodities(pool).await?;

    info!("✓ Database migrations completed successfully");

    Ok(())
}

/// Insert the catalog commodities that are not stored yet
async fn seed_commodities(pool: &DbPool) -> Result<(), StorageError> {
    for profile in COMMODITIES {
        let keywords = serde_json::to_string(profile.default_keywords)?;
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO commodities
                (id, name, english_name, sentiment_score, price, price_change, keywords)
            VALUES (?1, ?2, ?3, ?4, ?5, 0.0, ?6)
            "#,
        )
        .bind(profile.id)
        .bind(profile.name)
        .bind(profile.english_name)
        .bind(profile.base_score)
        .bind(profile.base_price)
        .bind(&keywords)
        .execute(pool)
        .await
        .map_err(|e| StorageError::Migration(format!("Failed to seed commodities: {}", e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            log_queries: false,
        }
    }

    #[tokio::test]
    async fn test_database_init() {
        let pool = init_database(&memory_config()).await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_migrations_create_tables_and_seed() {
        let pool = init_database(&memory_config()).await.unwrap();

        let tables: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN \
             ('commodities', 'price_history', 'daily_market_summary', 'raw_news', \
              'news_analysis_results', 'chat_messages', 'email_alerts')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables.0, 7);

        let commodities: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commodities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(commodities.0, 5);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = init_database(&memory_config()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let commodities: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commodities")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(commodities.0, 5);
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "sqlite://data/commodities.db");
        assert_eq!(config.max_connections, 5);
        assert!(!config.is_in_memory());
        assert!(memory_config().is_in_memory());
    }
}
