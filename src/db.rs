use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::migrator::Migrator;

pub type DbPool = Arc<DatabaseConnection>;

/// Connection pool tuning, derived from [`AppConfig`] in production and
/// from `Default` in tests.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub sqlx_logging: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            acquire_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(600),
            sqlx_logging: false,
        }
    }
}

impl DbConfig {
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            sqlx_logging: cfg.is_development(),
        }
    }
}

/// Establishes a database connection pool with the given settings.
pub async fn establish_connection_with_config(config: DbConfig) -> Result<DbPool, DbErr> {
    let mut opts = ConnectOptions::new(config.url.clone());
    opts.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(config.sqlx_logging);

    info!(
        "Connecting to database (max_connections={})",
        config.max_connections
    );
    let conn = Database::connect(opts).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        e
    })?;

    Ok(Arc::new(conn))
}

/// Establishes a connection pool using sensible defaults for the URL.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, DbErr> {
    establish_connection_with_config(DbConfig {
        url: database_url.to_string(),
        ..DbConfig::default()
    })
    .await
}

/// Establishes a connection pool from the application configuration.
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, DbErr> {
    establish_connection_with_config(DbConfig::from_app_config(cfg)).await
}

/// Applies all pending embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbErr> {
    info!("Running database migrations");
    Migrator::up(pool.as_ref(), None).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Verifies the pool can reach the database.
pub async fn check_connection(pool: &DbPool) -> Result<(), DbErr> {
    pool.ping().await
}
