use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::SqliteConfig;
use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Connect to a SQLite database using default pool settings
///
/// ```ignore
/// use database::sqlite::connect;
///
/// let db = connect("sqlite://vebuser.db?mode=rwc").await?;
/// ```
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect_from_config(SqliteConfig::new(database_url)).await
}

/// Connect using a [`SqliteConfig`]
pub async fn connect_from_config(config: SqliteConfig) -> Result<DatabaseConnection, DbErr> {
    connect_with_options(config.into_connect_options()).await
}

async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let url = options.get_url().to_owned();
    let db = Database::connect(options).await?;
    info!(%url, "Connected to SQLite database");
    Ok(db)
}

/// Connect from config, retrying with exponential backoff on failure.
///
/// Covers a database file that is briefly locked or a volume that is not
/// mounted yet when the service starts.
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::sqlite::{SqliteConfig, connect_from_config_with_retry};
///
/// let config = SqliteConfig::from_env()?;
/// let db = connect_from_config_with_retry(config, None).await?;
/// ```
pub async fn connect_from_config_with_retry(
    config: SqliteConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    let options = config.into_connect_options();
    let attempt = || connect_with_options(options.clone());

    match retry_config {
        Some(policy) => retry_with_backoff(attempt, policy).await,
        None => retry(attempt).await,
    }
}

/// Apply all pending migrations of `M`
///
/// ```ignore
/// use database::sqlite::run_migrations;
/// use migration::Migrator;
///
/// run_migrations::<Migrator>(&db, "vebuser_api").await?;
/// ```
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!("Running {} database migrations...", app_name);
    M::up(db, None).await?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}
