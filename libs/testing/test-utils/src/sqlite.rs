//! SQLite test infrastructure
//!
//! Each `TestDatabase` is a private in-memory database with the full schema
//! applied, so tests can run in parallel without sharing state.

use database::sqlite::{SqliteConfig, connect_from_config, run_migrations};
use migration::Migrator;
use sea_orm::DatabaseConnection;

pub struct TestDatabase {
    pub connection: DatabaseConnection,
}

impl TestDatabase {
    /// Create a migrated in-memory database
    ///
    /// ```ignore
    /// use test_utils::TestDatabase;
    ///
    /// # async fn example() {
    /// let db = TestDatabase::new().await;
    /// let repo = MyRepository::new(db.connection());
    /// # }
    /// ```
    pub async fn new() -> Self {
        let config = SqliteConfig {
            sqlx_logging: false,
            ..SqliteConfig::new("sqlite::memory:")
        };

        let connection = connect_from_config(config)
            .await
            .expect("Failed to open in-memory SQLite database");

        run_migrations::<Migrator>(&connection, "test")
            .await
            .expect("Failed to run migrations");

        tracing::debug!("Test database ready (in-memory SQLite)");

        Self { connection }
    }

    /// Get a handle to the pool (cheap clone)
    pub fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }
}
