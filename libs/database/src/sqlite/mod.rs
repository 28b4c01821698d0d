//! SQLite database connector and utilities
//!
//! Provides connection management, migration running, and health checks for
//! the embedded SQLite store.

mod config;
mod connector;
mod health;

pub use config::{SqliteConfig, DEFAULT_DATABASE_URL};
pub use connector::{connect, connect_from_config, connect_from_config_with_retry, run_migrations};
pub use health::check_health;

// Re-export SeaORM types for convenience
pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
pub use sea_orm_migration::MigratorTrait;
