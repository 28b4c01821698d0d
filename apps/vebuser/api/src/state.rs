//! Shared application state passed to routers at startup.

use database::sqlite::DatabaseConnection;

/// Cloned into each router that needs it (the pool is reference counted).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// SQLite connection pool
    pub db: DatabaseConnection,
}
