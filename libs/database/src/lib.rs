//! Database library providing the SQLite connector used by the services
//!
//! # Features
//!
//! - `config` - load [`sqlite::SqliteConfig`] through `core_config::FromEnv`
//!
//! # Example
//!
//! ```ignore
//! use database::sqlite;
//! use migration::Migrator;
//!
//! let db = sqlite::connect("sqlite://vebuser.db?mode=rwc").await?;
//! sqlite::run_migrations::<Migrator>(&db, "vebuser_api").await?;
//! ```

pub mod common;
pub mod sqlite;

pub use common::{DatabaseError, DatabaseResult};
