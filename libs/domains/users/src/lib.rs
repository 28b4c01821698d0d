//! Users Domain
//!
//! Users, roles and the association between them, stored in SQLite.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, email check, empty-page policy
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + SQLite / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Entity    │  ← SeaORM models for users, roles, user_roles
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//!
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod sqlite;
pub mod validation;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use models::{Role, User, UserFilter, UserPayload, UserQuery, ValidUser};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use sqlite::SqliteUserRepository;
pub use validation::validate_user;
