use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be greater than zero, got {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Email '{0}' is already in use")]
    EmailInUse(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("User {0} not found")]
    NotFound(Uuid),

    #[error("Role {0} not found")]
    RoleNotFound(Uuid),

    #[error("No users match the query")]
    NoUsersMatched,

    #[error("No user with id {0} was affected")]
    NoRowsAffected(Uuid),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Stable name of the variant for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            UserError::MissingField(_) => "missing_field",
            UserError::OutOfRange { .. } => "out_of_range",
            UserError::InvalidEmail(_) => "invalid_email",
            UserError::EmailInUse(_) => "email_in_use",
            UserError::InvalidQuery(_) => "invalid_query",
            UserError::NotFound(_) => "not_found",
            UserError::RoleNotFound(_) => "role_not_found",
            UserError::NoUsersMatched => "no_users_matched",
            UserError::NoRowsAffected(_) => "no_rows_affected",
            UserError::Database(_) => "database",
        }
    }
}

impl From<DbErr> for UserError {
    fn from(err: DbErr) -> Self {
        UserError::Database(err.to_string())
    }
}

/// Lookups that find nothing are 404; every other failure is a 400.
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::NotFound(_) | UserError::RoleNotFound(_) | UserError::NoUsersMatched => {
                AppError::NotFound(message)
            }
            UserError::MissingField(_)
            | UserError::OutOfRange { .. }
            | UserError::InvalidEmail(_) => AppError::Validation(message),
            UserError::InvalidQuery(_) => AppError::InvalidQuery(message),
            UserError::EmailInUse(_) | UserError::NoRowsAffected(_) => AppError::BadRequest(message),
            UserError::Database(detail) => AppError::Database(detail),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        tracing::info!(kind = self.kind(), error = %self, "User request rejected");
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
