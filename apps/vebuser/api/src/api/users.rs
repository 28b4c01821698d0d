use axum::Router;
use domain_users::{SqliteUserRepository, UserService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = SqliteUserRepository::new(state.db.clone());
    let service = UserService::new(repository);
    handlers::router(service)
}
