use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User, UserPayload, UserQuery};
use crate::repository::UserRepository;
use crate::validation::validate_user;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// One page of users. An empty page is reported as `NoUsersMatched`.
    pub async fn list_users(&self, query: UserQuery) -> UserResult<Vec<User>> {
        let filter = query.into_filter()?;
        let users = self.repository.list(filter).await?;

        if users.is_empty() {
            return Err(UserError::NoUsersMatched);
        }
        Ok(users)
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Validate, reject a taken email, then insert with a fresh id
    pub async fn create_user(&self, payload: UserPayload) -> UserResult<User> {
        let input = validate_user(&payload)?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::EmailInUse(input.email));
        }

        let user = self.repository.create(input).await?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Overwrite the user's fields. Email uniqueness is left to the store.
    pub async fn replace_user(&self, id: Uuid, payload: UserPayload) -> UserResult<User> {
        let input = validate_user(&payload)?;

        let user = self.repository.replace(id, input).await?;
        tracing::info!(user_id = %id, "User replaced");
        Ok(user)
    }

    /// Link `role` (by id) to the user and return the user with its roles
    pub async fn add_role(&self, user_id: Uuid, role: Role) -> UserResult<User> {
        if self.repository.get_by_id(user_id).await?.is_none() {
            return Err(UserError::NotFound(user_id));
        }
        if self.repository.get_role(role.id).await?.is_none() {
            return Err(UserError::RoleNotFound(role.id));
        }

        self.repository.add_role(user_id, role.id).await?;
        tracing::info!(user_id = %user_id, role_id = %role.id, "Role added to user");

        self.get_user(user_id).await
    }

    /// Delete without an existence check; an id that matches nothing is an error.
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        let removed = self.repository.delete(id).await?;

        if removed == 0 {
            return Err(UserError::NoRowsAffected(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Provision a role. Not exposed over HTTP.
    pub async fn create_role(&self, name: Option<String>) -> UserResult<Role> {
        let role = self.repository.create_role(name).await?;
        tracing::info!(role_id = %role.id, "Role created");
        Ok(role)
    }
}
