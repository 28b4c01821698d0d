use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User, UserFilter, ValidUser};

/// Persistence gateway for users, roles and their associations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// One page of users matching every filter, ordered by id
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Exact, case-sensitive match
    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    /// Insert with a fresh id. A duplicate email fails with `EmailInUse`.
    async fn create(&self, user: ValidUser) -> UserResult<User>;

    /// Overwrite name, age and email; roles are kept.
    /// Fails with `NoRowsAffected` when the id does not exist.
    async fn replace(&self, id: Uuid, user: ValidUser) -> UserResult<User>;

    async fn get_role(&self, id: Uuid) -> UserResult<Option<Role>>;

    /// Append one association row; duplicates are allowed
    async fn add_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()>;

    /// Remove the user and its associations, returning the number of users removed
    async fn delete(&self, id: Uuid) -> UserResult<u64>;

    async fn create_role(&self, name: Option<String>) -> UserResult<Role>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    name: String,
    age: i32,
    email: String,
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<Uuid, StoredUser>,
    roles: HashMap<Uuid, Role>,
    /// (user_id, role_id) in association order
    links: Vec<(Uuid, Uuid)>,
}

impl Store {
    fn roles_of(&self, user_id: Uuid) -> Vec<Role> {
        self.links
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| self.roles.get(r).cloned())
            .collect()
    }

    fn user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).map(|stored| User {
            id,
            name: stored.name.clone(),
            age: stored.age,
            email: stored.email.clone(),
            roles: self.roles_of(id),
        })
    }

    fn matches(&self, id: Uuid, stored: &StoredUser, filter: &UserFilter) -> bool {
        filter
            .user_name
            .as_deref()
            .is_none_or(|needle| contains_ignore_ascii_case(&stored.name, needle))
            && filter.age.is_none_or(|age| stored.age == age)
            && filter
                .email
                .as_deref()
                .is_none_or(|needle| contains_ignore_ascii_case(&stored.email, needle))
            && filter.role_name.as_deref().is_none_or(|needle| {
                self.roles_of(id).iter().any(|role| {
                    role.name
                        .as_deref()
                        .is_some_and(|name| contains_ignore_ascii_case(name, needle))
                })
            })
    }
}

/// Substring match with the same case folding as SQLite's `LIKE`
fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let store = self.store.read().await;

        let users = store
            .users
            .iter()
            .filter(|(id, stored)| store.matches(**id, stored, &filter))
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .filter_map(|(id, _)| store.user(*id))
            .collect();

        Ok(users)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.store.read().await.user(id))
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let store = self.store.read().await;
        Ok(store.users.values().any(|u| u.email == email))
    }

    async fn create(&self, user: ValidUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if store.users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailInUse(user.email));
        }

        let id = Uuid::now_v7();
        store.users.insert(
            id,
            StoredUser {
                name: user.name,
                age: user.age,
                email: user.email,
            },
        );

        store.user(id).ok_or(UserError::NotFound(id))
    }

    async fn replace(&self, id: Uuid, user: ValidUser) -> UserResult<User> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&id) {
            return Err(UserError::NoRowsAffected(id));
        }
        if store
            .users
            .iter()
            .any(|(other, u)| *other != id && u.email == user.email)
        {
            return Err(UserError::EmailInUse(user.email));
        }

        store.users.insert(
            id,
            StoredUser {
                name: user.name,
                age: user.age,
                email: user.email,
            },
        );

        store.user(id).ok_or(UserError::NoRowsAffected(id))
    }

    async fn get_role(&self, id: Uuid) -> UserResult<Option<Role>> {
        Ok(self.store.read().await.roles.get(&id).cloned())
    }

    async fn add_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&user_id) {
            return Err(UserError::NotFound(user_id));
        }
        if !store.roles.contains_key(&role_id) {
            return Err(UserError::RoleNotFound(role_id));
        }

        store.links.push((user_id, role_id));
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<u64> {
        let mut store = self.store.write().await;

        if store.users.remove(&id).is_none() {
            return Ok(0);
        }
        store.links.retain(|(user_id, _)| *user_id != id);
        Ok(1)
    }

    async fn create_role(&self, name: Option<String>) -> UserResult<Role> {
        let role = Role {
            id: Uuid::now_v7(),
            name,
        };
        self.store
            .write()
            .await
            .roles
            .insert(role.id, role.clone());
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid(name: &str, age: i32, email: &str) -> ValidUser {
        ValidUser {
            name: name.into(),
            age,
            email: email.into(),
        }
    }

    fn page(limit: u64, offset: u64) -> UserFilter {
        UserFilter {
            limit,
            offset,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(found.roles.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();

        let err = repo
            .create(valid("Other", 40, "ann@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailInUse(_)));
        assert!(repo.email_exists("ann@example.com").await.unwrap());
        assert!(!repo.email_exists("ANN@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_pages_in_creation_order() {
        let repo = InMemoryUserRepository::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let user = repo
                .create(valid(&format!("user{i}"), 20 + i, &format!("u{i}@example.com")))
                .await
                .unwrap();
            ids.push(user.id);
        }

        let second: Vec<Uuid> = repo
            .list(page(2, 2))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(second, ids[2..4]);

        assert!(repo.list(page(2, 10)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_are_conjunctive() {
        let repo = InMemoryUserRepository::new();
        repo.create(valid("Alice", 30, "alice@example.com")).await.unwrap();
        repo.create(valid("Alicia", 41, "alicia@corp.io")).await.unwrap();
        repo.create(valid("Bob", 30, "bob@example.com")).await.unwrap();

        let filter = UserFilter {
            user_name: Some("ALI".into()),
            age: Some(30),
            ..page(10, 0)
        };
        let users = repo.list(filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Alice");

        let filter = UserFilter {
            email: Some("example".into()),
            ..page(10, 0)
        };
        assert_eq!(repo.list(filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_role_name() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();
        repo.create(valid("Bob", 30, "bob@example.com")).await.unwrap();
        let admin = repo.create_role(Some("Administrator".into())).await.unwrap();
        repo.add_role(ann.id, admin.id).await.unwrap();

        let filter = UserFilter {
            role_name: Some("admin".into()),
            ..page(10, 0)
        };
        let users = repo.list(filter).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, ann.id);
        assert_eq!(users[0].roles, vec![admin]);
    }

    #[tokio::test]
    async fn test_add_role_keeps_duplicates_in_order() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();
        let ops = repo.create_role(Some("ops".into())).await.unwrap();
        let dev = repo.create_role(None).await.unwrap();

        repo.add_role(ann.id, ops.id).await.unwrap();
        repo.add_role(ann.id, dev.id).await.unwrap();
        repo.add_role(ann.id, ops.id).await.unwrap();

        let roles = repo.get_by_id(ann.id).await.unwrap().unwrap().roles;
        assert_eq!(roles, vec![ops.clone(), dev, ops]);
    }

    #[tokio::test]
    async fn test_replace_keeps_roles_and_requires_row() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();
        let ops = repo.create_role(Some("ops".into())).await.unwrap();
        repo.add_role(ann.id, ops.id).await.unwrap();

        let replaced = repo
            .replace(ann.id, valid("Annie", 31, "annie@example.com"))
            .await
            .unwrap();
        assert_eq!(replaced.name, "Annie");
        assert_eq!(replaced.roles, vec![ops]);

        let missing = Uuid::now_v7();
        let err = repo
            .replace(missing, valid("Ghost", 1, "ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NoRowsAffected(id) if id == missing));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_and_drops_links() {
        let repo = InMemoryUserRepository::new();
        let ann = repo.create(valid("Ann", 30, "ann@example.com")).await.unwrap();
        let ops = repo.create_role(Some("ops".into())).await.unwrap();
        repo.add_role(ann.id, ops.id).await.unwrap();

        assert_eq!(repo.delete(ann.id).await.unwrap(), 1);
        assert_eq!(repo.delete(ann.id).await.unwrap(), 0);
        assert!(repo.get_by_id(ann.id).await.unwrap().is_none());
        assert!(repo.get_role(ops.id).await.unwrap().is_some());
    }
}
