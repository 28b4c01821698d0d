use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entity::{role, user, user_role};
use crate::error::{UserError, UserResult};
use crate::models::{Role, User, UserFilter, ValidUser};
use crate::repository::UserRepository;

/// SQLite implementation of UserRepository using SeaORM.
///
/// Reads go straight to the pool; every write runs in its own transaction,
/// which rolls back when dropped before `commit`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    db: DatabaseConnection,
}

impl SqliteUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `%needle%` with LIKE wildcards in `needle` matched literally
fn like_contains(needle: &str) -> LikeExpr {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{}%", escaped)).escape('\\')
}

/// A unique index violation on insert/update can only come from `users.email`.
fn write_error(err: DbErr, email: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::EmailInUse(email.to_string()),
        _ => err.into(),
    }
}

/// Load the roles of `models` in association order and build domain users.
async fn with_roles<C: ConnectionTrait>(
    conn: &C,
    models: Vec<user::Model>,
) -> UserResult<Vec<User>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let links = user_role::Entity::find()
        .filter(user_role::Column::UserId.is_in(ids))
        .order_by_asc(user_role::Column::Id)
        .find_also_related(role::Entity)
        .all(conn)
        .await?;

    let mut roles: HashMap<Uuid, Vec<Role>> = HashMap::new();
    for (link, role) in links {
        if let Some(role) = role {
            roles.entry(link.user_id).or_default().push(role.into());
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let user_roles = roles.remove(&model.id).unwrap_or_default();
            User::from_model(model, user_roles)
        })
        .collect())
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Id);

        if let Some(name) = &filter.user_name {
            query = query.filter(user::Column::Name.like(like_contains(name)));
        }
        if let Some(age) = filter.age {
            query = query.filter(user::Column::Age.eq(age));
        }
        if let Some(email) = &filter.email {
            query = query.filter(user::Column::Email.like(like_contains(email)));
        }
        if let Some(role_name) = &filter.role_name {
            let linked_users = user_role::Entity::find()
                .select_only()
                .column(user_role::Column::UserId)
                .inner_join(role::Entity)
                .filter(role::Column::Name.like(like_contains(role_name)))
                .into_query();
            query = query.filter(user::Column::Id.in_subquery(linked_users));
        }

        let models = query
            .limit(filter.limit)
            .offset(filter.offset)
            .all(&self.db)
            .await?;

        with_roles(&self.db, models).await
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        Ok(with_roles(&self.db, vec![model]).await?.pop())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(found.is_some())
    }

    async fn create(&self, input: ValidUser) -> UserResult<User> {
        let txn = self.db.begin().await?;

        let model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            age: Set(input.age),
            email: Set(input.email.clone()),
        }
        .insert(&txn)
        .await
        .map_err(|e| write_error(e, &input.email))?;

        txn.commit().await?;

        Ok(User::from_model(model, Vec::new()))
    }

    async fn replace(&self, id: Uuid, input: ValidUser) -> UserResult<User> {
        let txn = self.db.begin().await?;

        let result = user::Entity::update_many()
            .col_expr(user::Column::Name, Expr::value(input.name))
            .col_expr(user::Column::Age, Expr::value(input.age))
            .col_expr(user::Column::Email, Expr::value(input.email.clone()))
            .filter(user::Column::Id.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| write_error(e, &input.email))?;

        if result.rows_affected == 0 {
            return Err(UserError::NoRowsAffected(id));
        }

        let model = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(UserError::NoRowsAffected(id))?;
        let user = with_roles(&txn, vec![model])
            .await?
            .pop()
            .ok_or(UserError::NoRowsAffected(id))?;

        txn.commit().await?;
        Ok(user)
    }

    async fn get_role(&self, id: Uuid) -> UserResult<Option<Role>> {
        let model = role::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn add_role(&self, user_id: Uuid, role_id: Uuid) -> UserResult<()> {
        let txn = self.db.begin().await?;

        user_role::Entity::insert(user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            ..Default::default()
        })
        .exec(&txn)
        .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> UserResult<u64> {
        let txn = self.db.begin().await?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let result = user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected)
    }

    async fn create_role(&self, name: Option<String>) -> UserResult<Role> {
        let model = role::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name),
        }
        .insert(&self.db)
        .await?;

        Ok(model.into())
    }
}
