use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};

/// A named capability that can be linked to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
}

/// A stored user with its roles in association order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server generated, time ordered
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub email: String,
    /// May contain the same role twice
    pub roles: Vec<Role>,
}

impl User {
    pub fn from_model(model: crate::entity::user::Model, roles: Vec<Role>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            age: model.age,
            email: model.email,
            roles,
        }
    }
}

/// Body of create and replace requests.
///
/// Every field is optional at the wire level so that a missing field is
/// reported as a validation error rather than a JSON error. An `id` or
/// `roles` member in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, length(min = 1), email)]
    pub email: Option<String>,
    #[validate(required, range(min = 1, max = 2147483647))]
    pub age: Option<i64>,
}

impl UserPayload {
    pub fn new(name: impl Into<String>, age: i64, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            age: Some(age),
        }
    }
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUser {
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Query string of the list endpoint
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Users per page, at least 1
    pub page_size: i64,
    /// 1-based page number
    pub page_index: i64,
    /// Case-insensitive substring of the name
    pub user_name: Option<String>,
    /// Exact age; 0 or absent disables the filter
    pub age: Option<i64>,
    /// Case-insensitive substring of the email
    pub email: Option<String>,
    /// Case-insensitive substring of any linked role's name
    pub role_name: Option<String>,
}

/// Normalized list criteria handed to the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub user_name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub role_name: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl UserQuery {
    /// Check paging values and turn the query into a page window plus filters.
    pub fn into_filter(self) -> UserResult<UserFilter> {
        if self.page_size <= 0 {
            return Err(UserError::InvalidQuery(format!(
                "pageSize must be at least 1, got {}",
                self.page_size
            )));
        }
        if self.page_index <= 0 {
            return Err(UserError::InvalidQuery(format!(
                "pageIndex must be at least 1, got {}",
                self.page_index
            )));
        }

        let age = match self.age.unwrap_or(0) {
            0 => None,
            a if a < 0 => {
                return Err(UserError::InvalidQuery(format!(
                    "age must not be negative, got {}",
                    a
                )));
            }
            a => Some(i32::try_from(a).map_err(|_| {
                UserError::InvalidQuery(format!("age {} is out of range", a))
            })?),
        };

        let offset = self
            .page_size
            .checked_mul(self.page_index - 1)
            .ok_or_else(|| UserError::InvalidQuery("page window is out of range".to_string()))?;

        Ok(UserFilter {
            user_name: non_empty(self.user_name),
            age,
            email: non_empty(self.email),
            role_name: non_empty(self.role_name),
            limit: self.page_size as u64,
            offset: offset as u64,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page_size: i64, page_index: i64) -> UserQuery {
        UserQuery {
            page_size,
            page_index,
            ..Default::default()
        }
    }

    #[test]
    fn test_into_filter_computes_window() {
        let filter = query(2, 2).into_filter().unwrap();
        assert_eq!(filter.limit, 2);
        assert_eq!(filter.offset, 2);

        let filter = query(10, 1).into_filter().unwrap();
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_into_filter_rejects_non_positive_paging() {
        assert!(matches!(
            query(0, 1).into_filter(),
            Err(UserError::InvalidQuery(_))
        ));
        assert!(matches!(
            query(5, 0).into_filter(),
            Err(UserError::InvalidQuery(_))
        ));
        assert!(matches!(
            query(-1, 3).into_filter(),
            Err(UserError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_into_filter_age_zero_means_no_filter() {
        let mut q = query(5, 1);
        q.age = Some(0);
        assert_eq!(q.into_filter().unwrap().age, None);

        let mut q = query(5, 1);
        q.age = Some(30);
        assert_eq!(q.into_filter().unwrap().age, Some(30));

        let mut q = query(5, 1);
        q.age = Some(-4);
        assert!(q.into_filter().is_err());
    }

    #[test]
    fn test_into_filter_drops_empty_strings() {
        let mut q = query(5, 1);
        q.user_name = Some(String::new());
        q.role_name = Some("adm".into());

        let filter = q.into_filter().unwrap();
        assert_eq!(filter.user_name, None);
        assert_eq!(filter.role_name.as_deref(), Some("adm"));
    }

    #[test]
    fn test_into_filter_rejects_overflowing_window() {
        assert!(query(i64::MAX, 3).into_filter().is_err());
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let q: UserQuery =
            serde_json::from_str(r#"{"pageSize":3,"pageIndex":2,"userName":"ann","roleName":"ops"}"#)
                .unwrap();
        assert_eq!(q.page_size, 3);
        assert_eq!(q.user_name.as_deref(), Some("ann"));
        assert_eq!(q.role_name.as_deref(), Some("ops"));
    }

    #[test]
    fn test_payload_ignores_id_and_roles() {
        let payload: UserPayload = serde_json::from_str(
            r#"{"id":"not-even-a-uuid","name":"Ann","age":30,"email":"ann@example.com","roles":[{"id":1}]}"#,
        )
        .unwrap();
        assert_eq!(payload.name.as_deref(), Some("Ann"));
        assert_eq!(payload.age, Some(30));
    }
}
