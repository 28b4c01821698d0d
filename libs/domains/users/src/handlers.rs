use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, JsonBody, QueryParams, UuidPath,
    errors::responses::{BadRequestResponse, BadRequestUuidResponse, NotFoundResponse},
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{Role, User, UserPayload, UserQuery};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "Users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, replace_user, delete_user, add_role),
    components(
        schemas(User, Role, UserPayload),
        responses(BadRequestResponse, BadRequestUuidResponse, NotFoundResponse)
    ),
    tags(
        (name = TAG, description = "User and role association endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(replace_user).delete(delete_user))
        .route("/AddRole/{id}", patch(add_role))
        .with_state(shared_service)
}

/// Audit a write on `user:{id}`; failures carry the error kind
fn audit<T>(
    action: &str,
    id: Option<Uuid>,
    headers: &HeaderMap,
    result: &UserResult<T>,
) -> AuditEvent {
    let resource = id.map(|id| format!("user:{}", id));
    let event = match result {
        Ok(_) => AuditEvent::new(action, resource, AuditOutcome::Success),
        Err(err) => AuditEvent::new(action, resource, AuditOutcome::Failure)
            .with_details(json!({ "error": err.kind() })),
    };

    event
        .with_ip(extract_ip_from_headers(headers))
        .with_user_agent(extract_user_agent(headers))
}

/// List one page of users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserQuery),
    responses(
        (status = 200, description = "Page of users ordered by id", body = Vec<User>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    QueryParams(query): QueryParams<UserQuery>,
) -> UserResult<Json<Vec<User>>> {
    let users = service.list_users(query).await?;
    Ok(Json(users))
}

/// Create a user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = UserPayload,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<UserPayload>,
) -> UserResult<Json<User>> {
    let result = service.create_user(payload).await;
    audit("user.create", result.as_ref().ok().map(|u| u.id), &headers, &result).log();

    Ok(Json(result?))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Replace a user's name, age and email
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User replaced", body = User),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn replace_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    JsonBody(payload): JsonBody<UserPayload>,
) -> UserResult<Json<User>> {
    let result = service.replace_user(id, payload).await;
    audit("user.replace", Some(id), &headers, &result).log();

    Ok(Json(result?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    let result = service.delete_user(id).await;
    audit("user.delete", Some(id), &headers, &result).log();

    result?;
    Ok(StatusCode::OK)
}

/// Link an existing role to a user
#[utoipa::path(
    patch,
    path = "/AddRole/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body(content = Role, description = "Only the role id is used"),
    responses(
        (status = 200, description = "User with the role appended", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_role<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    JsonBody(role): JsonBody<Role>,
) -> UserResult<Json<User>> {
    let role_id = role.id;
    let result = service.add_role(id, role).await;

    let event = audit("user.add_role", Some(id), &headers, &result);
    match &result {
        Ok(_) => event.with_details(json!({ "role_id": role_id })).log(),
        Err(_) => event.log(),
    }

    Ok(Json(result?))
}
