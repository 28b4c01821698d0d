//! Handler tests for the Users domain
//!
//! These exercise the users router alone over the in-memory repository:
//! - request decoding (query string, JSON body, UUID path)
//! - status codes for every endpoint
//! - JSON error bodies

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::ErrorResponse;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

fn app() -> (Router, InMemoryUserRepository) {
    let repo = InMemoryUserRepository::new();
    let service = UserService::new(repo.clone());
    (handlers::router(service), repo)
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, name: &str, age: i64, email: &str) -> User {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "name": name, "age": age, "email": email }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_create_returns_200_with_record() {
    let (app, _) = app();

    let user = create(&app, "Ann", 30, "ann@example.com").await;

    assert_eq!(user.name, "Ann");
    assert_eq!(user.age, 30);
    assert!(user.roles.is_empty());
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let (app, _) = app();
    let client_id = Uuid::now_v7();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "id": client_id, "name": "Ann", "age": 30, "email": "ann@example.com", "roles": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: User = json_body(response.into_body()).await;
    assert_ne!(user.id, client_id);
}

#[tokio::test]
async fn test_create_invalid_payloads_return_400_and_persist_nothing() {
    let (app, _) = app();

    for body in [
        json!({ "name": "", "age": 30, "email": "ann@example.com" }),
        json!({ "name": "Ann", "age": 30, "email": "" }),
        json!({ "name": "Ann", "age": 0, "email": "ann@example.com" }),
        json!({ "name": "Ann", "age": -3, "email": "ann@example.com" }),
        json!({ "name": "Ann", "email": "ann@example.com" }),
        json!({ "name": "Ann", "age": 30, "email": "not-an-email" }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");

        let error: ErrorResponse = json_body(response.into_body()).await;
        assert_eq!(error.error, "VALIDATION_ERROR");
    }

    let response = app
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_duplicate_email_returns_400() {
    let (app, _) = app();
    create(&app, "Ann", 30, "ann@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/",
            json!({ "name": "Other", "age": 41, "email": "ann@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=1"))
        .await
        .unwrap();
    let users: Vec<User> = json_body(response.into_body()).await;
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let (app, _) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_round_trip_and_missing() {
    let (app, _) = app();
    let created = create(&app, "Ann", 30, "ann@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: User = json_body(response.into_body()).await;
    assert_eq!(fetched, created);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", Uuid::now_v7())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(empty_request("GET", "/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_pagination_and_filters() {
    let (app, _) = app();
    let mut ids = Vec::new();
    for i in 0..5 {
        let age = if i % 2 == 0 { 30 } else { 40 };
        let user = create(&app, &format!("user{i}"), age, &format!("u{i}@example.com")).await;
        ids.push(user.id);
    }

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?pageSize=2&pageIndex=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Vec<User> = json_body(response.into_body()).await;
    let page_ids: Vec<Uuid> = page.iter().map(|u| u.id).collect();
    assert_eq!(page_ids, ids[2..4]);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=1&age=0"))
        .await
        .unwrap();
    let all: Vec<User> = json_body(response.into_body()).await;
    assert_eq!(all.len(), 5);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=1&age=30"))
        .await
        .unwrap();
    let thirty: Vec<User> = json_body(response.into_body()).await;
    assert_eq!(thirty.len(), 3);
    assert!(thirty.iter().all(|u| u.age == 30));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=1&userName=USER3"))
        .await
        .unwrap();
    let named: Vec<User> = json_body(response.into_body()).await;
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].id, ids[3]);
}

#[tokio::test]
async fn test_list_invalid_paging_returns_400() {
    let (app, _) = app();
    create(&app, "Ann", 30, "ann@example.com").await;

    for uri in [
        "/?pageSize=0&pageIndex=1",
        "/?pageSize=5&pageIndex=0",
        "/?pageSize=abc&pageIndex=1",
        "/?pageIndex=1",
    ] {
        let response = app.clone().oneshot(empty_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");

        let error: ErrorResponse = json_body(response.into_body()).await;
        assert_eq!(error.error, "INVALID_QUERY");
    }
}

#[tokio::test]
async fn test_list_page_past_end_returns_404() {
    let (app, _) = app();
    create(&app, "Ann", 30, "ann@example.com").await;

    let response = app
        .oneshot(empty_request("GET", "/?pageSize=10&pageIndex=2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_replace_overwrites_fields() {
    let (app, _) = app();
    let created = create(&app, "Ann", 30, "ann@example.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/{}", created.id),
            json!({ "name": "Annie", "age": 31, "email": "annie@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let replaced: User = json_body(response.into_body()).await;
    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.name, "Annie");
    assert_eq!(replaced.email, "annie@example.com");
}

#[tokio::test]
async fn test_replace_missing_user_returns_400() {
    let (app, _) = app();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/{}", Uuid::now_v7()),
            json!({ "name": "Ghost", "age": 1, "email": "ghost@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_role_appends_duplicates() {
    let (app, repo) = app();
    let created = create(&app, "Ann", 30, "ann@example.com").await;
    let role = repo.create_role(Some("ops".into())).await.unwrap();

    for expected in 1..=2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/AddRole/{}", created.id),
                json!({ "id": role.id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let user: User = json_body(response.into_body()).await;
        assert_eq!(user.roles.len(), expected);
        assert!(user.roles.iter().all(|r| *r == role));
    }
}

#[tokio::test]
async fn test_add_role_missing_ends_return_404() {
    let (app, repo) = app();
    let created = create(&app, "Ann", 30, "ann@example.com").await;
    let role = repo.create_role(Some("ops".into())).await.unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/AddRole/{}", Uuid::now_v7()),
            json!({ "id": role.id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(json_request(
            "PATCH",
            &format!("/AddRole/{}", created.id),
            json!({ "id": Uuid::now_v7(), "name": "ops" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_returns_404() {
    let (app, _) = app();
    let created = create(&app, "Ann", 30, "ann@example.com").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(empty_request("DELETE", &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
