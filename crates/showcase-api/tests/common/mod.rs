//! Shared harness for API integration tests
//!
//! Every test gets its own migrated in-memory SQLite database and drives the
//! router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use showcase_api::{
    models::UserRole,
    services::accounts::{self, NewAccount},
    ApiServer, ApiServerConfig,
};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

/// A registered user and their session token
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_signup(true).await
}

pub async fn spawn_app_with_signup(allow_signup: bool) -> TestApp {
    let db = showcase_db::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    showcase_db::migrate(&db)
        .await
        .expect("Failed to run migrations");

    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: false,
        cors_origins: Vec::new(),
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl: Duration::hours(1),
        allow_signup,
    };

    let router = ApiServer::new(config, db.clone()).build_router();

    TestApp { router, db }
}

impl TestApp {
    /// Send a request and return the status with the decoded JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "Non-JSON body for {} {}: {}",
                    method,
                    uri,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(token), None).await
    }

    /// Register `username` through the API (`<username>@example.com`,
    /// password `password123`).
    pub async fn register(&self, username: &str) -> TestUser {
        let (status, body) = self
            .post(
                "/api/users",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Create an admin directly in the database and log in.
    pub async fn admin(&self) -> TestUser {
        accounts::create_account(
            &self.db,
            NewAccount {
                username: "root-admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "admin-password".to_string(),
                role: UserRole::Admin,
            },
        )
        .await
        .expect("Failed to create admin");

        let (status, body) = self
            .post(
                "/api/users/login",
                None,
                json!({"email": "admin@example.com", "password": "admin-password"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        TestUser {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_team(&self, owner: &TestUser, name: &str, is_public: bool) -> Value {
        let (status, body) = self
            .post(
                "/api/teams",
                Some(&owner.token),
                json!({"name": name, "is_public": is_public}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create team failed: {}", body);
        body
    }

    pub async fn join(&self, team_id: &str, user: &TestUser) -> (StatusCode, Value) {
        self.post(
            &format!("/api/teams/{}/members", team_id),
            Some(&user.token),
            json!({"user_id": user.id}),
        )
        .await
    }

    pub async fn create_project(
        &self,
        owner: &TestUser,
        title: &str,
        team_id: Option<&str>,
        tags: &[&str],
    ) -> Value {
        let (status, body) = self
            .post(
                "/api/projects",
                Some(&owner.token),
                json!({
                    "title": title,
                    "description": format!("{} description", title),
                    "code_url": format!("https://github.com/example/{}", title.to_lowercase()),
                    "team_id": team_id,
                    "tags": tags,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
        body
    }
}

/// Collect the string ids of a JSON array of ids
/// Let the clock move so consecutive inserts get distinct `created_at`.
pub async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

pub fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
