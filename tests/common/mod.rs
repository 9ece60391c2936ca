#![allow(dead_code)]

use std::sync::Arc;

use assetrack::api::{self, AppState};
use assetrack::config::{Config, generate_jwt_secret};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Config backed by a fresh SQLite file and cheap argon2 parameters.
pub fn test_config() -> Config {
    let db_path = std::env::temp_dir().join(format!("assetrack-test-{}.db", Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = generate_jwt_secret();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub async fn spawn_app() -> TestApp {
    let state = api::create_app_state_from_config(test_config(), None)
        .await
        .expect("Failed to create app state");
    let router = api::router(state.clone()).await;
    TestApp { router, state }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/authenticate",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    /// Registers a `USER` account and returns its token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "firstname": "Test",
                    "lastname": "User",
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Id of the account behind `token`.
    pub async fn user_id(&self, token: &str) -> i64 {
        let (status, body) = self.get("/api/v1/auth/me", token).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["id"].as_i64().unwrap()
    }
}

pub fn laptop(name: &str, serial: &str) -> Value {
    json!({
        "name": name,
        "purchase_price": "1500.00",
        "purchase_date": "2024-01-15",
        "useful_life_years": 3,
        "residual_value": "150.00",
        "serial_number": serial,
        "location": "HQ-2F",
    })
}

pub fn license(name: &str, expiry: &str) -> Value {
    json!({
        "name": name,
        "purchase_price": "299.00",
        "purchase_date": "2024-03-01",
        "useful_life_years": 1,
        "license_key": "KEY-1234",
        "expiry_date": expiry,
    })
}
