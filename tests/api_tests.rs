mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{ADMIN_PASSWORD, ADMIN_USERNAME, spawn_app};

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/api/v1/assets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(Method::GET, "/api/v1/assets", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bootstrap_admin_can_log_in() {
    let app = spawn_app().await;
    app.state.store().ping().await.unwrap();
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], ADMIN_USERNAME);
    assert_eq!(body["data"]["role"], "ADMIN");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_wrong_password_is_generic_401() {
    let app = spawn_app().await;

    let (wrong_pw, wrong_pw_body) = app
        .send(
            Method::POST,
            "/api/v1/auth/authenticate",
            None,
            Some(json!({ "username": ADMIN_USERNAME, "password": "nope" })),
        )
        .await;
    let (unknown, unknown_body) = app
        .send(
            Method::POST,
            "/api/v1/auth/authenticate",
            None,
            Some(json!({ "username": "ghost", "password": ADMIN_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["error"], unknown_body["error"]);
}

#[tokio::test]
async fn test_register_and_duplicate_username() {
    let app = spawn_app().await;
    let token = app.register("jane").await;

    let (status, body) = app.get("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "USER");
    assert_eq!(body["data"]["enabled"], true);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "firstname": "Jane",
                "lastname": "Again",
                "username": "jane",
                "email": "other@example.com",
                "password": "password123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = spawn_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "firstname": "Short",
                "lastname": "Pw",
                "username": "shorty",
                "email": "shorty@example.com",
                "password": "abc",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Password"));
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let app = spawn_app().await;
    let user = app.register("bob").await;

    let (status, _) = app.get("/api/v1/admin/users", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/metrics", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::GET, "/api/v1/admin/users", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let admin = app.admin_token().await;
    let (status, body) = app.get("/api/v1/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/v1/metrics", &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_disabled_account_is_cut_off_mid_session() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let user = app.register("carol").await;
    let user_id = app.user_id(&user).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/admin/users/{user_id}/status?enabled=false"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], false);

    // The token is still cryptographically valid, but the account is not.
    let (status, body) = app.get("/api/v1/assets", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "User account is disabled");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/authenticate",
            None,
            Some(json!({ "username": "carol", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.send(
        Method::PUT,
        &format!("/api/v1/admin/users/{user_id}/status?enabled=true"),
        Some(&admin),
        None,
    )
    .await;
    let (status, _) = app.get("/api/v1/assets", &user).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_disable_self() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let admin_id = app.user_id(&admin).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/v1/admin/users/{admin_id}/status?enabled=false"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "You cannot disable your own account.");

    let (status, body) = app.get("/api/v1/auth/me", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);
}

#[tokio::test]
async fn test_role_change_takes_effect_on_next_request() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let user = app.register("dave").await;
    let user_id = app.user_id(&user).await;

    let (status, _) = app.get("/api/v1/admin/users", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &format!("/api/v1/admin/users/{user_id}/role"),
            &admin,
            json!({ "role": "ADMIN" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "ADMIN");

    // Authority is reloaded from the store, not read from the token.
    let (status, _) = app.get("/api/v1/admin/users", &user).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put(
            &format!("/api/v1/admin/users/{user_id}/role"),
            &admin,
            json!({ "role": "OWNER" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put("/api/v1/admin/users/9999/role", &admin, json!({ "role": "USER" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_listing_for_any_identity() {
    let app = spawn_app().await;
    let user = app.register("erin").await;

    let (status, body) = app.get("/api/v1/users", &user).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["admin", "erin"]);
}
