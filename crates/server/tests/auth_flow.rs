mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use common::{build_app, PASSWORD};

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = app.send("GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn register_login_and_me() -> anyhow::Result<()> {
    let app = build_app().await?;
    let payload = json!({ "email": "Buyer@Example.com", "name": "Moussa Ba", "password": PASSWORD, "role": "client" });
    let (status, body) = app.send("POST", "/auth/register", None, Some(payload.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["user_id"].is_string());

    let (status, body) = app.send("POST", "/auth/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, token) = app.login("buyer@example.com").await?;
    let (status, me) = app.send("GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "buyer@example.com");
    assert_eq!(me["role"], "client");

    let (status, me) = app.send("PUT", "/auth/me", Some(&token), Some(json!({ "name": "Moussa B." }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Moussa B.");
    Ok(())
}

#[tokio::test]
async fn login_sets_http_only_cookie_usable_as_credential() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, token) = app.signup("client").await?;
    let req = Request::builder()
        .method("GET")
        .uri("/auth/me")
        .header("cookie", format!("auth_token={token}"))
        .body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.router.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cleared = resp.headers().get("set-cookie").map(|v| v.to_str().unwrap_or_default().to_string()).unwrap_or_default();
    assert!(cleared.starts_with("auth_token="), "{cleared}");
    assert!(cleared.contains("Max-Age=0"), "{cleared}");
    assert!(cleared.contains("Path=/"), "{cleared}");
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_answer_json_validation_errors() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = app
        .send("POST", "/auth/register", None, Some(json!({ "email": "a@example.com", "name": "Awa", "role": "client" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().unwrap_or_default().contains("password"));

    let payload = json!({ "email": "a@example.com", "name": "Awa", "password": PASSWORD, "role": "superuser" });
    let (status, body) = app.send("POST", "/auth/register", None, Some(payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (_, token) = app.signup("client").await?;
    let (status, body) = app.send("GET", "/leads/not-a-uuid", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = app.send("GET", "/projects?page=abc", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_and_missing_token_are_unauthorized() -> anyhow::Result<()> {
    let app = build_app().await?;
    app.signup("promoteur").await?;
    let (status, _) = app
        .send("POST", "/auth/login", None, Some(json!({ "email": "nobody@example.com", "password": PASSWORD })))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("GET", "/auth/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = app.send("GET", "/me/leads", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn self_registration_as_admin_is_rejected() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, _) = app
        .send("POST", "/auth/register", None, Some(json!({ "email": "x@example.com", "name": "Eve", "password": PASSWORD, "role": "admin" })))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_admin_role() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (_, client) = app.signup("client").await?;
    let (status, _) = app.send("GET", "/admin/users", Some(&client), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, admin) = app.admin().await?;
    let (status, page) = app.send("GET", "/admin/users?role=client", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    Ok(())
}
