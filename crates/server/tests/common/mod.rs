//! Router over a migrated in-memory SQLite database, driven without a socket.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use configs::MarketplaceConfig;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::{AuthConfig, AuthService};
use service::messaging::LogGateway;

use server::state::AppState;

pub const PASSWORD: &str = "S3curePass!";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub state: AppState,
}

pub async fn build_app() -> anyhow::Result<TestApp> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    let state = AppState {
        db: db.clone(),
        auth: AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1, password_algorithm: "argon2".into() },
        market: Arc::new(MarketplaceConfig::default()),
        gateway: Arc::new(LogGateway),
    };
    let router = server::routes::build_router(state.clone(), tower_http::cors::CorsLayer::very_permissive());
    Ok(TestApp { router, db, state })
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("authorization", format!("Bearer {t}"));
        }
        let req = match body {
            Some(b) => req.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
            None => req.body(Body::empty())?,
        };
        let resp = self.router.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = resp.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }

    /// Register then log in; returns (user id, token).
    pub async fn signup(&self, role: &str) -> anyhow::Result<(String, String)> {
        let email = format!("{role}_{}@example.com", Uuid::new_v4().simple());
        let (status, body) = self
            .send("POST", "/auth/register", None, Some(json!({
                "email": email, "name": "Awa Diop", "password": PASSWORD, "role": role, "phone": "+221771234567"
            })))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "register: {body}");
        self.login(&email).await
    }

    pub async fn login(&self, email: &str) -> anyhow::Result<(String, String)> {
        let (status, body) = self
            .send("POST", "/auth/login", None, Some(json!({ "email": email, "password": PASSWORD })))
            .await?;
        assert_eq!(status, StatusCode::OK, "login: {body}");
        Ok((body["user_id"].as_str().unwrap_or_default().to_string(), body["token"].as_str().unwrap_or_default().to_string()))
    }

    pub async fn admin(&self) -> anyhow::Result<(String, String)> {
        let svc = AuthService::new(Arc::new(SeaOrmAuthRepository::new(self.db.clone())), self.state.auth.clone());
        svc.ensure_admin("root@example.com", PASSWORD).await?;
        self.login("root@example.com").await
    }

    /// A project taken through submit and approval.
    pub async fn approved_project(&self, promoteur: &str, admin: &str) -> anyhow::Result<String> {
        let (status, body) = self.send("POST", "/projects", Some(promoteur), Some(project_body())).await?;
        assert_eq!(status, StatusCode::CREATED, "create: {body}");
        let id = body["id"].as_str().unwrap_or_default().to_string();
        let (status, _) = self.send("POST", &format!("/projects/{id}/submit"), Some(promoteur), None).await?;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .send("POST", &format!("/admin/projects/{id}/moderate"), Some(admin), Some(json!({ "decision": "approve" })))
            .await?;
        assert_eq!(status, StatusCode::OK, "moderate: {body}");
        Ok(id)
    }
}

pub fn project_body() -> Value {
    json!({
        "title": "Residence Les Palmiers",
        "description": "Twelve apartments close to the sea.",
        "city": "Dakar",
        "latitude": 14.6937,
        "longitude": -17.4441,
        "price_min_cents": 5_000_000,
        "price_max_cents": 9_000_000,
        "units_total": 12,
        "delivery_date": "2027-06-30"
    })
}
