//! OpenAPI document served under `/docs`. Request bodies are described by doc-only
//! schemas so the service crate stays free of `utoipa`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// `client` or `promoteur`
    pub role: String,
    pub phone: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub token: String,
}

#[derive(ToSchema)]
pub struct NewProjectRequest {
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min_cents: Option<i64>,
    pub price_max_cents: Option<i64>,
    pub units_total: i32,
    /// `YYYY-MM-DD`
    pub delivery_date: Option<String>,
}

#[derive(ToSchema)]
pub struct ModerationRequest {
    /// `approve` or `reject`
    pub decision: String,
    pub reason: Option<String>,
}

#[derive(ToSchema)]
pub struct NewLeadRequest { pub message: String, pub phone: Option<String> }

#[derive(ToSchema)]
pub struct NewReviewRequest { pub rating: i32, pub comment: Option<String> }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::projects::list,
        crate::routes::projects::get_one,
        crate::routes::projects::create,
        crate::routes::projects::submit,
        crate::routes::projects::moderate,
        crate::routes::leads::create,
        crate::routes::reviews::list,
        crate::routes::reviews::create,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            NewProjectRequest,
            ModerationRequest,
            NewLeadRequest,
            NewReviewRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "projects"),
        (name = "leads"),
        (name = "reviews")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/auth/login", "/projects", "/projects/{id}/leads", "/admin/projects/{id}/moderate"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("bearer"));
    }
}
