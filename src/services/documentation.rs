use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the match tracker backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::matches::dashboard,
        crate::routes::matches::list_matches,
        crate::routes::matches::create_match,
        crate::routes::matches::delete_match,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::common::ActionResponse,
            crate::dto::auth::SignUpRequest,
            crate::dto::auth::SignUpResponse,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::LoginResponse,
            crate::dto::dashboard::DashboardView,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::MatchView,
            crate::state::account::Role,
            crate::state::matches::MatchType,
        )
    ),
    modifiers(&SessionTokenAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Account signup, login and logout"),
        (name = "matches", description = "Dashboard and match registry"),
    )
)]
pub struct ApiDoc;

/// Declares the `x-session-token` header issued at login.
struct SessionTokenAddon;

impl Modify for SessionTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-session-token"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/healthcheck", "/auth/signup", "/auth/login", "/auth/logout", "/dashboard", "/matches", "/matches/{token}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
