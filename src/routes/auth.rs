use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, SignUpRequest, SignUpResponse},
        common::ActionResponse,
    },
    error::AppError,
    routes::AppJson,
    services::dashboard_service,
    state::{Session, SharedState},
};

/// Header carrying the token issued by `/auth/login`.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Session token sent with the request, when present and well formed.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// Account lifecycle endpoints reachable without a session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Create an account with the auth provider and record its role.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SignUpResponse),
        (status = 400, description = "Missing fields or malformed body"),
        (status = 401, description = "Rejected by the auth provider"),
        (status = 503, description = "Storage or auth provider unavailable")
    )
)]
pub async fn signup(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    let created = dashboard_service::sign_up(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Verify credentials and open a session.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Missing fields or malformed body"),
        (status = 401, description = "Invalid credentials"),
        (status = 503, description = "Storage or auth provider unavailable")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let mut session = Session::default();
    let response = dashboard_service::login(&state, &mut session, payload).await?;
    Ok(Json(response))
}

/// Close the session identified by the `x-session-token` header, if any.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    params(("x-session-token" = Option<String>, Header, description = "Token issued by /auth/login")),
    responses((status = 200, description = "Logged out", body = ActionResponse))
)]
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Json<ActionResponse> {
    Json(dashboard_service::logout(&state, session_token(&headers)))
}
