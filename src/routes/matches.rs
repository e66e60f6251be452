use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
};

use crate::{
    dto::{
        dashboard::DashboardView,
        matches::{CreateMatchRequest, MatchView},
    },
    error::AppError,
    routes::{AppJson, auth::session_token},
    services::dashboard_service,
    state::{Session, SharedState},
};

/// Dashboard and registry endpoints. Every request carries its resolved session.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/{token}", delete(delete_match))
        .route_layer(middleware::from_fn_with_state(state, resolve_session))
}

/// Render the dashboard for the logged-in account.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "matches",
    params(("x-session-token" = String, Header, description = "Token issued by /auth/login")),
    responses(
        (status = 200, description = "Dashboard", body = DashboardView),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn dashboard(
    State(state): State<SharedState>,
    Extension(session): Extension<Session>,
) -> Result<Json<DashboardView>, AppError> {
    Ok(Json(dashboard_service::dashboard(&state, &session).await?))
}

/// List every match in backend order.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    params(("x-session-token" = String, Header, description = "Token issued by /auth/login")),
    responses(
        (status = 200, description = "Stored matches", body = [MatchView]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    Ok(Json(dashboard_service::list_matches(&state, &session).await?))
}

/// Store a match under its token. Admins only.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    params(("x-session-token" = String, Header, description = "Token issued by /auth/login")),
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Match stored; refreshed dashboard", body = DashboardView),
        (status = 400, description = "Missing fields or malformed body"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Viewer session"),
        (status = 409, description = "Token already used and overwrites are disabled")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Extension(session): Extension<Session>,
    AppJson(payload): AppJson<CreateMatchRequest>,
) -> Result<(StatusCode, Json<DashboardView>), AppError> {
    let view = dashboard_service::add_match(&state, &session, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Delete the match keyed by `token`. Deleting an unknown token succeeds.
#[utoipa::path(
    delete,
    path = "/matches/{token}",
    tag = "matches",
    params(
        ("x-session-token" = String, Header, description = "Token issued by /auth/login"),
        ("token" = String, Path, description = "Token of the match to delete")
    ),
    responses(
        (status = 200, description = "Match deleted; refreshed dashboard", body = DashboardView),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Viewer session")
    )
)]
pub async fn delete_match(
    State(state): State<SharedState>,
    Extension(session): Extension<Session>,
    Path(token): Path<String>,
) -> Result<Json<DashboardView>, AppError> {
    Ok(Json(
        dashboard_service::delete_match(&state, &session, &token).await?,
    ))
}

/// Attach the session matching the `x-session-token` header. Unknown or
/// missing tokens resolve to an anonymous session.
async fn resolve_session(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let session = state.sessions().resolve(session_token(req.headers()));
    req.extensions_mut().insert(session);
    next.run(req).await
}
