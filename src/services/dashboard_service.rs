//! Dashboard controller: validates forms, gates on the session, calls the
//! identity store or the registry and renders the refreshed dashboard.

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, SignUpRequest, SignUpResponse},
        common::ActionResponse,
        dashboard::DashboardView,
        matches::{CreateMatchRequest, MatchView},
    },
    error::ServiceError,
    state::{Session, SharedState, account::Account},
};

const SIGNUP_SUCCEEDED: &str = "Account created successfully!";
const LOGOUT_SUCCEEDED: &str = "Logged out successfully.";
const MATCH_ADDED: &str = "Match added successfully!";
const MATCH_DELETED: &str = "Match deleted.";

/// Prefix provider rejections with the action that failed.
fn auth_failure(action: &'static str) -> impl Fn(ServiceError) -> ServiceError {
    move |err| match err {
        ServiceError::Auth(message) => ServiceError::Auth(format!("{action} failed: {message}")),
        other => other,
    }
}

/// Register a new account with the requested role.
pub async fn sign_up(
    state: &SharedState,
    request: SignUpRequest,
) -> Result<SignUpResponse, ServiceError> {
    request.validate()?;

    let account = state
        .identity()
        .await?
        .sign_up(&request.email, &request.password, request.role)
        .await
        .map_err(auth_failure("Signup"))?;

    Ok(SignUpResponse {
        message: SIGNUP_SUCCEEDED.into(),
        identifier: account.identifier,
        role: account.role,
    })
}

/// Verify credentials, authenticate `session` and open a registry entry for it.
pub async fn login(
    state: &SharedState,
    session: &mut Session,
    request: LoginRequest,
) -> Result<LoginResponse, ServiceError> {
    request.validate()?;

    let account = state
        .identity()
        .await?
        .login(&request.email, &request.password)
        .await
        .map_err(auth_failure("Login"))?;

    // Nothing is registered until the dashboard rendered.
    let welcome = format!("Welcome {}!", account.identifier);
    let dashboard = render(state, &account, Some(welcome)).await?;

    session.authenticate(account.clone());
    let ticket = state.sessions().open(account);
    Ok(LoginResponse::new(ticket, dashboard))
}

/// Clear the session and forget its token. Always succeeds.
pub fn logout(state: &SharedState, token: Option<Uuid>) -> ActionResponse {
    let mut session = state.sessions().resolve(token);
    let identifier = session.account().map(|account| account.identifier.clone());
    session.logout();

    if let Some(token) = token {
        state.sessions().close(token);
    }
    if let Some(identifier) = identifier {
        info!(identifier = %identifier, live_sessions = state.sessions().len(), "logout");
    }
    ActionResponse::new(LOGOUT_SUCCEEDED)
}

/// Current dashboard for any logged-in account.
pub async fn dashboard(state: &SharedState, session: &Session) -> Result<DashboardView, ServiceError> {
    refresh(state, session, None).await
}

/// Re-read the registry and render it for the session's account.
pub async fn refresh(
    state: &SharedState,
    session: &Session,
    message: Option<String>,
) -> Result<DashboardView, ServiceError> {
    let account = session.require_account()?;
    render(state, account, message).await
}

async fn render(
    state: &SharedState,
    account: &Account,
    message: Option<String>,
) -> Result<DashboardView, ServiceError> {
    let matches = state.registry().await?.list_matches().await?;
    Ok(DashboardView::render(account, matches, message))
}

/// Every match, for any logged-in account.
pub async fn list_matches(
    state: &SharedState,
    session: &Session,
) -> Result<Vec<MatchView>, ServiceError> {
    session.require_account()?;
    let matches = state.registry().await?.list_matches().await?;
    Ok(matches.into_iter().map(MatchView::from).collect())
}

/// Create or overwrite a match. Admins only.
pub async fn add_match(
    state: &SharedState,
    session: &Session,
    request: CreateMatchRequest,
) -> Result<DashboardView, ServiceError> {
    let account = session.require_admin()?;
    request.validate()?;

    state
        .registry()
        .await?
        .add_match(account, request.into())
        .await?;
    render(state, account, Some(MATCH_ADDED.into())).await
}

/// Delete the match keyed by `token`. Admins only.
pub async fn delete_match(
    state: &SharedState,
    session: &Session,
    token: &str,
) -> Result<DashboardView, ServiceError> {
    let account = session.require_admin()?;
    state
        .registry()
        .await?
        .delete_match(account, token)
        .await?;
    render(state, account, Some(MATCH_DELETED.into())).await
}
