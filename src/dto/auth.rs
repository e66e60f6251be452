use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{dashboard::DashboardView, format_timestamp},
    state::{SessionTicket, account::Role},
};

/// Credentials and requested role for a new account.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    /// Role recorded for the account. Defaults to `viewer`.
    #[serde(default)]
    pub role: Role,
}

/// Credentials submitted at login.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Confirmation returned once an account exists.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpResponse {
    pub message: String,
    pub identifier: String,
    pub role: Role,
}

/// Session handle plus the first dashboard rendering.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Send back in the `x-session-token` header on later requests.
    pub session_token: Uuid,
    /// RFC 3339 timestamp of the login.
    pub issued_at: String,
    pub dashboard: DashboardView,
}

impl LoginResponse {
    pub fn new(ticket: SessionTicket, dashboard: DashboardView) -> Self {
        Self {
            session_token: ticket.token,
            issued_at: format_timestamp(ticket.issued_at),
            dashboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_role_defaults_to_viewer() {
        let request: SignUpRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "password": "secret123"}"#).unwrap();
        assert_eq!(request.role, Role::Viewer);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let raw = r#"{"email": "a@x.com", "password": "secret123", "role": "owner"}"#;
        assert!(serde_json::from_str::<SignUpRequest>(raw).is_err());
    }

    #[test]
    fn empty_credentials_fail_validation() {
        let request = LoginRequest {
            email: String::new(),
            password: "secret123".into(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
