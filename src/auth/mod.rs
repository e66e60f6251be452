//! Hosted authentication collaborator: credential creation and verification.

#[cfg(feature = "firebase")]
pub mod firebase;
pub mod memory;

use std::error::Error;

use futures::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

/// Account as known by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    /// Identifier the account signed up with.
    pub identifier: String,
    /// Provider-side account id.
    pub provider_id: String,
}

/// Failures reported by an [`AuthProvider`].
#[derive(Debug, Error)]
pub enum AuthProviderError {
    /// The provider answered and refused the request. `raw` is the body as received.
    #[error("{raw}")]
    Rejected { raw: String },
    /// The provider could not be reached or its answer could not be read.
    #[error("authentication provider unavailable: {message}")]
    Transport {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl AuthProviderError {
    /// Wrap a transport-level failure.
    pub fn transport(message: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        AuthProviderError::Transport {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// Message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthProviderError::Rejected { raw } => parse_provider_error(raw),
            transport => transport.to_string(),
        }
    }
}

/// Credential operations delegated to the hosted authentication service.
pub trait AuthProvider: Send + Sync {
    /// Short provider name used in logs.
    fn provider_name(&self) -> &'static str;
    /// Register a new credential pair.
    fn create_account(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>>;
    /// Check a credential pair.
    fn verify_credentials(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>>;
}

#[derive(Deserialize)]
struct ProviderErrorPayload {
    error: ProviderErrorBody,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Extract `error.message` from a structured provider payload, falling back to
/// the raw text when the payload has another shape.
pub fn parse_provider_error(raw: &str) -> String {
    serde_json::from_str::<ProviderErrorPayload>(raw)
        .map(|payload| payload.error.message)
        .unwrap_or_else(|_| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn structured_payload_yields_nested_message() {
        let raw = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        assert_eq!(parse_provider_error(raw), "EMAIL_EXISTS");
    }

    #[test]
    fn provider_message_is_kept_verbatim() {
        let raw = r#"{"error":{"message":"WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        assert_eq!(
            parse_provider_error(raw),
            "WEAK_PASSWORD : Password should be at least 6 characters"
        );
    }

    #[test]
    fn other_shapes_fall_back_to_raw_text() {
        assert_eq!(parse_provider_error("gateway timeout"), "gateway timeout");
        assert_eq!(
            parse_provider_error(r#"{"error":"denied"}"#),
            r#"{"error":"denied"}"#
        );
        assert_eq!(parse_provider_error(""), "");
    }

    #[test]
    fn transport_errors_describe_themselves() {
        let err = AuthProviderError::transport(
            "connection refused",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(
            err.user_message(),
            "authentication provider unavailable: connection refused"
        );
    }
}
