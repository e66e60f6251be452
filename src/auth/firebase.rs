//! Firebase Authentication through the Identity Toolkit REST API.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AuthAccount, AuthProvider, AuthProviderError};

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Failures while preparing the Firebase client.
#[derive(Debug, Error)]
pub enum FirebaseAuthError {
    #[error("missing Firebase environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build Firebase auth client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
}

/// Runtime configuration of the Firebase auth provider.
#[derive(Debug, Clone)]
pub struct FirebaseAuthConfig {
    pub api_key: String,
    /// Identity Toolkit endpoint; overridable to target the auth emulator.
    pub base_url: String,
}

impl FirebaseAuthConfig {
    /// Configuration for the hosted endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Read `FIREBASE_API_KEY` (required) and `FIREBASE_AUTH_URL` (optional).
    pub fn from_env() -> Result<Self, FirebaseAuthError> {
        let api_key = std::env::var("FIREBASE_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(FirebaseAuthError::MissingEnvVar {
                var: "FIREBASE_API_KEY",
            })?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("FIREBASE_AUTH_URL") {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Auth provider calling `accounts:signUp` and `accounts:signInWithPassword`.
#[derive(Clone)]
pub struct FirebaseAuthProvider {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl FirebaseAuthProvider {
    /// Build the HTTP client for the given configuration.
    pub fn new(config: FirebaseAuthConfig) -> Result<Self, FirebaseAuthError> {
        let client = Client::builder()
            .build()
            .map_err(|source| FirebaseAuthError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/accounts:{}", self.base_url, action)
    }

    async fn password_call(
        &self,
        action: &'static str,
        identifier: String,
        secret: String,
    ) -> Result<AuthAccount, AuthProviderError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .query(&[("key", self.api_key.as_ref())])
            .json(&PasswordRequest {
                email: &identifier,
                password: &secret,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|source| AuthProviderError::transport(format!("{action} request failed"), source))?;

        if !response.status().is_success() {
            let status = response.status();
            let raw = response.text().await.map_err(|source| {
                AuthProviderError::transport(format!("{action} returned {status}"), source)
            })?;
            return Err(AuthProviderError::Rejected { raw });
        }

        let account = response.json::<AccountResponse>().await.map_err(|source| {
            AuthProviderError::transport(format!("{action} response could not be decoded"), source)
        })?;

        Ok(AuthAccount {
            identifier: account.email.unwrap_or(identifier),
            provider_id: account.local_id,
        })
    }
}

impl AuthProvider for FirebaseAuthProvider {
    fn provider_name(&self) -> &'static str {
        "firebase"
    }

    fn create_account(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>> {
        let provider = self.clone();
        Box::pin(async move { provider.password_call("signUp", identifier, secret).await })
    }

    fn verify_credentials(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>> {
        let provider = self.clone();
        Box::pin(async move {
            provider
                .password_call("signInWithPassword", identifier, secret)
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_identity_toolkit_layout() {
        let mut config = FirebaseAuthConfig::new("key");
        config.base_url = "http://localhost:9099/identitytoolkit.googleapis.com/v1/".into();
        let provider = FirebaseAuthProvider::new(config).unwrap();

        assert_eq!(
            provider.endpoint("signUp"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp"
        );
    }

    #[test]
    fn password_request_uses_camel_case_fields() {
        let body = serde_json::to_value(PasswordRequest {
            email: "a@x.com",
            password: "secret123",
            return_secure_token: true,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "email": "a@x.com",
                "password": "secret123",
                "returnSecureToken": true,
            })
        );
    }
}
