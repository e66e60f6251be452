//! In-process authentication provider for local development and tests.
//!
//! Rejections carry the same structured payloads as the hosted provider so the
//! error path through [`parse_provider_error`](super::parse_provider_error) is
//! exercised. Secrets are kept in memory as given; never use this outside
//! development.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use serde_json::json;
use uuid::Uuid;

use super::{AuthAccount, AuthProvider, AuthProviderError};

const MIN_SECRET_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Credential {
    secret: String,
    provider_id: String,
}

/// Authentication provider backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthProvider {
    accounts: Arc<DashMap<String, Credential>>,
}

impl MemoryAuthProvider {
    /// Provider without any registered account.
    pub fn new() -> Self {
        Self::default()
    }
}

fn rejection(message: &str) -> AuthProviderError {
    AuthProviderError::Rejected {
        raw: json!({ "error": { "code": 400, "message": message } }).to_string(),
    }
}

fn looks_like_email(identifier: &str) -> bool {
    identifier
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
}

impl AuthProvider for MemoryAuthProvider {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    fn create_account(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>> {
        let accounts = self.accounts.clone();
        Box::pin(async move {
            if !looks_like_email(&identifier) {
                return Err(rejection("INVALID_EMAIL"));
            }
            if secret.len() < MIN_SECRET_LEN {
                return Err(rejection(
                    "WEAK_PASSWORD : Password should be at least 6 characters",
                ));
            }

            match accounts.entry(identifier.clone()) {
                Entry::Occupied(_) => Err(rejection("EMAIL_EXISTS")),
                Entry::Vacant(slot) => {
                    let provider_id = Uuid::new_v4().simple().to_string();
                    slot.insert(Credential {
                        secret,
                        provider_id: provider_id.clone(),
                    });
                    Ok(AuthAccount {
                        identifier,
                        provider_id,
                    })
                }
            }
        })
    }

    fn verify_credentials(
        &self,
        identifier: String,
        secret: String,
    ) -> BoxFuture<'static, Result<AuthAccount, AuthProviderError>> {
        let accounts = self.accounts.clone();
        Box::pin(async move {
            let provider_id = accounts
                .get(&identifier)
                .filter(|credential| credential.secret == secret)
                .map(|credential| credential.provider_id.clone())
                .ok_or_else(|| rejection("INVALID_LOGIN_CREDENTIALS"))?;

            Ok(AuthAccount {
                identifier,
                provider_id,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_message(result: Result<AuthAccount, AuthProviderError>) -> String {
        result.unwrap_err().user_message()
    }

    #[tokio::test]
    async fn signup_then_login_succeeds() {
        let provider = MemoryAuthProvider::new();
        let created = provider
            .create_account("a@x.com".into(), "secret123".into())
            .await
            .unwrap();
        let verified = provider
            .verify_credentials("a@x.com".into(), "secret123".into())
            .await
            .unwrap();

        assert_eq!(created, verified);
        assert_eq!(verified.identifier, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_weak_and_malformed_signups_are_rejected() {
        let provider = MemoryAuthProvider::new();
        provider
            .create_account("a@x.com".into(), "secret123".into())
            .await
            .unwrap();

        let duplicate = provider
            .create_account("a@x.com".into(), "another1".into())
            .await;
        assert_eq!(rejected_message(duplicate), "EMAIL_EXISTS");

        let weak = provider.create_account("b@x.com".into(), "123".into()).await;
        assert_eq!(
            rejected_message(weak),
            "WEAK_PASSWORD : Password should be at least 6 characters"
        );

        let malformed = provider
            .create_account("not-an-email".into(), "secret123".into())
            .await;
        assert_eq!(rejected_message(malformed), "INVALID_EMAIL");

        let rejected_signup = provider
            .verify_credentials("b@x.com".into(), "123".into())
            .await;
        assert_eq!(rejected_message(rejected_signup), "INVALID_LOGIN_CREDENTIALS");
    }

    #[tokio::test]
    async fn wrong_secret_or_unknown_account_fails_login() {
        let provider = MemoryAuthProvider::new();
        provider
            .create_account("a@x.com".into(), "secret123".into())
            .await
            .unwrap();

        for (identifier, secret) in [("a@x.com", "wrong-secret"), ("z@x.com", "secret123")] {
            let result = provider
                .verify_credentials(identifier.into(), secret.into())
                .await;
            assert_eq!(rejected_message(result), "INVALID_LOGIN_CREDENTIALS");
        }
    }
}
