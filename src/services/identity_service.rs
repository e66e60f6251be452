//! Identity & role store: signup, login and role lookup on top of the auth
//! provider and the `users` collection.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    auth::AuthProvider,
    dao::{
        models::{AccountEntity, USERS_COLLECTION, from_record, to_record},
        record_store::{RecordPath, RecordStore},
    },
    error::ServiceError,
    state::account::{Account, Role},
};

/// Resolves identities and their roles.
pub struct IdentityStore {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RecordStore>,
}

impl IdentityStore {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self { auth, store }
    }

    fn role_path(&self, identifier: &str) -> RecordPath {
        let key = self.store.account_keying().key_for(identifier);
        RecordPath::new(USERS_COLLECTION, key)
    }

    /// Create the credential with the auth provider, then persist the requested role.
    pub async fn sign_up(
        &self,
        identifier: &str,
        secret: &str,
        requested_role: Role,
    ) -> Result<Account, ServiceError> {
        let created = self
            .auth
            .create_account(identifier.to_owned(), secret.to_owned())
            .await?;

        let path = self.role_path(identifier);
        let record = to_record(&path, &AccountEntity::with_role(requested_role))?;
        self.store.write(path, record).await?;

        info!(
            identifier = %created.identifier,
            provider_id = %created.provider_id,
            role = requested_role.as_str(),
            "account created"
        );
        Ok(Account::new(identifier, requested_role))
    }

    /// Verify the credentials, then resolve the role of the account.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Account, ServiceError> {
        let verified = self
            .auth
            .verify_credentials(identifier.to_owned(), secret.to_owned())
            .await?;

        let role = self.get_role(identifier).await?;
        info!(
            identifier = %verified.identifier,
            provider_id = %verified.provider_id,
            role = role.as_str(),
            "login succeeded"
        );
        Ok(Account::new(identifier, role))
    }

    /// Role stored for `identifier`; `viewer` when no usable record exists.
    pub async fn get_role(&self, identifier: &str) -> Result<Role, ServiceError> {
        let path = self.role_path(identifier);
        let Some(record) = self.store.read(path.clone()).await? else {
            debug!(path = %path, "no role record; defaulting to viewer");
            return Ok(Role::default());
        };

        // A record the entity cannot describe carries no role either.
        let role = from_record::<AccountEntity>(&path, record)
            .map(|entity| entity.role())
            .unwrap_or_default();
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        auth::memory::MemoryAuthProvider,
        dao::record_store::{AccountKeying, Record, memory::MemoryRecordStore},
    };

    fn identity(keying: AccountKeying) -> (IdentityStore, MemoryRecordStore) {
        let store = MemoryRecordStore::with_keying(keying);
        let identity = IdentityStore::new(Arc::new(MemoryAuthProvider::new()), Arc::new(store.clone()));
        (identity, store)
    }

    #[tokio::test]
    async fn signup_persists_role_under_backend_key() {
        let (identity, store) = identity(AccountKeying::Sanitized);
        identity
            .sign_up("a.b@x.com", "secret123", Role::Admin)
            .await
            .unwrap();

        let record = store
            .read(RecordPath::new(USERS_COLLECTION, "a_b_at_x_com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.get("role"), Some(&json!("admin")));
    }

    #[tokio::test]
    async fn document_keying_uses_raw_identifier() {
        let (identity, store) = identity(AccountKeying::Raw);
        identity
            .sign_up("a@x.com", "secret123", Role::Viewer)
            .await
            .unwrap();

        assert!(
            store
                .read(RecordPath::new(USERS_COLLECTION, "a@x.com"))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn login_resolves_stored_role() {
        let (identity, _) = identity(AccountKeying::Raw);
        identity
            .sign_up("a@x.com", "secret123", Role::Admin)
            .await
            .unwrap();

        let account = identity.login("a@x.com", "secret123").await.unwrap();
        assert_eq!(account, Account::new("a@x.com", Role::Admin));
    }

    #[tokio::test]
    async fn role_defaults_to_viewer_without_record_or_field() {
        let (identity, store) = identity(AccountKeying::Raw);
        assert_eq!(identity.get_role("ghost@x.com").await.unwrap(), Role::Viewer);

        store
            .write(RecordPath::new(USERS_COLLECTION, "bare@x.com"), Record::new())
            .await
            .unwrap();
        assert_eq!(identity.get_role("bare@x.com").await.unwrap(), Role::Viewer);
    }

    #[tokio::test]
    async fn rejected_signup_writes_nothing_and_surfaces_provider_message() {
        let (identity, store) = identity(AccountKeying::Raw);
        let err = identity
            .sign_up("a@x.com", "123", Role::Admin)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "WEAK_PASSWORD : Password should be at least 6 characters"
        );
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn wrong_password_is_an_auth_error() {
        let (identity, _) = identity(AccountKeying::Raw);
        identity
            .sign_up("a@x.com", "secret123", Role::Admin)
            .await
            .unwrap();

        let err = identity.login("a@x.com", "nope-nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(message) if message == "INVALID_LOGIN_CREDENTIALS"));
    }
}
