//! Match registry: create, delete and list match records keyed by token.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::TokenPolicy,
    dao::{
        models::{MATCHES_COLLECTION, MatchEntity, from_record, to_record},
        record_store::{RecordPath, RecordStore},
    },
    error::{MISSING_FIELDS_MESSAGE, ServiceError},
    state::{
        account::Account,
        matches::{Match, MatchDraft},
    },
};

/// CRUD access to match records. Mutations re-check the actor's role.
pub struct MatchRegistry {
    store: Arc<dyn RecordStore>,
    policy: TokenPolicy,
}

fn ensure_admin(actor: &Account) -> Result<(), ServiceError> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "`{}` is not allowed to modify matches",
            actor.identifier
        )))
    }
}

impl MatchRegistry {
    pub fn new(store: Arc<dyn RecordStore>, policy: TokenPolicy) -> Self {
        Self { store, policy }
    }

    /// Write the match keyed by its token, stamped with the actor as creator.
    pub async fn add_match(&self, actor: &Account, draft: MatchDraft) -> Result<Match, ServiceError> {
        ensure_admin(actor)?;
        if !draft.is_complete() {
            return Err(ServiceError::Validation(MISSING_FIELDS_MESSAGE.into()));
        }

        let path = RecordPath::new(MATCHES_COLLECTION, draft.token.clone());
        if self.policy == TokenPolicy::Reject && self.store.read(path.clone()).await?.is_some() {
            return Err(ServiceError::DuplicateToken(draft.token));
        }

        let created = draft.into_match(actor.identifier.clone());
        let record = to_record(&path, &MatchEntity::from(created.clone()))?;
        self.store.write(path, record).await?;

        info!(
            token = %created.token,
            created_by = %actor.identifier,
            match_type = created.match_type.as_str(),
            "match saved"
        );
        Ok(created)
    }

    /// Remove the match keyed by `token`. Absent tokens are not an error.
    pub async fn delete_match(&self, actor: &Account, token: &str) -> Result<(), ServiceError> {
        ensure_admin(actor)?;
        if token.is_empty() {
            return Err(ServiceError::Validation(MISSING_FIELDS_MESSAGE.into()));
        }

        self.store
            .delete(RecordPath::new(MATCHES_COLLECTION, token))
            .await?;
        info!(token = %token, deleted_by = %actor.identifier, "match deleted");
        Ok(())
    }

    /// Every stored match, in backend order.
    pub async fn list_matches(&self) -> Result<Vec<Match>, ServiceError> {
        let children = self.store.list_children(MATCHES_COLLECTION).await?;

        let mut matches = Vec::with_capacity(children.len());
        for (token, record) in children {
            let path = RecordPath::new(MATCHES_COLLECTION, token.clone());
            match from_record::<MatchEntity>(&path, record) {
                Ok(entity) => matches.push(entity.into_match(token)),
                Err(err) => warn!(error = %err, "skipping unreadable match record"),
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        dao::record_store::{Record, memory::MemoryRecordStore},
        state::{account::Role, matches::MatchType},
    };

    fn admin(identifier: &str) -> Account {
        Account::new(identifier, Role::Admin)
    }

    fn draft(token: &str, first: &str, second: &str, match_type: MatchType) -> MatchDraft {
        MatchDraft {
            token: token.into(),
            first_player: first.into(),
            second_player: second.into(),
            match_type,
        }
    }

    fn registry(policy: TokenPolicy) -> (MatchRegistry, MemoryRecordStore) {
        let store = MemoryRecordStore::new();
        (MatchRegistry::new(Arc::new(store.clone()), policy), store)
    }

    #[tokio::test]
    async fn added_match_is_listed_once_with_all_fields() {
        let (registry, _) = registry(TokenPolicy::Overwrite);
        registry
            .add_match(&admin("a@x.com"), draft("T1", "Alice", "Bob", MatchType::Normal))
            .await
            .unwrap();

        let listed = registry.list_matches().await.unwrap();
        assert_eq!(
            listed,
            vec![Match {
                token: "T1".into(),
                first_player: "Alice".into(),
                second_player: "Bob".into(),
                match_type: MatchType::Normal,
                created_by: Some("a@x.com".into()),
            }]
        );
    }

    #[tokio::test]
    async fn second_add_with_same_token_supersedes_the_first() {
        let (registry, _) = registry(TokenPolicy::Overwrite);
        registry
            .add_match(&admin("u1@x.com"), draft("T", "a", "b", MatchType::Normal))
            .await
            .unwrap();
        registry
            .add_match(&admin("u2@x.com"), draft("T", "c", "d", MatchType::Special))
            .await
            .unwrap();

        let listed = registry.list_matches().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], draft("T", "c", "d", MatchType::Special).into_match("u2@x.com"));
    }

    #[tokio::test]
    async fn reject_policy_refuses_existing_tokens() {
        let (registry, _) = registry(TokenPolicy::Reject);
        let actor = admin("a@x.com");
        registry
            .add_match(&actor, draft("T", "a", "b", MatchType::Normal))
            .await
            .unwrap();

        let err = registry
            .add_match(&actor, draft("T", "c", "d", MatchType::Special))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateToken(token) if token == "T"));
        assert_eq!(registry.list_matches().await.unwrap()[0].first_player, "a");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (registry, _) = registry(TokenPolicy::Overwrite);
        let actor = admin("a@x.com");
        registry
            .add_match(&actor, draft("T1", "a", "b", MatchType::Normal))
            .await
            .unwrap();

        registry.delete_match(&actor, "T1").await.unwrap();
        registry.delete_match(&actor, "T1").await.unwrap();
        assert!(registry.list_matches().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_on_empty_registry_is_not_an_error() {
        let (registry, _) = registry(TokenPolicy::Overwrite);
        registry.delete_match(&admin("a@x.com"), "T1").await.unwrap();
        assert_eq!(registry.list_matches().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn viewers_are_rejected_before_reaching_the_store() {
        let (registry, store) = registry(TokenPolicy::Overwrite);
        let viewer = Account::new("v@x.com", Role::Viewer);

        let add = registry
            .add_match(&viewer, draft("T1", "a", "b", MatchType::Normal))
            .await;
        let delete = registry.delete_match(&viewer, "T1").await;

        assert!(matches!(add, Err(ServiceError::Forbidden(_))));
        assert!(matches!(delete, Err(ServiceError::Forbidden(_))));
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn incomplete_drafts_are_validation_errors() {
        let (registry, store) = registry(TokenPolicy::Overwrite);
        let err = registry
            .add_match(&admin("a@x.com"), draft("T1", "", "b", MatchType::Normal))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn legacy_and_foreign_records_are_tolerated() {
        let (registry, store) = registry(TokenPolicy::Overwrite);
        let mut legacy = Record::new();
        legacy.insert("first_player".into(), json!("Carol"));
        legacy.insert("second_player".into(), json!("Dan"));
        legacy.insert("match_type".into(), json!("special"));
        store
            .write(RecordPath::new(MATCHES_COLLECTION, "OLD"), legacy)
            .await
            .unwrap();

        let mut foreign = Record::new();
        foreign.insert("note".into(), json!("not a match"));
        store
            .write(RecordPath::new(MATCHES_COLLECTION, "JUNK"), foreign)
            .await
            .unwrap();

        let listed = registry.list_matches().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].token, "OLD");
        assert_eq!(listed[0].created_by, None);
    }

    #[tokio::test]
    async fn backend_failures_surface_as_unavailable() {
        let (registry, store) = registry(TokenPolicy::Overwrite);
        store.set_offline(true);

        let err = registry.list_matches().await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
