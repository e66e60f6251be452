use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    dao::{
        record_store::{Record, RecordPath},
        storage::{StorageError, StorageResult},
    },
    state::{
        account::Role,
        matches::{Match, MatchType},
    },
};

/// Collection holding one record per match, keyed by token.
pub const MATCHES_COLLECTION: &str = "matches";
/// Collection holding one role record per account.
pub const USERS_COLLECTION: &str = "users";

/// Persisted shape of a match. The token is the record key, not a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    pub first_player: String,
    pub second_player: String,
    pub match_type: MatchType,
    /// Absent on records written by other tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        Self {
            first_player: value.first_player,
            second_player: value.second_player,
            match_type: value.match_type,
            created_by: value.created_by,
        }
    }
}

impl MatchEntity {
    /// Re-attach the record key to produce the domain match.
    pub fn into_match(self, token: String) -> Match {
        Match {
            token,
            first_player: self.first_player,
            second_player: self.second_player,
            match_type: self.match_type,
            created_by: self.created_by,
        }
    }
}

/// Persisted shape of an account's role record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountEntity {
    /// Kept as free text so unexpected values degrade to the default role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AccountEntity {
    /// Role record written at signup.
    pub fn with_role(role: Role) -> Self {
        Self {
            role: Some(role.as_str().to_owned()),
        }
    }

    /// Resolved role, defaulting to viewer.
    pub fn role(&self) -> Role {
        Role::from_stored(self.role.as_deref())
    }
}

/// Serialize an entity into the JSON object stored by record backends.
pub fn to_record<T: Serialize>(path: &RecordPath, entity: &T) -> StorageResult<Record> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(other) => Err(StorageError::invalid_record(
            path,
            format!("expected an object, got {other}"),
        )),
        Err(err) => Err(StorageError::invalid_record(path, err)),
    }
}

/// Decode a stored JSON object into an entity.
pub fn from_record<T: DeserializeOwned>(path: &RecordPath, record: Record) -> StorageResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|err| StorageError::invalid_record(path, err))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn match_record_has_exactly_the_persisted_fields() {
        let path = RecordPath::new(MATCHES_COLLECTION, "T1");
        let entity = MatchEntity {
            first_player: "Alice".into(),
            second_player: "Bob".into(),
            match_type: MatchType::Normal,
            created_by: Some("a@x.com".into()),
        };

        let stored = to_record(&path, &entity).unwrap();
        assert_eq!(
            Value::Object(stored),
            json!({
                "first_player": "Alice",
                "second_player": "Bob",
                "match_type": "normal",
                "created_by": "a@x.com",
            })
        );
    }

    #[test]
    fn legacy_match_without_creator_decodes() {
        let path = RecordPath::new(MATCHES_COLLECTION, "T9");
        let entity: MatchEntity = from_record(
            &path,
            record(json!({
                "first_player": "Carol",
                "second_player": "Dan",
                "match_type": "special",
            })),
        )
        .unwrap();

        let decoded = entity.into_match("T9".into());
        assert_eq!(decoded.created_by, None);
        assert_eq!(decoded.match_type, MatchType::Special);
    }

    #[test]
    fn account_record_without_role_is_viewer() {
        let path = RecordPath::new(USERS_COLLECTION, "a_at_x_com");
        let entity: AccountEntity = from_record(&path, record(json!({}))).unwrap();
        assert_eq!(entity.role(), Role::Viewer);

        let admin: AccountEntity = from_record(&path, record(json!({"role": "admin"}))).unwrap();
        assert_eq!(admin.role(), Role::Admin);
    }

    #[test]
    fn malformed_match_reports_its_path() {
        let path = RecordPath::new(MATCHES_COLLECTION, "bad");
        let err = from_record::<MatchEntity>(&path, record(json!({"first_player": 3})))
            .unwrap_err();
        assert!(err.to_string().contains("matches/bad"));
    }
}
