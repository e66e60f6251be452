//! Path-addressed record storage shared by the match registry and the identity store.

pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;
#[cfg(feature = "firebase")]
pub mod realtime;

use std::fmt;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::dao::storage::StorageResult;

/// JSON object stored under a record path.
pub type Record = Map<String, Value>;

/// Location of a single record: a collection and a key inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPath {
    pub collection: &'static str,
    pub key: String,
}

impl RecordPath {
    /// Address `key` inside `collection`.
    pub fn new(collection: &'static str, key: impl Into<String>) -> Self {
        Self {
            collection,
            key: key.into(),
        }
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// How an account identifier maps to the key of its role record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountKeying {
    /// The identifier is used as-is.
    #[default]
    Raw,
    /// `.` and `@` are rewritten, as path-addressed trees reject `.` in keys.
    Sanitized,
}

impl AccountKeying {
    /// Key under which the role record of `identifier` lives.
    pub fn key_for(self, identifier: &str) -> String {
        match self {
            AccountKeying::Raw => identifier.to_owned(),
            AccountKeying::Sanitized => identifier.replace('.', "_").replace('@', "_at_"),
        }
    }
}

/// Abstraction over the hosted data store. Implementations never interpret
/// record contents.
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs and health output.
    fn backend_name(&self) -> &'static str;
    /// Keying scheme for account role records.
    fn account_keying(&self) -> AccountKeying;
    /// Create or replace the record at `path`.
    fn write(&self, path: RecordPath, record: Record) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch the record at `path`, `None` when absent.
    fn read(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<Option<Record>>>;
    /// Remove the record at `path`. Removing an absent record succeeds.
    fn delete(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<()>>;
    /// Every record of `collection` keyed by its record key, in backend order.
    fn list_children(
        &self,
        collection: &'static str,
    ) -> BoxFuture<'static, StorageResult<IndexMap<String, Record>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_keys_strip_dots_and_at_signs() {
        assert_eq!(
            AccountKeying::Sanitized.key_for("first.last@example.co.uk"),
            "first_last_at_example_co_uk"
        );
        assert_eq!(AccountKeying::Raw.key_for("a@x.com"), "a@x.com");
    }

    #[test]
    fn record_path_displays_as_slash_joined() {
        assert_eq!(RecordPath::new("matches", "T1").to_string(), "matches/T1");
    }
}
