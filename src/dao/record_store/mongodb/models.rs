use mongodb::bson::{self, Bson, Document, doc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dao::record_store::Record;

/// A record as stored in MongoDB: the key becomes `_id`, the fields sit beside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRecordDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Record,
}

impl From<(String, Record)> for MongoRecordDocument {
    fn from((id, mut fields): (String, Record)) -> Self {
        // `_id` is owned by the key; a stray field of that name would clash.
        fields.remove("_id");
        Self { id, fields }
    }
}

impl From<MongoRecordDocument> for (String, Record) {
    fn from(value: MongoRecordDocument) -> Self {
        (value.id, value.fields)
    }
}

pub fn doc_id(key: &str) -> Document {
    doc! {"_id": key}
}

/// Key a listed document is exposed under. Documents inserted by other tools
/// may carry an `ObjectId` or a number instead of a string.
fn listing_key(id: &Bson) -> Option<String> {
    match id {
        Bson::String(key) => Some(key.clone()),
        Bson::ObjectId(oid) => Some(oid.to_hex()),
        Bson::Int32(value) => Some(value.to_string()),
        Bson::Int64(value) => Some(value.to_string()),
        _ => None,
    }
}

/// Decode one document of a collection listing. Documents that cannot be keyed
/// or decoded are skipped so the rest of the listing stays readable.
pub fn decode_listed(collection: &str, mut document: Document) -> Option<(String, Record)> {
    let Some(key) = document.get("_id").and_then(listing_key) else {
        warn!(collection, id = ?document.get("_id"), "skipping document without a usable _id");
        return None;
    };
    document.insert("_id", key.as_str());

    match bson::deserialize_from_document::<MongoRecordDocument>(document) {
        Ok(decoded) => Some(decoded.into()),
        Err(err) => {
            warn!(collection, key = %key, error = %err, "skipping undecodable document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    use super::*;

    #[test]
    fn key_owns_the_id_field() {
        let mut fields = Record::new();
        fields.insert("_id".into(), json!("spoofed"));
        fields.insert("role".into(), json!("admin"));

        let document = MongoRecordDocument::from(("a@x.com".to_owned(), fields));
        assert_eq!(document.id, "a@x.com");
        assert!(!document.fields.contains_key("_id"));

        let (key, fields) = document.into();
        assert_eq!(key, "a@x.com");
        assert_eq!(fields["role"], json!("admin"));
    }

    #[test]
    fn string_keys_are_listed_as_is() {
        let document = doc! {"_id": "T1", "first_player": "Alice"};
        let (key, fields) = decode_listed("matches", document).unwrap();
        assert_eq!(key, "T1");
        assert_eq!(fields["first_player"], json!("Alice"));
        assert!(!fields.contains_key("_id"));
    }

    #[test]
    fn object_id_keys_are_stringified() {
        let oid = ObjectId::parse_str("65f1c0ffee0000000000abcd").unwrap();
        let document = doc! {"_id": oid, "role": "admin"};

        let (key, fields) = decode_listed("users", document).unwrap();
        assert_eq!(key, "65f1c0ffee0000000000abcd");
        assert_eq!(fields["role"], json!("admin"));
    }

    #[test]
    fn unusable_keys_skip_only_that_document() {
        let listing = vec![
            doc! {"_id": ["not", "a", "key"], "role": "admin"},
            doc! {"role": "viewer"},
            doc! {"_id": 7_i64, "role": "viewer"},
        ];

        let decoded: Vec<_> = listing
            .into_iter()
            .filter_map(|document| decode_listed("users", document))
            .collect();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].0, "7");
    }
}
