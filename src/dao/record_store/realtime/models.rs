use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::dao::record_store::Record;

/// Shape of a collection read. The database answers with an array instead of
/// an object when every child key is a small integer.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChildrenPayload {
    Object(IndexMap<String, Value>),
    Array(Vec<Value>),
}

impl ChildrenPayload {
    /// Flatten the payload into keyed records, dropping holes and scalar children.
    pub fn into_records(self) -> IndexMap<String, Record> {
        match self {
            ChildrenPayload::Object(children) => children
                .into_iter()
                .filter_map(|(key, value)| as_record(value).map(|record| (key, record)))
                .collect(),
            ChildrenPayload::Array(children) => children
                .into_iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    as_record(value).map(|record| (index.to_string(), record))
                })
                .collect(),
        }
    }
}

/// Object children become records; `null` and scalar values do not.
pub fn as_record(value: Value) -> Option<Record> {
    match value {
        Value::Object(record) => Some(record),
        _ => None,
    }
}
