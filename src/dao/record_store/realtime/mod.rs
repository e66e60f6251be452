//! Firebase Realtime Database backend addressing records as `/{collection}/{key}.json`.

mod config;
mod error;
mod models;
mod store;

pub use config::RealtimeConfig;
pub use error::RealtimeDaoError;
pub use store::RealtimeRecordStore;

use crate::dao::storage::StorageError;

impl From<RealtimeDaoError> for StorageError {
    fn from(err: RealtimeDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
