use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use indexmap::IndexMap;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
};
use tokio::sync::RwLock;
use tracing::info;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoRecordDocument, decode_listed, doc_id},
};
use crate::dao::{
    record_store::{AccountKeying, Record, RecordPath, RecordStore},
    storage::StorageResult,
};

#[derive(Clone)]
pub struct MongoRecordStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoRecordStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = establish_connection(&config).await?;
        info!(database = %config.database_name, "connected to MongoDB");

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self, name: &str) -> Collection<MongoRecordDocument> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<MongoRecordDocument>(name)
    }

    async fn replace_record(&self, path: RecordPath, record: Record) -> MongoResult<()> {
        let collection = self.collection(path.collection).await;
        let document = MongoRecordDocument::from((path.key.clone(), record));
        collection
            .replace_one(doc_id(&path.key), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveRecord {
                path: path.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn find_record(&self, path: RecordPath) -> MongoResult<Option<Record>> {
        let collection = self.collection(path.collection).await;
        let document = collection
            .find_one(doc_id(&path.key))
            .await
            .map_err(|source| MongoDaoError::LoadRecord {
                path: path.to_string(),
                source,
            })?;

        Ok(document.map(|document| document.fields))
    }

    async fn delete_record(&self, path: RecordPath) -> MongoResult<()> {
        let collection = self.collection(path.collection).await;
        collection
            .delete_one(doc_id(&path.key))
            .await
            .map_err(|source| MongoDaoError::DeleteRecord {
                path: path.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn list_records(&self, name: &'static str) -> MongoResult<IndexMap<String, Record>> {
        // Raw documents: one foreign `_id` must not fail the whole listing.
        let collection = {
            let guard = self.inner.state.read().await;
            guard.database.collection::<Document>(name)
        };
        let documents: Vec<Document> = collection
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListCollection {
                collection: name,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCollection {
                collection: name,
                source,
            })?;

        Ok(documents
            .into_iter()
            .filter_map(|document| decode_listed(name, document))
            .collect())
    }
}

impl RecordStore for MongoRecordStore {
    fn backend_name(&self) -> &'static str {
        "document"
    }

    fn account_keying(&self) -> AccountKeying {
        AccountKeying::Raw
    }

    fn write(&self, path: RecordPath, record: Record) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace_record(path, record).await.map_err(Into::into) })
    }

    fn read(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<Option<Record>>> {
        let store = self.clone();
        Box::pin(async move { store.find_record(path).await.map_err(Into::into) })
    }

    fn delete(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_record(path).await.map_err(Into::into) })
    }

    fn list_children(
        &self,
        collection: &'static str,
    ) -> BoxFuture<'static, StorageResult<IndexMap<String, Record>>> {
        let store = self.clone();
        Box::pin(async move { store.list_records(collection).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
