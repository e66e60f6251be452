use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use tracing::warn;

use crate::dao::{
    record_store::{AccountKeying, Record, RecordPath, RecordStore},
    storage::StorageResult,
};

use super::{
    config::RealtimeConfig,
    error::{RealtimeDaoError, RealtimeResult},
    models::{ChildrenPayload, as_record},
};

#[derive(Clone)]
pub struct RealtimeRecordStore {
    client: Client,
    base_url: Arc<Url>,
    auth: Option<Arc<str>>,
}

impl RealtimeRecordStore {
    /// Build the HTTP client and check the database answers.
    pub async fn connect(config: RealtimeConfig) -> RealtimeResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RealtimeDaoError::ClientBuilder { source })?;

        let raw_url = config.database_url.trim_end_matches('/');
        let base_url = Url::parse(raw_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| RealtimeDaoError::InvalidUrl {
                url: raw_url.to_owned(),
            })?;

        let store = Self {
            client,
            base_url: Arc::new(base_url),
            auth: config.auth.map(Arc::from),
        };

        store.ping().await?;
        Ok(store)
    }

    /// Address `/{segments...}.json`, percent-encoding every segment.
    fn url(&self, segments: &[&str]) -> RealtimeResult<Url> {
        let mut url = Url::clone(&self.base_url);
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RealtimeDaoError::InvalidUrl {
                    url: self.base_url.to_string(),
                })?;
            path.pop_if_empty();
            match segments.split_last() {
                Some((last, parents)) => {
                    path.extend(parents);
                    path.push(&format!("{last}.json"));
                }
                None => {
                    path.push(".json");
                }
            }
        }

        if let Some(ref auth) = self.auth {
            url.query_pairs_mut().append_pair("auth", auth);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        label: &str,
        body: Option<&Record>,
    ) -> RealtimeResult<Response> {
        let mut builder = self.client.request(method, url);
        if let Some(record) = body {
            builder = builder.json(record);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RealtimeDaoError::RequestSend {
                path: label.to_owned(),
                source,
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RealtimeDaoError::RequestStatus {
                path: label.to_owned(),
                status: response.status(),
            })
        }
    }

    async fn ping(&self) -> RealtimeResult<()> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("shallow", "true");
        self.send(Method::GET, url, "/", None).await?;
        Ok(())
    }

    async fn put_record(&self, path: RecordPath, record: Record) -> RealtimeResult<()> {
        let label = path.to_string();
        let url = self.url(&[path.collection, &path.key])?;
        self.send(Method::PUT, url, &label, Some(&record)).await?;
        Ok(())
    }

    async fn get_record(&self, path: RecordPath) -> RealtimeResult<Option<Record>> {
        let label = path.to_string();
        let url = self.url(&[path.collection, &path.key])?;
        let response = self.send(Method::GET, url, &label, None).await?;
        let value = response
            .json::<Value>()
            .await
            .map_err(|source| RealtimeDaoError::DecodeResponse {
                path: label.clone(),
                source,
            })?;

        if !value.is_null() && !value.is_object() {
            warn!(path = %label, "ignoring non-object value stored at record path");
        }
        Ok(as_record(value))
    }

    async fn delete_record(&self, path: RecordPath) -> RealtimeResult<()> {
        let label = path.to_string();
        let url = self.url(&[path.collection, &path.key])?;
        self.send(Method::DELETE, url, &label, None).await?;
        Ok(())
    }

    async fn get_children(&self, collection: &str) -> RealtimeResult<IndexMap<String, Record>> {
        let url = self.url(&[collection])?;
        let response = self.send(Method::GET, url, collection, None).await?;
        let payload = response
            .json::<Option<ChildrenPayload>>()
            .await
            .map_err(|source| RealtimeDaoError::DecodeResponse {
                path: collection.to_owned(),
                source,
            })?;

        Ok(payload.map(ChildrenPayload::into_records).unwrap_or_default())
    }
}

impl RecordStore for RealtimeRecordStore {
    fn backend_name(&self) -> &'static str {
        "realtime"
    }

    fn account_keying(&self) -> AccountKeying {
        AccountKeying::Sanitized
    }

    fn write(&self, path: RecordPath, record: Record) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.put_record(path, record).await.map_err(Into::into) })
    }

    fn read(&self, path: RecordPath) -> BoxFuture<'static, StorageResult<Option<Record>>> {
        let store = self.clone();
        Box::pin(async move { store.get_record(path).await.map_err(Into::into) })
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
        Box::pin(async move { store.get_children(collection).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // Stateless HTTP: reconnecting amounts to checking the database answers again.
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
