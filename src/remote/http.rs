//! HTTP backend for the record service, via reqwest.
//!
//! Endpoint shape:
//! - `GET    {base}/records/{collection}?fields=a,b,c`
//! - `GET    {base}/records/{collection}/{id}?fields=a,b,c`
//! - `POST   {base}/records/{collection}`    body `{"records": [...]}`
//! - `PATCH  {base}/records/{collection}`    body `{"records": [...]}`
//! - `DELETE {base}/records/{collection}`    body `{"recordIds": [...]}`
//!
//! Envelope failures (`success == false`) are not errors at this
//! layer — they pass through for the store clients to interpret. Only
//! transport problems (connect, TLS, non-2xx, undecodable body)
//! surface as `TransportError`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{FetchResponse, RawRecord, RecordService, SingleResponse, WriteResponse};
use crate::error::TransportError;

/// Connection settings for the record service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL, no trailing slash (e.g. `https://records.example.com/v1`).
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
}

pub struct HttpRecordService {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRecordService {
    pub fn new(config: RemoteConfig) -> Self {
        HttpRecordService {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/records/{}", self.config.base_url, collection)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-Project-Id", &self.config.project_id)
            .bearer_auth(&self.config.public_key)
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn fetch_records(
        &self,
        collection: &str,
        fields: &[&str],
    ) -> Result<FetchResponse, TransportError> {
        let resp = self
            .authed(self.client.get(self.collection_url(collection)))
            .query(&[("fields", fields.join(","))])
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: &[&str],
    ) -> Result<SingleResponse, TransportError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let resp = self
            .authed(self.client.get(url))
            .query(&[("fields", fields.join(","))])
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError> {
        let resp = self
            .authed(self.client.post(self.collection_url(collection)))
            .json(&json!({ "records": records }))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError> {
        let resp = self
            .authed(self.client.patch(self.collection_url(collection)))
            .json(&json!({ "records": records }))
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn delete_records(
        &self,
        collection: &str,
        record_ids: &[String],
    ) -> Result<WriteResponse, TransportError> {
        let resp = self
            .authed(self.client.delete(self.collection_url(collection)))
            .json(&json!({ "recordIds": record_ids }))
            .send()
            .await?;
        Self::read_json(resp).await
    }
}
