//! Wire contract for the external record-storage service.
//!
//! Each entity type maps to a named record collection. The service
//! speaks in envelopes: reads carry `{success, data, message}`, writes
//! carry `{success, results, message}` where each result may fail
//! independently of its batch. All envelope fields deserialize
//! leniently so a sparse response never aborts a call.
//!
//! Two backends implement the contract: [`http::HttpRecordService`]
//! for production and [`memory::MemoryRecordService`] for tests and
//! local development.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// A raw record as the service stores it, pre-mapping.
pub type RawRecord = serde_json::Map<String, Value>;

/// Envelope for a multi-record read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub message: String,
}

/// Envelope for a single-record read. A missing record is
/// `success == true` with `data == None` — not a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: String,
}

/// Envelope for a batch write (create/update/delete).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub results: Vec<RecordResult>,
    #[serde(default)]
    pub message: String,
}

/// Per-record outcome inside a batch write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Field-level validation error reported by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_label: String,
    pub message: String,
}

/// CRUD surface of the record service. Object-safe so store clients
/// can hold `Arc<dyn RecordService>` and tests can inject the memory
/// backend.
#[async_trait]
pub trait RecordService: Send + Sync {
    async fn fetch_records(
        &self,
        collection: &str,
        fields: &[&str],
    ) -> Result<FetchResponse, TransportError>;

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: &[&str],
    ) -> Result<SingleResponse, TransportError>;

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError>;

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError>;

    async fn delete_records(
        &self,
        collection: &str,
        record_ids: &[String],
    ) -> Result<WriteResponse, TransportError>;
}
