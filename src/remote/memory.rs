//! Seedable in-memory backend for tests and local development.
//!
//! Each instance owns its record tables: construct with seed data, no
//! shared state across instances. Ids are monotonically increasing
//! integers assigned at create time, and `CreatedOn`/`ModifiedOn` are
//! stamped the way the real service does.
//!
//! Failure injection mirrors the two ways the real service fails:
//! - `fail_next_call`: the next envelope comes back `success == false`
//!   with the given message (batch-level / read failure)
//! - `fail_next_record`: the next write succeeds at the batch level
//!   but every record in it fails with the given field errors

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

use async_trait::async_trait;

use super::{
    FetchResponse, FieldError, RawRecord, RecordResult, RecordService, SingleResponse,
    WriteResponse,
};
use crate::error::TransportError;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<RawRecord>>,
    next_id: i64,
    fail_next_call: Option<String>,
    fail_next_record: Option<Vec<FieldError>>,
}

#[derive(Default)]
pub struct MemoryRecordService {
    inner: Mutex<Inner>,
}

impl MemoryRecordService {
    pub fn new() -> Self {
        MemoryRecordService {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Seed a collection. Records missing `Id` or `CreatedOn` get them
    /// assigned, so fixtures only state what they care about.
    pub fn with_seed(self, collection: &str, records: Vec<Value>) -> Self {
        {
            let mut inner = self.inner.lock();
            let mut seeded = Vec::new();
            for value in records {
                let Value::Object(mut record) = value else {
                    continue;
                };
                if !record.contains_key("Id") {
                    let id = inner.next_id;
                    inner.next_id += 1;
                    record.insert("Id".to_string(), Value::from(id));
                }
                if !record.contains_key("CreatedOn") {
                    record.insert("CreatedOn".to_string(), Value::from(Utc::now().to_rfc3339()));
                }
                seeded.push(record);
            }
            inner
                .tables
                .entry(collection.to_string())
                .or_default()
                .extend(seeded);
            // Keep next_id ahead of any explicit seed ids.
            let max_seeded = inner
                .tables
                .values()
                .flatten()
                .filter_map(|r| r.get("Id").and_then(Value::as_i64))
                .max()
                .unwrap_or(0);
            if inner.next_id <= max_seeded {
                inner.next_id = max_seeded + 1;
            }
        }
        self
    }

    /// Make the next call (read or write) fail at the envelope level.
    pub fn fail_next_call(&self, message: &str) {
        self.inner.lock().fail_next_call = Some(message.to_string());
    }

    /// Make every record in the next write fail with these field errors,
    /// inside an otherwise-successful batch.
    pub fn fail_next_record(&self, errors: Vec<FieldError>) {
        self.inner.lock().fail_next_record = Some(errors);
    }

    fn id_matches(record: &RawRecord, id: &str) -> bool {
        match record.get("Id") {
            Some(Value::Number(n)) => n.to_string() == id,
            Some(Value::String(s)) => s == id,
            _ => false,
        }
    }

    fn write_ok(results: Vec<RecordResult>) -> WriteResponse {
        WriteResponse {
            success: true,
            results,
            message: String::new(),
        }
    }

    fn take_call_failure<T: Default + EnvelopeFailure>(inner: &mut Inner) -> Option<T> {
        inner.fail_next_call.take().map(T::failed)
    }
}

/// Build a `success == false` envelope carrying a service message.
trait EnvelopeFailure: Default {
    fn failed(message: String) -> Self;
}

impl EnvelopeFailure for FetchResponse {
    fn failed(message: String) -> Self {
        FetchResponse {
            success: false,
            message,
            ..FetchResponse::default()
        }
    }
}

impl EnvelopeFailure for SingleResponse {
    fn failed(message: String) -> Self {
        SingleResponse {
            success: false,
            message,
            ..SingleResponse::default()
        }
    }
}

impl EnvelopeFailure for WriteResponse {
    fn failed(message: String) -> Self {
        WriteResponse {
            success: false,
            message,
            ..WriteResponse::default()
        }
    }
}

#[async_trait]
impl RecordService for MemoryRecordService {
    async fn fetch_records(
        &self,
        collection: &str,
        _fields: &[&str],
    ) -> Result<FetchResponse, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(resp) = Self::take_call_failure(&mut inner) {
            return Ok(resp);
        }
        let data = inner
            .tables
            .get(collection)
            .map(|records| records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default();
        Ok(FetchResponse {
            success: true,
            data,
            message: String::new(),
        })
    }

    async fn get_record_by_id(
        &self,
        collection: &str,
        id: &str,
        _fields: &[&str],
    ) -> Result<SingleResponse, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(resp) = Self::take_call_failure(&mut inner) {
            return Ok(resp);
        }
        let data = inner
            .tables
            .get(collection)
            .and_then(|records| records.iter().find(|r| Self::id_matches(r, id)))
            .cloned()
            .map(Value::Object);
        Ok(SingleResponse {
            success: true,
            data,
            message: String::new(),
        })
    }

    async fn create_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(resp) = Self::take_call_failure(&mut inner) {
            return Ok(resp);
        }
        if let Some(errors) = inner.fail_next_record.take() {
            let results = records
                .iter()
                .map(|_| RecordResult {
                    success: false,
                    errors: errors.clone(),
                    ..RecordResult::default()
                })
                .collect();
            return Ok(Self::write_ok(results));
        }

        let now = Utc::now().to_rfc3339();
        let mut results = Vec::new();
        for mut record in records {
            let id = inner.next_id;
            inner.next_id += 1;
            record.insert("Id".to_string(), Value::from(id));
            record.insert("CreatedOn".to_string(), Value::from(now.clone()));
            record.insert("ModifiedOn".to_string(), Value::from(now.clone()));
            inner
                .tables
                .entry(collection.to_string())
                .or_default()
                .push(record.clone());
            results.push(RecordResult {
                success: true,
                data: Some(Value::Object(record)),
                ..RecordResult::default()
            });
        }
        Ok(Self::write_ok(results))
    }

    async fn update_records(
        &self,
        collection: &str,
        records: Vec<RawRecord>,
    ) -> Result<WriteResponse, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(resp) = Self::take_call_failure(&mut inner) {
            return Ok(resp);
        }
        if let Some(errors) = inner.fail_next_record.take() {
            let results = records
                .iter()
                .map(|_| RecordResult {
                    success: false,
                    errors: errors.clone(),
                    ..RecordResult::default()
                })
                .collect();
            return Ok(Self::write_ok(results));
        }

        let now = Utc::now().to_rfc3339();
        let mut results = Vec::new();
        for record in records {
            let id = record
                .get("Id")
                .map(|v| match v {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.clone(),
                    _ => String::new(),
                })
                .unwrap_or_default();

            let table = inner.tables.entry(collection.to_string()).or_default();
            match table.iter_mut().find(|r| Self::id_matches(r, &id)) {
                Some(existing) => {
                    for (key, value) in &record {
                        if key != "Id" && key != "CreatedOn" {
                            existing.insert(key.clone(), value.clone());
                        }
                    }
                    existing.insert("ModifiedOn".to_string(), Value::from(now.clone()));
                    results.push(RecordResult {
                        success: true,
                        data: Some(Value::Object(existing.clone())),
                        ..RecordResult::default()
                    });
                }
                None => results.push(RecordResult {
                    success: false,
                    message: Some(format!("Record not found: {}", id)),
                    ..RecordResult::default()
                }),
            }
        }
        Ok(Self::write_ok(results))
    }

    async fn delete_records(
        &self,
        collection: &str,
        record_ids: &[String],
    ) -> Result<WriteResponse, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(resp) = Self::take_call_failure(&mut inner) {
            return Ok(resp);
        }
        let table = inner.tables.entry(collection.to_string()).or_default();
        let mut results = Vec::new();
        for id in record_ids {
            let before = table.len();
            table.retain(|r| !Self::id_matches(r, id));
            if table.len() < before {
                results.push(RecordResult {
                    success: true,
                    ..RecordResult::default()
                });
            } else {
                results.push(RecordResult {
                    success: false,
                    message: Some(format!("Record not found: {}", id)),
                    ..RecordResult::default()
                });
            }
        }
        Ok(Self::write_ok(results))
    }
}
