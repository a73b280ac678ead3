//! Activity record mapping and store client.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::{
    bool_field, first_successful_record, id_field, id_value, opt_datetime, opt_ref, ref_value,
    str_field, AlertSink, LogAlerts,
};
use crate::error::StoreError;
use crate::remote::{RawRecord, RecordService};
use crate::types::{Activity, ActivityInput, ActivityType};

pub const COLLECTION: &str = "activity";

const READ_FIELDS: &[&str] = &[
    "Name",
    "type",
    "description",
    "contact_id",
    "deal_id",
    "timestamp",
    "completed",
    "CreatedOn",
];

/// Map a raw record to the canonical activity shape. A record without
/// a usable timestamp falls back to its creation time, then to now.
pub fn from_record(record: &RawRecord) -> Activity {
    Activity {
        id: id_field(record, "Id"),
        kind: ActivityType::parse(&str_field(record, "type")).unwrap_or_default(),
        description: str_field(record, "description"),
        contact_id: opt_ref(record, "contact_id"),
        deal_id: opt_ref(record, "deal_id"),
        timestamp: opt_datetime(record, "timestamp")
            .or_else(|| opt_datetime(record, "CreatedOn"))
            .unwrap_or_else(Utc::now),
        completed: bool_field(record, "completed"),
    }
}

/// Map canonical input to the writable field allow-list: {Name, type,
/// description, contact_id, deal_id, timestamp, completed}. The record
/// `Name` mirrors the description; a missing timestamp is stamped now.
pub fn to_record(input: &ActivityInput) -> RawRecord {
    let timestamp = input.timestamp.unwrap_or_else(Utc::now);
    let mut record = RawRecord::new();
    record.insert("Name".to_string(), Value::from(input.description.clone()));
    record.insert("type".to_string(), Value::from(input.kind.as_str()));
    record.insert(
        "description".to_string(),
        Value::from(input.description.clone()),
    );
    record.insert("contact_id".to_string(), ref_value(&input.contact_id));
    record.insert("deal_id".to_string(), ref_value(&input.deal_id));
    record.insert(
        "timestamp".to_string(),
        Value::from(timestamp.to_rfc3339()),
    );
    record.insert("completed".to_string(), Value::from(input.completed));
    record
}

/// CRUD facade for activities.
pub struct ActivityStore {
    service: Arc<dyn RecordService>,
    alerts: Arc<dyn AlertSink>,
}

impl ActivityStore {
    pub fn new(service: Arc<dyn RecordService>) -> Self {
        ActivityStore {
            service,
            alerts: Arc::new(LogAlerts),
        }
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub async fn get_all(&self) -> Result<Vec<Activity>, StoreError> {
        let resp = self.service.fetch_records(COLLECTION, READ_FIELDS).await?;
        if !resp.success {
            return Err(StoreError::RemoteFetch(resp.message));
        }
        Ok(resp
            .data
            .iter()
            .filter_map(Value::as_object)
            .map(from_record)
            .collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Activity>, StoreError> {
        let resp = self
            .service
            .get_record_by_id(COLLECTION, id, READ_FIELDS)
            .await?;
        if !resp.success {
            return Err(StoreError::RemoteFetch(resp.message));
        }
        Ok(resp.data.as_ref().and_then(Value::as_object).map(from_record))
    }

    pub async fn create(&self, input: &ActivityInput) -> Result<Activity, StoreError> {
        let resp = self
            .service
            .create_records(COLLECTION, vec![to_record(input)])
            .await?;
        let record = first_successful_record(&resp, self.alerts.as_ref())?;
        Ok(from_record(&record))
    }

    /// Full overwrite, same merge policy as the other stores.
    pub async fn update(&self, id: &str, input: &ActivityInput) -> Result<Activity, StoreError> {
        let mut record = to_record(input);
        record.insert("Id".to_string(), id_value(id));
        let resp = self.service.update_records(COLLECTION, vec![record]).await?;
        let record = first_successful_record(&resp, self.alerts.as_ref())?;
        Ok(from_record(&record))
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let resp = self
            .service
            .delete_records(COLLECTION, &[id.to_string()])
            .await?;
        if !resp.success {
            self.alerts.error(&resp.message);
            return Ok(false);
        }
        for result in resp.results.iter().filter(|r| !r.success) {
            if let Some(msg) = &result.message {
                self.alerts.error(msg);
            }
        }
        Ok(resp.results.iter().any(|r| r.success))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn from_record_defaults_kind_and_completed() {
        let activity = from_record(&record(json!({
            "Id": 5,
            "description": "Intro call with Ada",
            "type": "Carrier pigeon",
        })));
        assert_eq!(activity.kind, ActivityType::Call);
        assert!(!activity.completed);
        assert_eq!(activity.description, "Intro call with Ada");
    }

    #[test]
    fn timestamp_falls_back_to_created_on() {
        let activity = from_record(&record(json!({
            "Id": 5,
            "description": "Follow up",
            "CreatedOn": "2024-03-01T09:00:00Z",
        })));
        assert_eq!(activity.timestamp.to_rfc3339(), "2024-03-01T09:00:00+00:00");
    }

    #[test]
    fn to_record_emits_exactly_the_allow_list() {
        let record = to_record(&ActivityInput {
            description: "Send proposal".to_string(),
            kind: ActivityType::FollowUp,
            ..ActivityInput::default()
        });
        let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "Name",
                "completed",
                "contact_id",
                "deal_id",
                "description",
                "timestamp",
                "type"
            ]
        );
        assert_eq!(record["type"], json!("Follow-up"));
    }

    #[test]
    fn dangling_refs_emit_null_not_empty_string() {
        let record = to_record(&ActivityInput {
            description: "Note".to_string(),
            contact_id: Some("".to_string()),
            deal_id: Some("abc".to_string()),
            ..ActivityInput::default()
        });
        assert_eq!(record["contact_id"], Value::Null);
        assert_eq!(record["deal_id"], Value::Null);
    }
}
