//! Deal record mapping and store client.

use std::sync::Arc;

use serde_json::Value;

use super::{
    first_successful_record, id_field, id_value, num_field, opt_date, opt_datetime, opt_ref,
    ref_value, str_field, AlertSink, LogAlerts,
};
use crate::error::StoreError;
use crate::remote::{RawRecord, RecordService};
use crate::types::{Deal, DealInput, DealStage, DealStatus};

pub const COLLECTION: &str = "deal";

const READ_FIELDS: &[&str] = &[
    "Name",
    "title",
    "value",
    "stage",
    "probability",
    "expected_close_date",
    "status",
    "contact_id",
    "CreatedOn",
];

/// Map a raw record to the canonical deal shape. Titles prefer the
/// `title` field and fall back to the record `Name`; unrecognized
/// stage/status values fall back to `Lead`/`Open`.
pub fn from_record(record: &RawRecord) -> Deal {
    let title = match str_field(record, "title") {
        t if t.is_empty() => str_field(record, "Name"),
        t => t,
    };
    Deal {
        id: id_field(record, "Id"),
        title,
        value: num_field(record, "value").max(0.0),
        stage: DealStage::parse(&str_field(record, "stage")).unwrap_or_default(),
        probability: (num_field(record, "probability").round() as i64).clamp(0, 100),
        status: DealStatus::parse(&str_field(record, "status")).unwrap_or_default(),
        contact_id: opt_ref(record, "contact_id"),
        expected_close_date: opt_date(record, "expected_close_date"),
        created_at: opt_datetime(record, "CreatedOn"),
    }
}

/// Map canonical input to the writable field allow-list: {Name, title,
/// value, stage, probability, expected_close_date, status, contact_id}.
/// The record `Name` mirrors the title.
pub fn to_record(input: &DealInput) -> RawRecord {
    let mut record = RawRecord::new();
    record.insert("Name".to_string(), Value::from(input.title.clone()));
    record.insert("title".to_string(), Value::from(input.title.clone()));
    record.insert("value".to_string(), Value::from(input.value.max(0.0)));
    record.insert("stage".to_string(), Value::from(input.stage.as_str()));
    record.insert(
        "probability".to_string(),
        Value::from(input.probability.clamp(0, 100)),
    );
    record.insert("status".to_string(), Value::from(input.status.as_str()));
    record.insert("contact_id".to_string(), ref_value(&input.contact_id));
    record.insert(
        "expected_close_date".to_string(),
        input
            .expected_close_date
            .map(|d| Value::from(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
    );
    record
}

/// CRUD facade for deals.
pub struct DealStore {
    service: Arc<dyn RecordService>,
    alerts: Arc<dyn AlertSink>,
}

impl DealStore {
    pub fn new(service: Arc<dyn RecordService>) -> Self {
        DealStore {
            service,
            alerts: Arc::new(LogAlerts),
        }
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub async fn get_all(&self) -> Result<Vec<Deal>, StoreError> {
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

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Deal>, StoreError> {
        let resp = self
            .service
            .get_record_by_id(COLLECTION, id, READ_FIELDS)
            .await?;
        if !resp.success {
            return Err(StoreError::RemoteFetch(resp.message));
        }
        Ok(resp.data.as_ref().and_then(Value::as_object).map(from_record))
    }

    pub async fn create(&self, input: &DealInput) -> Result<Deal, StoreError> {
        let resp = self
            .service
            .create_records(COLLECTION, vec![to_record(input)])
            .await?;
        let record = first_successful_record(&resp, self.alerts.as_ref())?;
        tracing::debug!(target: "nimbus_crm::store", deal = %record.get("Id").cloned().unwrap_or_default(), "deal created");
        Ok(from_record(&record))
    }

    /// Full overwrite, same merge policy as contacts.
    pub async fn update(&self, id: &str, input: &DealInput) -> Result<Deal, StoreError> {
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
    use chrono::NaiveDate;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn from_record_coerces_leniently() {
        let deal = from_record(&record(json!({
            "Id": 9,
            "Name": "Pilot rollout",
            "value": "1500",
            "stage": "Bargaining",
            "probability": "not a number",
            "status": "Open",
            "contact_id": 4,
        })));
        assert_eq!(deal.title, "Pilot rollout");
        assert_eq!(deal.value, 1500.0);
        assert_eq!(deal.stage, DealStage::Lead);
        assert_eq!(deal.probability, 0);
        assert_eq!(deal.contact_id.as_deref(), Some("4"));
    }

    #[test]
    fn title_prefers_title_over_name() {
        let deal = from_record(&record(json!({"Name": "record name", "title": "Real title"})));
        assert_eq!(deal.title, "Real title");
    }

    #[test]
    fn negative_value_clamps_to_zero() {
        let deal = from_record(&record(json!({"value": -50})));
        assert_eq!(deal.value, 0.0);
    }

    #[test]
    fn to_record_emits_exactly_the_allow_list() {
        let record = to_record(&DealInput {
            title: "Pilot".to_string(),
            ..DealInput::default()
        });
        let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "Name",
                "contact_id",
                "expected_close_date",
                "probability",
                "stage",
                "status",
                "title",
                "value"
            ]
        );
    }

    #[test]
    fn contact_ref_emits_integer_or_null() {
        let with_ref = to_record(&DealInput {
            title: "Pilot".to_string(),
            contact_id: Some("7".to_string()),
            ..DealInput::default()
        });
        assert_eq!(with_ref["contact_id"], json!(7));

        let without = to_record(&DealInput {
            title: "Pilot".to_string(),
            contact_id: Some("".to_string()),
            ..DealInput::default()
        });
        assert_eq!(without["contact_id"], Value::Null);
    }

    #[test]
    fn close_date_emits_plain_date() {
        let record = to_record(&DealInput {
            title: "Pilot".to_string(),
            expected_close_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..DealInput::default()
        });
        assert_eq!(record["expected_close_date"], json!("2024-06-30"));
    }
}
