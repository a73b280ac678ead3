//! Contact record mapping and store client.

use std::sync::Arc;

use serde_json::Value;

use super::{
    first_successful_record, id_field, id_value, join_tags, opt_datetime, split_tags, str_field,
    AlertSink, LogAlerts,
};
use crate::error::StoreError;
use crate::remote::{RawRecord, RecordService};
use crate::types::{Contact, ContactInput};

pub const COLLECTION: &str = "contact";

const READ_FIELDS: &[&str] = &[
    "Name",
    "email",
    "phone",
    "company",
    "Tags",
    "CreatedOn",
    "ModifiedOn",
];

/// Map a raw record to the canonical contact shape. Never fails:
/// missing fields collapse to their defaults.
pub fn from_record(record: &RawRecord) -> Contact {
    Contact {
        id: id_field(record, "Id"),
        name: str_field(record, "Name"),
        email: str_field(record, "email"),
        phone: str_field(record, "phone"),
        company: str_field(record, "company"),
        tags: split_tags(&str_field(record, "Tags")),
        created_at: opt_datetime(record, "CreatedOn"),
        updated_at: opt_datetime(record, "ModifiedOn"),
    }
}

/// Map canonical input to the writable field allow-list:
/// {Name, email, phone, company, Tags}.
pub fn to_record(input: &ContactInput) -> RawRecord {
    let mut record = RawRecord::new();
    record.insert("Name".to_string(), Value::from(input.name.clone()));
    record.insert("email".to_string(), Value::from(input.email.clone()));
    record.insert("phone".to_string(), Value::from(input.phone.clone()));
    record.insert("company".to_string(), Value::from(input.company.clone()));
    record.insert("Tags".to_string(), Value::from(join_tags(&input.tags)));
    record
}

/// CRUD facade for contacts.
pub struct ContactStore {
    service: Arc<dyn RecordService>,
    alerts: Arc<dyn AlertSink>,
}

impl ContactStore {
    pub fn new(service: Arc<dyn RecordService>) -> Self {
        ContactStore {
            service,
            alerts: Arc::new(LogAlerts),
        }
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    /// All contacts, in store-provided order.
    pub async fn get_all(&self) -> Result<Vec<Contact>, StoreError> {
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

    /// `Ok(None)` when the service reports no matching record.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Contact>, StoreError> {
        let resp = self
            .service
            .get_record_by_id(COLLECTION, id, READ_FIELDS)
            .await?;
        if !resp.success {
            return Err(StoreError::RemoteFetch(resp.message));
        }
        Ok(resp.data.as_ref().and_then(Value::as_object).map(from_record))
    }

    pub async fn create(&self, input: &ContactInput) -> Result<Contact, StoreError> {
        let resp = self
            .service
            .create_records(COLLECTION, vec![to_record(input)])
            .await?;
        let record = first_successful_record(&resp, self.alerts.as_ref())?;
        tracing::debug!(target: "nimbus_crm::store", contact = %record.get("Id").cloned().unwrap_or_default(), "contact created");
        Ok(from_record(&record))
    }

    /// Full overwrite: every writable field is sent, unspecified input
    /// fields reset to their defaults.
    pub async fn update(&self, id: &str, input: &ContactInput) -> Result<Contact, StoreError> {
        let mut record = to_record(input);
        record.insert("Id".to_string(), id_value(id));
        let resp = self.service.update_records(COLLECTION, vec![record]).await?;
        let record = first_successful_record(&resp, self.alerts.as_ref())?;
        Ok(from_record(&record))
    }

    /// `Ok(true)` only when the service confirms this id's deletion.
    /// A reported-but-non-fatal failure is `Ok(false)`; only transport
    /// failure is an error.
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
    fn from_record_substitutes_defaults_for_missing_fields() {
        let contact = from_record(&record(json!({"Id": 3, "Name": "Ada Lovelace"})));
        assert_eq!(contact.id, "3");
        assert_eq!(contact.name, "Ada Lovelace");
        assert_eq!(contact.email, "");
        assert!(contact.tags.is_empty());
        assert!(contact.created_at.is_none());
    }

    #[test]
    fn from_record_splits_tags() {
        let contact = from_record(&record(json!({"Id": 1, "Tags": " vip, enterprise ,,lead"})));
        assert_eq!(contact.tags, vec!["vip", "enterprise", "lead"]);
    }

    #[test]
    fn to_record_emits_exactly_the_allow_list() {
        let input = ContactInput {
            name: "Ada".to_string(),
            email: "ada@analytical.example".to_string(),
            ..ContactInput::default()
        };
        let record = to_record(&input);
        let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["Name", "Tags", "company", "email", "phone"]);
    }

    #[test]
    fn tags_round_trip_with_trim_and_dropna_semantics() {
        let input = ContactInput {
            name: "Ada".to_string(),
            email: "ada@analytical.example".to_string(),
            tags: vec!["vip".to_string(), "enterprise".to_string()],
            ..ContactInput::default()
        };
        let contact = from_record(&to_record(&input));
        assert_eq!(contact.tags, input.tags);
    }
}
