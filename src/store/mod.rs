//! Per-entity record mappers and CRUD store clients.
//!
//! Mapping is deliberately lenient in one direction and strict in the
//! other: `from_record` never fails — absent, null, or malformed
//! fields collapse to the entity's documented default — while
//! `to_record` emits exactly the per-entity write allow-list in the
//! types the service expects (reference fields as integers, dates as
//! `YYYY-MM-DD`, tags as one comma-joined string).
//!
//! Store clients do not retry, cache, or reconcile local state;
//! callers re-fetch after a successful write.

pub mod activities;
pub mod contacts;
pub mod deals;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::StoreError;
use crate::remote::{RawRecord, WriteResponse};

/// Notification surface for write failures. The view layer plugs in
/// its toast mechanism; the default logs through tracing.
pub trait AlertSink: Send + Sync {
    fn error(&self, message: &str);
}

/// Default sink: structured warn logs, one per message.
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn error(&self, message: &str) {
        tracing::warn!(target: "nimbus_crm::store", "{}", message);
    }
}

// ---------------------------------------------------------------------------
// Read-side coercion
// ---------------------------------------------------------------------------

/// String field with empty-string default.
pub(crate) fn str_field(record: &RawRecord, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric field. Accepts numbers and numeric strings; anything else
/// (including NaN and missing) is 0.
pub(crate) fn num_field(record: &RawRecord, key: &str) -> f64 {
    let parsed = match record.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

pub(crate) fn bool_field(record: &RawRecord, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Id field: the service writes integers, older records may carry
/// strings. Anything else maps to the empty id.
pub(crate) fn id_field(record: &RawRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Optional reference field (`contact_id`, `deal_id`): absent, null,
/// or empty collapses to `None`.
pub(crate) fn opt_ref(record: &RawRecord, key: &str) -> Option<String> {
    match record.get(key) {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn opt_datetime(record: &RawRecord, key: &str) -> Option<DateTime<Utc>> {
    record
        .get(key)
        .and_then(Value::as_str)
        .and_then(parse_datetime)
}

pub(crate) fn opt_date(record: &RawRecord, key: &str) -> Option<NaiveDate> {
    let raw = record.get(key).and_then(Value::as_str)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

/// Lenient datetime parsing: RFC 3339 first, then the bare formats the
/// service has been seen emitting.
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
                .ok()
                .map(|n| Utc.from_utc_datetime(&n))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|n| Utc.from_utc_datetime(&n))
        })
}

// ---------------------------------------------------------------------------
// Write-side coercion
// ---------------------------------------------------------------------------

/// Reference fields are integers on the wire. Empty or non-numeric
/// input maps to JSON null — never NaN, never an empty string.
pub(crate) fn ref_value(id: &Option<String>) -> Value {
    id.as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(Value::from)
        .unwrap_or(Value::Null)
}

/// The update endpoint wants the id in its native type.
pub(crate) fn id_value(id: &str) -> Value {
    id.trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(id))
}

/// Tags cross the storage boundary as one comma-joined string.
pub(crate) fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Split trims whitespace and drops empty entries, order preserved.
pub(crate) fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Shared write-result handling
// ---------------------------------------------------------------------------

/// Interpret a batch write of size one.
///
/// Batch-level failure and zero-successes both end in `RemoteWrite`;
/// every field-level and record-level message is aggregated into the
/// error and pushed to the alert sink on the way.
pub(crate) fn first_successful_record(
    resp: &WriteResponse,
    alerts: &dyn AlertSink,
) -> Result<RawRecord, StoreError> {
    if !resp.success {
        alerts.error(&resp.message);
        return Err(StoreError::write(vec![resp.message.clone()]));
    }

    let mut messages = Vec::new();
    for result in resp.results.iter().filter(|r| !r.success) {
        for err in &result.errors {
            let msg = format!("{}: {}", err.field_label, err.message);
            alerts.error(&msg);
            messages.push(msg);
        }
        if let Some(msg) = &result.message {
            alerts.error(msg);
            messages.push(msg.clone());
        }
    }

    let succeeded = resp
        .results
        .iter()
        .find(|r| r.success)
        .and_then(|r| r.data.as_ref())
        .and_then(Value::as_object);

    match succeeded {
        Some(record) => Ok(record.clone()),
        None => {
            if messages.is_empty() {
                messages.push("No records written".to_string());
            }
            Err(StoreError::write(messages))
        }
    }
}
